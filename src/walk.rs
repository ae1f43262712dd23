//! Randomized single-path walk from the inlet cell to the outlet cell.

use std::collections::HashSet;

use itertools::Itertools;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use strum::VariantArray;
use tracing::trace;

use crate::direction::Direction;
use crate::error::GenerationError;
use crate::location::Location;

/// Walks tried before the surrounding generation attempt is abandoned.
pub const MAX_WALK_ATTEMPTS: usize = 40;

const TURN_WEIGHT: f64 = 2.5;
const WANDER_WEIGHT: f64 = 2.0;
const CONVERGE_WEIGHT: f64 = 3.0;
const BORDER_WEIGHT: f64 = 0.6;
const REVERSAL_WEIGHT: f64 = 0.3;
// fraction of the minimum length spent wandering before the walk is pulled towards the target
const WANDER_FRACTION: f64 = 0.7;

/// Endpoints and length window of a walk on a `rows × cols` board.
#[derive(Clone, Copy, Debug)]
pub(crate) struct WalkSpec {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) start: Location,
    pub(crate) target: Location,
    pub(crate) min_len: usize,
}

impl WalkSpec {
    // exclusive upper bound on path length
    fn max_len(&self) -> usize {
        2 * self.min_len
    }

    fn weight(&self, current: Location, heading: Direction, step: Direction, path_len: usize) -> f64 {
        let next = step.attempt_from(current);
        let progresses = next.manhattan(self.target) < current.manhattan(self.target);
        let early = (path_len as f64) < WANDER_FRACTION * self.min_len as f64;

        let mut weight = 1.0;
        if step.is_turn_from(heading) {
            weight *= TURN_WEIGHT;
        }
        if early && !progresses {
            weight *= WANDER_WEIGHT;
        }
        if !early && progresses {
            weight *= CONVERGE_WEIGHT;
        }
        if next.on_border_of(self.rows, self.cols) {
            weight *= BORDER_WEIGHT;
        }
        if step == heading.invert() {
            weight *= REVERSAL_WEIGHT;
        }

        weight
    }
}

/// One walk attempt. Backtracks out of dead ends by popping the path; gives up when the path is
/// back to its first cell, grows past the length window, or the move budget runs out.
pub(crate) fn random_walk<R: Rng + ?Sized>(spec: &WalkSpec, rng: &mut R) -> Option<Vec<Location>> {
    walk_within(spec, spec.rows * spec.cols * 4, rng)
}

fn walk_within<R: Rng + ?Sized>(spec: &WalkSpec, moves: usize, rng: &mut R) -> Option<Vec<Location>> {
    let mut path = vec![spec.start];
    let mut visited = HashSet::from([spec.start]);
    // fluid arrives at the inlet cell travelling right
    let mut heading = Direction::Right;

    for _ in 0..moves {
        let current = *path.last()?;
        if current == spec.target && path.len() >= spec.min_len {
            return Some(path);
        }
        if path.len() + 1 >= spec.max_len() {
            return None;
        }

        let candidates = Direction::VARIANTS.iter()
            .copied()
            .filter(|step| {
                let next = step.attempt_from(current);
                next.within(spec.rows, spec.cols)
                    && !visited.contains(&next)
                    && (next != spec.target || path.len() + 1 >= spec.min_len)
            })
            .collect_vec();

        if candidates.is_empty() {
            if path.len() == 1 {
                return None;
            }
            path.pop();
            heading = match path.len() {
                1 => Direction::Right,
                len => Direction::direction_to(path[len - 2], path[len - 1])?,
            };
            continue;
        }

        let weights = candidates.iter().map(|step| spec.weight(current, heading, *step, path.len()));
        let step = candidates[WeightedIndex::new(weights).ok()?.sample(rng)];
        let next = step.attempt_from(current);
        visited.insert(next);
        path.push(next);
        heading = step;
    }

    // the budget can run out on the very move that reached the outlet
    match path.last() {
        Some(last) if *last == spec.target && path.len() >= spec.min_len => Some(path),
        _ => None,
    }
}

/// Retry [`random_walk`] up to [`MAX_WALK_ATTEMPTS`] times.
pub(crate) fn find_path<R: Rng + ?Sized>(spec: &WalkSpec, rng: &mut R) -> Result<Vec<Location>, GenerationError> {
    for attempt in 0..MAX_WALK_ATTEMPTS {
        if let Some(path) = random_walk(spec, rng) {
            trace!(attempt, len = path.len(), "walk reached the outlet");
            return Ok(path);
        }
    }

    Err(GenerationError::WalkExhausted { attempts: MAX_WALK_ATTEMPTS })
}

/// Deterministic inlet-to-outlet path: along the inlet row to the middle column, one vertical jog to
/// the outlet row, then along the outlet row to the last column.
///
/// Always yields a path whose connection graph uses only straights and elbows.
pub(crate) fn fallback_path(cols: usize, inlet_row: usize, outlet_row: usize) -> Vec<Location> {
    let mid = cols.saturating_sub(1) / 2;
    let mut path = (0..=mid).map(|col| Location(inlet_row, col)).collect_vec();

    if inlet_row < outlet_row {
        path.extend((inlet_row + 1..=outlet_row).map(|row| Location(row, mid)));
    } else {
        path.extend((outlet_row..inlet_row).rev().map(|row| Location(row, mid)));
    }
    path.extend((mid + 1..cols).map(|col| Location(outlet_row, col)));

    path
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{fallback_path, find_path, random_walk, walk_within, WalkSpec};
    use crate::direction::Direction;
    use crate::location::Location;

    fn assert_connected(path: &[Location]) {
        for (a, b) in path.iter().tuple_windows() {
            assert!(Direction::direction_to(*a, *b).is_some(), "{:?} -> {:?}", a, b);
        }
        assert_eq!(path.iter().unique().count(), path.len());
    }

    #[test]
    fn walks_respect_the_length_window() {
        let spec = WalkSpec { rows: 7, cols: 7, start: Location(3, 0), target: Location(1, 6), min_len: 12 };
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            if let Some(path) = random_walk(&spec, &mut rng) {
                assert_eq!(path.first(), Some(&Location(3, 0)));
                assert_eq!(path.last(), Some(&Location(1, 6)));
                assert!(path.len() >= 12 && path.len() < 24, "{}", path.len());
                assert_connected(&path);
            }
        }
    }

    #[test]
    fn find_path_succeeds_on_open_board() {
        let spec = WalkSpec { rows: 7, cols: 7, start: Location(0, 0), target: Location(6, 6), min_len: 13 };
        let path = find_path(&spec, &mut StdRng::seed_from_u64(1)).unwrap();
        assert!(path.len() >= 13);
        assert_connected(&path);
    }

    #[test]
    fn impossible_length_exhausts() {
        // a 2x2 board can't hold a 10 cell path
        let spec = WalkSpec { rows: 2, cols: 2, start: Location(0, 0), target: Location(1, 1), min_len: 10 };
        assert!(find_path(&spec, &mut StdRng::seed_from_u64(3)).is_err());
    }

    #[test]
    fn walks_are_reproducible() {
        let spec = WalkSpec { rows: 7, cols: 7, start: Location(2, 0), target: Location(5, 6), min_len: 11 };
        let a = find_path(&spec, &mut StdRng::seed_from_u64(99));
        let b = find_path(&spec, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn step_weights() {
        // early while the path is under 7 cells, converging from there on
        let spec = WalkSpec { rows: 7, cols: 7, start: Location(3, 0), target: Location(3, 6), min_len: 10 };
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;

        // straight ahead, interior, making progress
        assert!(close(spec.weight(Location(3, 2), Direction::Right, Direction::Right, 2), 1.0));
        assert!(close(spec.weight(Location(3, 2), Direction::Right, Direction::Right, 8), 3.0));
        // turn away from the outlet onto the border, early on
        assert!(close(spec.weight(Location(1, 1), Direction::Right, Direction::Top, 2), 2.5 * 2.0 * 0.6));
        // turn towards the outlet onto the border, late
        assert!(close(spec.weight(Location(1, 6), Direction::Right, Direction::Bottom, 9), 2.5 * 3.0 * 0.6));
        // interior turn without progress, late
        assert!(close(spec.weight(Location(3, 3), Direction::Right, Direction::Top, 8), 2.5));
        // doubling back
        assert!(close(spec.weight(Location(3, 3), Direction::Right, Direction::Left, 2), 2.0 * 0.3));
        assert!(close(spec.weight(Location(3, 3), Direction::Right, Direction::Left, 8), 0.3));
    }

    #[test]
    fn outlet_reached_on_the_last_move() {
        let spec = WalkSpec { rows: 1, cols: 4, start: Location(0, 0), target: Location(0, 3), min_len: 4 };
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(walk_within(&spec, 3, &mut rng), Some((0..4).map(|col| Location(0, col)).collect::<Vec<_>>()));
        assert_eq!(walk_within(&spec, 2, &mut rng), None);
    }

    #[test]
    fn fallback_shapes() {
        assert_eq!(fallback_path(4, 1, 1), vec![Location(1, 0), Location(1, 1), Location(1, 2), Location(1, 3)]);
        assert_eq!(fallback_path(3, 0, 2), vec![
            Location(0, 0), Location(0, 1), Location(1, 1), Location(2, 1), Location(2, 2),
        ]);
        assert_eq!(fallback_path(3, 2, 0), vec![
            Location(2, 0), Location(2, 1), Location(1, 1), Location(0, 1), Location(0, 2),
        ]);
        assert_eq!(fallback_path(1, 0, 1), vec![Location(0, 0), Location(1, 0)]);
    }
}
