use std::collections::HashSet;
use std::ops::RangeInclusive;

use itertools::Itertools;
use petgraph::algo::dijkstra;
use rand::seq::SliceRandom;
use rand::Rng;
use strum::VariantArray;

use crate::direction::Direction;
use crate::error::GenerationError;
use crate::grid::Grid;
use crate::location::Location;

/// A layout is trivial when its shortest open route is under this fraction of the intended path.
pub const SHORTCUT_RATIO: f64 = 0.6;

/// Drop a random number of obstacles (drawn from `count`) off the intended `path`.
///
/// Cells touching the path are used first, in random order; the rest of the board fills in once those run out.
/// Returns how many obstacles were placed, which is less than drawn only on a crowded board.
pub(crate) fn place_obstacles<R: Rng + ?Sized>(grid: &mut Grid, path: &[Location], count: &RangeInclusive<usize>, rng: &mut R) -> usize {
    let on_path: HashSet<Location> = path.iter().copied().collect();

    let mut preferred = path.iter()
        .flat_map(|location| Direction::VARIANTS.iter().map(move |dir| dir.attempt_from(*location)))
        .filter(|location| grid.in_bounds(*location) && !on_path.contains(location))
        .unique()
        .collect_vec();
    preferred.shuffle(rng);

    let mut filler = grid.locations()
        .filter(|location| !on_path.contains(location) && !preferred.contains(location))
        .collect_vec();
    filler.shuffle(rng);

    let target = if count.is_empty() { 0 } else { rng.gen_range(count.clone()) };

    preferred.into_iter()
        .chain(filler)
        .take(target)
        .filter(|location| grid.set_obstacle(*location))
        .count()
}

/// Cells on the shortest obstacle-free route from `from` to `to`, ignoring pieces entirely.
///
/// [`None`] if either end is blocked or no route exists.
pub fn shortest_route(grid: &Grid, from: Location, to: Location) -> Option<usize> {
    let graph = grid.adjacency(|location| !grid.is_obstacle(location));

    if !graph.contains_node(from) || !graph.contains_node(to) {
        return None;
    }

    dijkstra(&graph, from, Some(to), |_| 1usize)
        .get(&to)
        .map(|edges| edges + 1)
}

/// Reject layouts whose obstacles leave a route under [`SHORTCUT_RATIO`] of `path_len`.
pub(crate) fn check_shortcut(grid: &Grid, inlet: Location, outlet: Location, path_len: usize) -> Result<(), GenerationError> {
    // the intended path itself is obstacle free, so a route always exists
    let shortest = shortest_route(grid, inlet, outlet).unwrap_or(path_len);

    if (shortest as f64) < SHORTCUT_RATIO * path_len as f64 {
        return Err(GenerationError::TrivialShortcut { shortest, path_len });
    }

    Ok(())
}
