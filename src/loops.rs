use std::collections::HashSet;
use std::iter::once;

use itertools::Itertools;
use petgraph::algo::astar;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;
use unordered_pair::UnorderedPair;

use crate::direction::Direction;
use crate::grid::Grid;
use crate::location::Location;
use crate::network::ConnectionGraph;

/// Longest corridor, in cells, a branch loop may add.
pub const MAX_CORRIDOR_LENGTH: usize = 7;

/// A free side of a network cell whose neighbor could start a corridor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct BranchCandidate {
    cell: Location,
    direction: Direction,
    neighbor: Location,
}

fn branch_candidates(graph: &ConnectionGraph, grid: &Grid) -> Vec<BranchCandidate> {
    let mut candidates = Vec::new();

    for (cell, openings) in graph.iter().filter(|(_, openings)| openings.len() < 3) {
        for direction in openings.complement().iter() {
            let neighbor = direction.attempt_from(cell);
            if grid.is_empty(neighbor) && !graph.contains(neighbor) {
                candidates.push(BranchCandidate { cell, direction, neighbor });
            }
        }
    }

    candidates
}

/// Shortest corridor from `from` to `to` through free cells, both ends included.
fn corridor(graph: &ConnectionGraph, grid: &Grid, from: Location, to: Location) -> Option<Vec<Location>> {
    let free = grid.adjacency(|location| grid.is_empty(location) && !graph.contains(location));
    if !free.contains_node(from) || !free.contains_node(to) {
        return None;
    }

    let (_, cells) = astar(&free, from, |location| location == to, |_| 1usize, |location| location.manhattan(to))?;
    (cells.len() <= MAX_CORRIDOR_LENGTH).then_some(cells)
}

/// Add one branch loop to `graph`: two network cells each gain an extra opening, joined by a new corridor.
///
/// Returns `false` and leaves the graph untouched when no pair of candidates can be joined.
pub(crate) fn add_loop<R: Rng + ?Sized>(graph: &mut ConnectionGraph, grid: &Grid, rng: &mut R) -> bool {
    let mut candidates = branch_candidates(graph, grid);
    candidates.shuffle(rng);

    let mut tried = HashSet::new();
    let found = candidates.iter()
        .tuple_combinations()
        .filter(|(a, b)| a.cell != b.cell)
        .find_map(|(a, b)| {
            if !tried.insert(UnorderedPair(a.neighbor, b.neighbor)) {
                return None;
            }
            corridor(graph, grid, a.neighbor, b.neighbor).map(|cells| (*a, *b, cells))
        });

    let Some((a, b, cells)) = found else {
        return false;
    };

    trace!(from = ?a.cell, to = ?b.cell, len = cells.len(), "adding branch loop");
    graph.open(a.cell, a.direction);
    graph.open(b.cell, b.direction);

    for (prev, here, next) in once(a.cell).chain(cells).chain(once(b.cell)).tuple_windows() {
        for other in [prev, next] {
            if let Some(direction) = Direction::direction_to(here, other) {
                graph.open(here, direction);
            }
        }
    }

    true
}

/// Add up to `count` loops, returning how many fit.
pub(crate) fn add_loops<R: Rng + ?Sized>(graph: &mut ConnectionGraph, grid: &Grid, count: usize, rng: &mut R) -> usize {
    (0..count).take_while(|_| add_loop(graph, grid, rng)).count()
}
