use std::collections::BTreeMap;

use itertools::Itertools;
use tracing::warn;

use crate::direction::{Direction, Openings};
use crate::error::GenerationError;
use crate::location::Location;
use crate::piece::PieceType;

/// Generation-time map from each network cell to the sides that must be open there.
///
/// Built from the intended path, widened by branch loops, then turned into pieces and dropped.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConnectionGraph {
    cells: BTreeMap<Location, Openings>,
}

impl ConnectionGraph {
    /// Graph for a path of orthogonally adjacent cells running from the inlet to the outlet.
    ///
    /// Interior cells open back towards their predecessor and forward towards their successor.
    /// The first cell also opens towards `inlet_side`, the last towards `outlet_side`.
    pub fn from_path(path: &[Location], inlet_side: Direction, outlet_side: Direction) -> Self {
        let mut graph = Self::default();

        if let (Some(first), Some(last)) = (path.first(), path.last()) {
            graph.open(*first, inlet_side);
            graph.open(*last, outlet_side);
        }

        for (from, to) in path.iter().copied().tuple_windows() {
            // non-adjacent steps can't come out of a walk
            if let Some(direction) = Direction::direction_to(from, to) {
                graph.open(from, direction);
                graph.open(to, direction.invert());
            }
        }

        graph
    }

    /// Open side `direction` at `location`, adding the cell to the network if needed.
    pub fn open(&mut self, location: Location, direction: Direction) {
        self.cells.entry(location).or_default().insert(direction);
    }

    /// The sides open at `location`; empty for cells outside the network.
    pub fn openings(&self, location: Location) -> Openings {
        self.cells.get(&location).copied().unwrap_or_default()
    }

    /// Whether `location` is part of the network.
    pub fn contains(&self, location: Location) -> bool {
        self.cells.contains_key(&location)
    }

    /// Number of cells in the network.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the network has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every cell and its openings, in location order.
    pub fn iter(&self) -> impl Iterator<Item = (Location, Openings)> + '_ {
        self.cells.iter().map(|(location, openings)| (*location, *openings))
    }

    /// Resolve every cell to a catalog piece.
    ///
    /// Fails on the first cell whose opening set has no [`PieceType`].
    pub fn to_pieces(&self) -> Result<Vec<(Location, PieceType)>, GenerationError> {
        self.iter()
            .map(|(location, openings)| match PieceType::from_openings(openings) {
                Some(piece) => Ok((location, piece)),
                None => {
                    warn!(?location, ?openings, "connection graph produced an orphan junction");
                    Err(GenerationError::OrphanJunction { location, openings })
                }
            })
            .collect()
    }
}
