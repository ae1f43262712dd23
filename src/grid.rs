use std::fmt::{Display, Formatter};

use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;

use crate::direction::Direction;
use crate::location::{Dimension, Location};
use crate::piece::PieceType;

/// Contents of one grid cell.
///
/// A cell is never both an obstacle and a piece holder.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cell {
    /// Nothing here; a piece may be placed.
    #[default]
    Empty,
    /// Blocked for the whole level.
    Obstacle,
    /// A placed pipe piece.
    Piece(PieceType),
}

/// A fixed-size `rows × cols` board of [`Cell`]s.
///
/// The generator writes obstacles into it; the placement layer drops and lifts pieces with
/// [`Self::place_piece`] and [`Self::remove_piece`]; the [`FlowSimulator`](crate::FlowSimulator) only reads it.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    cells: Array2<Cell>,
}

impl Grid {
    /// An empty grid with `dims` given as `(rows, cols)`.
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self {
            cells: Array2::from_elem((dims.0.get(), dims.1.get()), Cell::Empty),
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    /// Whether `location` lies on the grid.
    pub fn in_bounds(&self, location: Location) -> bool {
        location.within(self.rows(), self.cols())
    }

    /// The cell at `location`, or [`None`] out of bounds.
    pub fn cell(&self, location: Location) -> Option<Cell> {
        self.cells.get(location.as_index()).copied()
    }

    /// Whether `location` is an in-bounds obstacle.
    pub fn is_obstacle(&self, location: Location) -> bool {
        matches!(self.cell(location), Some(Cell::Obstacle))
    }

    /// Whether `location` is in bounds, not an obstacle and holds no piece.
    pub fn is_empty(&self, location: Location) -> bool {
        matches!(self.cell(location), Some(Cell::Empty))
    }

    /// Whether a piece may be dropped at `location`.
    pub fn can_place(&self, location: Location) -> bool {
        self.in_bounds(location) && self.is_empty(location)
    }

    /// Place `piece` at `location`, returning `false` and leaving the grid untouched if [`Self::can_place`] does not hold.
    pub fn place_piece(&mut self, location: Location, piece: PieceType) -> bool {
        if !self.can_place(location) {
            return false;
        }

        self.cells[location.as_index()] = Cell::Piece(piece);
        true
    }

    /// Lift the piece at `location`, returning it. Obstacles and empty cells are left alone.
    pub fn remove_piece(&mut self, location: Location) -> Option<PieceType> {
        let piece = self.piece(location)?;
        self.cells[location.as_index()] = Cell::Empty;
        Some(piece)
    }

    /// The piece at `location`, if any.
    pub fn piece(&self, location: Location) -> Option<PieceType> {
        match self.cell(location)? {
            Cell::Piece(piece) => Some(piece),
            _ => None,
        }
    }

    /// Lift every piece, keeping obstacles.
    pub fn clear_pieces(&mut self) {
        self.cells.map_inplace(|cell| {
            if let Cell::Piece(_) = cell {
                *cell = Cell::Empty;
            }
        })
    }

    /// Turn `location` into an obstacle, discarding any piece there. Returns `false` out of bounds.
    pub fn set_obstacle(&mut self, location: Location) -> bool {
        match self.cells.get_mut(location.as_index()) {
            Some(cell) => {
                *cell = Cell::Obstacle;
                true
            }
            None => false,
        }
    }

    /// Every in-bounds location in row-major order.
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.cells.indexed_iter().map(|(index, _)| Location::from(index))
    }

    /// Every obstacle location in row-major order.
    pub fn obstacles(&self) -> impl Iterator<Item = Location> + '_ {
        self.cells.indexed_iter()
            .filter(|(_, cell)| **cell == Cell::Obstacle)
            .map(|(index, _)| Location::from(index))
    }

    /// Adjacency graph over the cells accepted by `admit`, with an edge between every pair of orthogonal neighbors.
    pub(crate) fn adjacency(&self, admit: impl Fn(Location) -> bool) -> UnGraphMap<Location, ()> {
        let mut graph = UnGraphMap::with_capacity(
            self.rows() * self.cols(),
            // "horizontal" edges
            (self.cols() - 1) * self.rows()
                // "vertical" edges
                + (self.rows() - 1) * self.cols(),
        );

        for location in self.locations().filter(|l| admit(*l)) {
            graph.add_node(location);
            // add edges down and to the right, if possible
            for neighbor in [Direction::Bottom.attempt_from(location), Direction::Right.attempt_from(location)] {
                if self.in_bounds(neighbor) && admit(neighbor) {
                    graph.add_edge(location, neighbor, ());
                }
            }
        }

        graph
    }

    /// Number of placed pieces.
    pub fn piece_count(&self) -> usize {
        self.cells.iter().filter(|cell| matches!(cell, Cell::Piece(_))).count()
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.rows() {
            for cell in row {
                write!(f, "{}", match cell {
                    Cell::Empty => '.',
                    Cell::Obstacle => '#',
                    Cell::Piece(piece) => piece.glyph(),
                })?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZero;

    use super::{Cell, Grid};
    use crate::location::Location;
    use crate::piece::PieceType;

    fn grid(rows: usize, cols: usize) -> Grid {
        Grid::with_dims((NonZero::new(rows).unwrap(), NonZero::new(cols).unwrap()))
    }

    #[test]
    fn bounds() {
        let grid = grid(3, 4);
        assert!(grid.in_bounds(Location(2, 3)));
        assert!(!grid.in_bounds(Location(3, 0)));
        assert!(!grid.in_bounds(Location(0, 4)));
        assert!(!grid.in_bounds(Location(0, 0).offset_by((-1, 0))));
    }

    #[test]
    fn place_and_remove() {
        let mut grid = grid(3, 3);
        assert!(grid.place_piece(Location(1, 1), PieceType::Cross));
        assert!(!grid.place_piece(Location(1, 1), PieceType::Vertical));
        assert_eq!(grid.piece(Location(1, 1)), Some(PieceType::Cross));
        assert!(!grid.is_empty(Location(1, 1)));

        assert_eq!(grid.remove_piece(Location(1, 1)), Some(PieceType::Cross));
        assert_eq!(grid.remove_piece(Location(1, 1)), None);
        assert!(grid.is_empty(Location(1, 1)));
    }

    #[test]
    fn obstacles_block_placement() {
        let mut grid = grid(3, 3);
        assert!(grid.set_obstacle(Location(0, 1)));
        assert!(!grid.set_obstacle(Location(5, 5)));
        assert!(!grid.can_place(Location(0, 1)));
        assert!(!grid.place_piece(Location(0, 1), PieceType::Horizontal));
        assert!(!grid.place_piece(Location(9, 9), PieceType::Horizontal));
        assert_eq!(grid.remove_piece(Location(0, 1)), None);
        assert_eq!(grid.cell(Location(0, 1)), Some(Cell::Obstacle));
    }

    #[test]
    fn clear_keeps_obstacles() {
        let mut grid = grid(2, 3);
        grid.set_obstacle(Location(0, 0));
        grid.place_piece(Location(0, 1), PieceType::Horizontal);
        grid.place_piece(Location(1, 2), PieceType::ElbowLeftTop);
        assert_eq!(grid.piece_count(), 2);

        grid.clear_pieces();
        assert_eq!(grid.piece_count(), 0);
        assert_eq!(grid.obstacles().collect::<Vec<_>>(), vec![Location(0, 0)]);
    }

    #[test]
    fn display() {
        let mut grid = grid(2, 3);
        grid.set_obstacle(Location(1, 0));
        grid.place_piece(Location(0, 0), PieceType::Horizontal);
        grid.place_piece(Location(0, 1), PieceType::ElbowBottomLeft);
        grid.place_piece(Location(1, 1), PieceType::ElbowTopRight);
        assert_eq!(format!("{}", grid), "═╗.
#╚.
");
    }
}
