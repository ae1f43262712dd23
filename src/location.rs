use std::num::NonZero;

use ndarray::Ix;

/// A single row or column coordinate.
pub type Coord = usize;
/// The size of a grid along one axis.
pub type Dimension = NonZero<Coord>;

/// A cell position on a [`Grid`](crate::Grid), in `(row, col)` order.
#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
// row, col
pub struct Location(pub Coord, pub Coord);

impl Location {
    pub(crate) fn as_index(&self) -> (Ix, Ix) {
        (self.0, self.1)
    }

    /// Offset this location by `(row delta, col delta)`.
    ///
    /// Stepping off the top or left edge wraps to a huge coordinate, which every bounds check rejects.
    pub fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(self.0.wrapping_add_signed(rhs.0), self.1.wrapping_add_signed(rhs.1))
    }

    /// Whether this location lies on a `rows × cols` board.
    pub(crate) fn within(self, rows: usize, cols: usize) -> bool {
        self.0 < rows && self.1 < cols
    }

    /// Whether this location lies on the outermost ring of a `rows × cols` board.
    pub(crate) fn on_border_of(self, rows: usize, cols: usize) -> bool {
        self.0 == 0 || self.1 == 0 || self.0 + 1 == rows || self.1 + 1 == cols
    }

    /// Manhattan distance between two locations.
    pub fn manhattan(self, other: Self) -> usize {
        self.0.abs_diff(other.0) + self.1.abs_diff(other.1)
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        Self(value.0, value.1)
    }
}
