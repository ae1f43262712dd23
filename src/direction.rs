use std::fmt::{Debug, Formatter};

use strum::VariantArray;

use crate::location::Location;

/// One side of a grid cell.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Towards row 0.
    Top,
    /// Towards the last column.
    Right,
    /// Towards the last row.
    Bottom,
    /// Towards column 0.
    Left,
}

impl Direction {
    /// The side facing this one across a cell boundary.
    pub fn invert(&self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
        }
    }

    /// `(row delta, col delta)` of one step in this direction.
    pub fn delta(&self) -> (isize, isize) {
        match self {
            Self::Top => (-1, 0),
            Self::Right => (0, 1),
            Self::Bottom => (1, 0),
            Self::Left => (0, -1),
        }
    }

    /// Attempt the step from `location` in this direction.
    ///
    /// The result is not bounds checked; see [`Grid::in_bounds`](crate::Grid::in_bounds).
    pub fn attempt_from(&self, location: Location) -> Location {
        location.offset_by(self.delta())
    }

    /// Whether `other` is a quarter turn away from this direction.
    pub fn is_turn_from(&self, other: Self) -> bool {
        *self != other && *self != other.invert()
    }

    /// The direction leading from `a` to an orthogonally adjacent `b`, or [`None`] if they are not adjacent.
    pub fn direction_to(a: Location, b: Location) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|dir| dir.attempt_from(a) == b)
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

/// A set of [`Direction`]s, packed into the low four bits of a byte.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Openings(u8);

impl Openings {
    /// No openings.
    pub const NONE: Self = Self(0);
    /// Every side open.
    pub const ALL: Self = Self(0b1111);

    /// Build a set from a list of directions. Repeats are ignored.
    pub fn from_directions(directions: &[Direction]) -> Self {
        directions.iter().fold(Self::NONE, |acc, dir| acc.with(*dir))
    }

    /// This set with `direction` added.
    pub fn with(self, direction: Direction) -> Self {
        Self(self.0 | direction.bit())
    }

    /// This set with `direction` removed.
    pub fn without(self, direction: Direction) -> Self {
        Self(self.0 & !direction.bit())
    }

    /// Add `direction` in place.
    pub fn insert(&mut self, direction: Direction) {
        *self = self.with(direction);
    }

    /// Whether `direction` is open.
    pub fn contains(&self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    /// Number of open sides.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether no side is open.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// The open sides in [`Direction::VARIANTS`] order.
    pub fn iter(&self) -> impl Iterator<Item = Direction> {
        let set = *self;
        Direction::VARIANTS.iter().copied().filter(move |dir| set.contains(*dir))
    }

    /// The sides which are not open.
    pub fn complement(&self) -> Self {
        Self(!self.0 & Self::ALL.0)
    }
}

impl Debug for Openings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Direction> for Openings {
    fn from_iter<T: IntoIterator<Item = Direction>>(iter: T) -> Self {
        iter.into_iter().fold(Self::NONE, |acc, dir| acc.with(dir))
    }
}
