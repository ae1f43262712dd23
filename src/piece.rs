use strum::VariantArray;

use crate::direction::{Direction, Openings};

/// Broad family a [`PieceType`] belongs to, determined by how many sides it opens and where.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PieceKind {
    /// Two opposing openings.
    Straight,
    /// Two adjacent openings.
    Elbow,
    /// Three openings.
    Tee,
    /// All four openings.
    Cross,
}

/// The catalog of placeable pipe pieces.
///
/// Each piece is identified by the set of sides it opens; see [`PieceType::openings`].
/// Tees are named for the one side they leave closed.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PieceType {
    /// Left and right.
    Horizontal,
    /// Top and bottom.
    Vertical,
    /// Top and right.
    ElbowTopRight,
    /// Right and bottom.
    ElbowRightBottom,
    /// Bottom and left.
    ElbowBottomLeft,
    /// Left and top.
    ElbowLeftTop,
    /// Everything but top.
    TeeNoTop,
    /// Everything but right.
    TeeNoRight,
    /// Everything but bottom.
    TeeNoBottom,
    /// Everything but left.
    TeeNoLeft,
    /// Every side.
    Cross,
}

impl PieceType {
    /// The sides this piece connects through.
    pub fn openings(&self) -> Openings {
        use Direction::*;

        match self {
            Self::Horizontal => Openings::from_directions(&[Left, Right]),
            Self::Vertical => Openings::from_directions(&[Top, Bottom]),
            Self::ElbowTopRight => Openings::from_directions(&[Top, Right]),
            Self::ElbowRightBottom => Openings::from_directions(&[Right, Bottom]),
            Self::ElbowBottomLeft => Openings::from_directions(&[Bottom, Left]),
            Self::ElbowLeftTop => Openings::from_directions(&[Left, Top]),
            Self::TeeNoTop => Openings::ALL.without(Top),
            Self::TeeNoRight => Openings::ALL.without(Right),
            Self::TeeNoBottom => Openings::ALL.without(Bottom),
            Self::TeeNoLeft => Openings::ALL.without(Left),
            Self::Cross => Openings::ALL,
        }
    }

    /// Look up the piece with exactly these `openings`.
    ///
    /// Returns [`None`] for sets with no catalog entry, i.e. the empty set and every single-opening set.
    pub fn from_openings(openings: Openings) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|piece| piece.openings() == openings)
    }

    /// Whether this piece has an opening on side `direction`.
    pub fn opens(&self, direction: Direction) -> bool {
        self.openings().contains(direction)
    }

    /// The sides fluid leaves through after entering from `entry`.
    ///
    /// Pieces have no internal routing: fluid appears at every opening other than the one it came in by.
    pub fn exits_for(&self, entry: Direction) -> Openings {
        self.openings().without(entry)
    }

    /// The family of this piece.
    pub fn kind(&self) -> PieceKind {
        match self {
            Self::Horizontal | Self::Vertical => PieceKind::Straight,
            Self::ElbowTopRight | Self::ElbowRightBottom | Self::ElbowBottomLeft | Self::ElbowLeftTop => PieceKind::Elbow,
            Self::TeeNoTop | Self::TeeNoRight | Self::TeeNoBottom | Self::TeeNoLeft => PieceKind::Tee,
            Self::Cross => PieceKind::Cross,
        }
    }

    /// Box-drawing character used when printing a [`Grid`](crate::Grid).
    pub fn glyph(&self) -> char {
        match self {
            Self::Horizontal => '═',
            Self::Vertical => '║',
            Self::ElbowTopRight => '╚',
            Self::ElbowRightBottom => '╔',
            Self::ElbowBottomLeft => '╗',
            Self::ElbowLeftTop => '╝',
            Self::TeeNoTop => '╦',
            Self::TeeNoRight => '╣',
            Self::TeeNoBottom => '╩',
            Self::TeeNoLeft => '╠',
            Self::Cross => '╬',
        }
    }
}
