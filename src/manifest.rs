use std::collections::BTreeMap;

use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::piece::PieceType;

/// How many of each [`PieceType`] the player gets to place.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PieceManifest {
    counts: BTreeMap<PieceType, usize>,
}

impl PieceManifest {
    /// Tally one of each piece in `pieces`.
    pub fn tally(pieces: impl IntoIterator<Item = PieceType>) -> Self {
        let mut manifest = Self::default();
        pieces.into_iter().for_each(|piece| manifest.give(piece));
        manifest
    }

    /// Copies of `piece` available.
    pub fn count(&self, piece: PieceType) -> usize {
        self.counts.get(&piece).copied().unwrap_or(0)
    }

    /// Pieces available across every type.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Whether nothing is left.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Every type with at least one copy, with its count, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (PieceType, usize)> + '_ {
        self.counts.iter().map(|(piece, count)| (*piece, *count))
    }

    /// Remove one `piece`, as when the player drops it on the grid. Returns `false` if none are left.
    pub fn take(&mut self, piece: PieceType) -> bool {
        match self.counts.get_mut(&piece) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.counts.remove(&piece);
                true
            }
            None => false,
        }
    }

    /// Return one `piece`, as when the player lifts it off the grid.
    pub fn give(&mut self, piece: PieceType) {
        *self.counts.entry(piece).or_default() += 1;
    }

    /// Add `count` decoys, each a copy of a type already present, picked uniformly among present types.
    ///
    /// Does nothing on an empty manifest.
    pub fn add_distractors<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        let present = self.counts.keys().copied().collect_vec();

        for _ in 0..count {
            if let Some(piece) = present.choose(rng) {
                self.give(*piece);
            }
        }
    }
}
