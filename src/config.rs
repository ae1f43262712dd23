//! Level tiers and simulation timing.

use std::num::NonZero;
use std::ops::RangeInclusive;

use crate::location::Dimension;

/// How many decoy pieces are added to a level's inventory.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistractorPolicy {
    /// No decoys.
    #[default]
    None,
    /// Exactly this many decoys.
    Fixed(usize),
    /// This percentage of the network's cell count, rounded to nearest.
    Percent(u32),
}

impl DistractorPolicy {
    /// Number of decoys for a network of `network_size` cells.
    pub fn count_for(&self, network_size: usize) -> usize {
        match *self {
            Self::None => 0,
            Self::Fixed(count) => count,
            Self::Percent(percent) => (network_size * percent as usize + 50) / 100,
        }
    }
}

/// Parameters of one level tier. Immutable once handed to the [`Generator`](crate::Generator).
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelConfig {
    /// Grid size as `(rows, cols)`.
    pub dims: (Dimension, Dimension),
    /// Fewest cells the intended path may have.
    pub min_path_length: usize,
    /// Inclusive range the obstacle count is drawn from.
    pub obstacle_count: RangeInclusive<usize>,
    /// Reject layouts whose obstacles leave a route shorter than 60% of the intended path.
    pub reject_trivial_shortcut: bool,
    /// Branch loops to add after the main path.
    pub loop_count: usize,
    /// Treat a shortfall of loops as a failed attempt rather than accepting fewer.
    pub require_all_loops: bool,
    /// Decoy pieces added to the inventory.
    pub distractor_policy: DistractorPolicy,
}

const SEVEN: Dimension = match NonZero::new(7) {
    Some(dim) => dim,
    None => unreachable!(),
};

impl Default for LevelConfig {
    fn default() -> Self {
        Self::easy()
    }
}

impl LevelConfig {
    /// A straight-ish run with a few obstacles and nothing else.
    pub fn tutorial() -> Self {
        Self {
            dims: (SEVEN, SEVEN),
            min_path_length: 8,
            obstacle_count: 2..=4,
            reject_trivial_shortcut: false,
            loop_count: 0,
            require_all_loops: false,
            distractor_policy: DistractorPolicy::None,
        }
    }

    /// A winding path and a couple of decoys.
    pub fn easy() -> Self {
        Self {
            dims: (SEVEN, SEVEN),
            min_path_length: 11,
            obstacle_count: 4..=7,
            reject_trivial_shortcut: false,
            loop_count: 0,
            require_all_loops: false,
            distractor_policy: DistractorPolicy::Fixed(2),
        }
    }

    /// Obstacles must constrain the route; one branch loop if it fits.
    pub fn medium() -> Self {
        Self {
            dims: (SEVEN, SEVEN),
            min_path_length: 13,
            obstacle_count: 6..=9,
            reject_trivial_shortcut: true,
            loop_count: 1,
            require_all_loops: false,
            distractor_policy: DistractorPolicy::Fixed(3),
        }
    }

    /// Long path, one mandatory loop, decoys scaling with the network.
    pub fn hard() -> Self {
        Self {
            dims: (SEVEN, SEVEN),
            min_path_length: 15,
            obstacle_count: 7..=10,
            reject_trivial_shortcut: true,
            loop_count: 1,
            require_all_loops: true,
            distractor_policy: DistractorPolicy::Percent(25),
        }
    }

    /// Two loops and a heavy decoy load.
    pub fn expert() -> Self {
        Self {
            dims: (SEVEN, SEVEN),
            min_path_length: 16,
            obstacle_count: 8..=11,
            reject_trivial_shortcut: true,
            loop_count: 2,
            require_all_loops: false,
            distractor_policy: DistractorPolicy::Percent(40),
        }
    }

    /// Every tier, easiest first.
    pub fn campaign() -> Vec<Self> {
        vec![Self::tutorial(), Self::easy(), Self::medium(), Self::hard(), Self::expert()]
    }

    pub(crate) fn rows(&self) -> usize {
        self.dims.0.get()
    }

    pub(crate) fn cols(&self) -> usize {
        self.dims.1.get()
    }
}

/// Default fluid advance per second, in cells (or pipe segments) per second.
pub const DEFAULT_FILL_RATE: f64 = 1.5;
/// Seconds a leak may persist before the run fails.
pub const LEAK_TIMEOUT: f64 = 3.0;

/// Timing parameters of a [`FlowSimulator`](crate::FlowSimulator).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig {
    /// Fill progress per second of one front.
    pub fill_rate: f64,
    /// Seconds of continuous leaking before [`Status::LeakFail`](crate::Status::LeakFail).
    pub leak_timeout: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fill_rate: DEFAULT_FILL_RATE,
            leak_timeout: LEAK_TIMEOUT,
        }
    }
}
