//! Typed errors for generation attempts and simulator setup.

use thiserror::Error;

use crate::direction::Openings;
use crate::location::Location;

/// Reasons a single generation attempt is rejected.
///
/// [`Generator::generate`](crate::Generator::generate) never returns these; each one triggers a retry at the scope it belongs to,
/// and they are surfaced through `tracing` output.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    /// No random walk met the length constraints within the attempt cap.
    #[error("no walk reached the outlet within {attempts} attempts")]
    WalkExhausted {
        /// Walks tried.
        attempts: usize,
    },
    /// Obstacles left a path much shorter than the intended one.
    #[error("shortest open route has {shortest} cells against an intended path of {path_len}")]
    TrivialShortcut {
        /// Cells on the breadth-first shortest route.
        shortest: usize,
        /// Cells on the intended path.
        path_len: usize,
    },
    /// Fewer branch loops fit than were requested.
    #[error("only {added} of {requested} branch loops fit")]
    LoopUnavailable {
        /// Loops requested by the level config.
        requested: usize,
        /// Loops actually committed.
        added: usize,
    },
    /// A cell needs an opening set no piece provides.
    #[error("no piece opens {openings:?} (required at {location:?})")]
    OrphanJunction {
        /// Offending cell.
        location: Location,
        /// Opening set required there.
        openings: Openings,
    },
}

/// Reasons [`FlowSimulator::start`](crate::FlowSimulator::start) refuses to begin.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SimulationError {
    /// The inlet or outlet row does not exist on the grid.
    #[error("row {row} is outside a grid of {rows} rows")]
    RowOutOfBounds {
        /// Requested row.
        row: usize,
        /// Rows on the grid.
        rows: usize,
    },
    /// A run is already in progress or finished; call `reset` first.
    #[error("simulation already started")]
    AlreadyStarted,
}
