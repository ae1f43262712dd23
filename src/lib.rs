#![warn(missing_docs)]

//! # `pipewright`
//!
//! The puzzle core of a pipe-routing game: a generator for solvable pipe networks between a fixed inlet and outlet,
//! and a flow simulator that decides whether whatever the player built actually carries fluid from one to the other.
//!
//! Begin by describing a level tier with a [`LevelConfig`] (or take one of its presets), then call
//! [`Generator::generate`] to get a [`Puzzle`]: a [`Grid`] holding only obstacles, the inlet and outlet rows, and a
//! [`PieceManifest`] of pieces to hand to the player. Once the player has filled the grid, start a [`FlowSimulator`] on
//! it and call [`FlowSimulator::update`] once per frame until it reports [`Status::Success`] or [`Status::LeakFail`].
//!
//! # Internals
//! Generation works on a connection graph: a map from cell to the sides that must be open there.
//!
//! 1. A weighted random walk links the inlet cell (column 0) to the outlet cell (last column).
//! Turns are favoured, early moves are pushed away from the target and late ones towards it, and the border is avoided.
//! 2. Obstacles are dropped next to the path first. Optionally, a breadth-first search over open cells rejects
//! layouts where the obstacles fail to force a detour.
//! 3. Branch loops turn path cells into tees joined by short corridors.
//! 4. Each cell's opening set is looked up in the [`PieceType`] catalog and tallied; decoys duplicate tallied types.
//!
//! Any stage may reject an attempt, which is retried from scratch a bounded number of times before a fixed zig-zag path
//! is used instead, so generation always yields a puzzle.
//!
//! Simulation advances flow fronts a fixed amount per tick. A front that fills a cell's entry side pushes fluid to every
//! other opening of that cell's piece at once, spawning fronts into neighbors that open back towards it and recording a
//! [`Leak`] wherever nothing does.

pub use config::{DistractorPolicy, LevelConfig, SimulationConfig, DEFAULT_FILL_RATE, LEAK_TIMEOUT};
pub use direction::{Direction, Openings};
pub use error::{GenerationError, SimulationError};
pub use generator::{generate_all_levels, generate_level, Generator, Puzzle, MAX_GENERATION_ATTEMPTS};
pub use grid::{Cell, Grid};
pub use location::{Coord, Dimension, Location};
pub use manifest::PieceManifest;
pub use network::ConnectionGraph;
pub use piece::{PieceKind, PieceType};
pub use simulator::{CellFillState, FailureKind, FlowFront, FlowPhase, FlowSimulator, Leak, RunState, SimulationState, Status};

pub mod config;
pub(crate) mod direction;
pub mod error;
pub(crate) mod generator;
pub(crate) mod grid;
pub(crate) mod location;
pub(crate) mod loops;
pub(crate) mod manifest;
pub(crate) mod network;
pub(crate) mod obstacles;
pub(crate) mod piece;
pub mod simulator;
pub(crate) mod walk;
mod tests;

pub use loops::MAX_CORRIDOR_LENGTH;
pub use obstacles::{shortest_route, SHORTCUT_RATIO};
pub use walk::MAX_WALK_ATTEMPTS;
