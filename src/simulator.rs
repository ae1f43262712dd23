//! Tick-driven flow and leak simulation over a player-assembled [`Grid`].
//!
//! A run pours fluid from the inlet pipe into the first column and advances a set of flow fronts, one
//! per pipe segment or cell entry currently filling. Fronts spawned during a tick only start moving on the
//! next tick. Leaks start a shared timer that fails the run once it reaches the configured timeout.

use ndarray::Array2;
use tracing::{debug, warn};

use crate::config::SimulationConfig;
use crate::direction::Direction;
use crate::error::SimulationError;
use crate::grid::Grid;
use crate::location::Location;

/// Result of a tick.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Status {
    /// Not finished (or not started).
    #[default]
    None,
    /// Fluid reached the outlet with no leaks.
    Success,
    /// Leaked for too long, or ran into a dead end.
    LeakFail,
}

/// Why a run ended in [`Status::LeakFail`]. Presentation only; the status is the same for both.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FailureKind {
    /// A leak persisted until the timeout.
    Leak,
    /// Every front stopped without reaching the outlet and without leaking.
    DeadEnd,
}

/// Lifecycle of a run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum RunState {
    /// Waiting for [`FlowSimulator::start`].
    #[default]
    Idle,
    /// Fluid is moving.
    Active,
    /// Terminal: fluid drained through the outlet.
    Success,
    /// Terminal: see [`FailureKind`].
    LeakFail,
}

/// What a [`FlowFront`] is filling.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FlowPhase {
    /// The inlet pipe feeding column 0.
    Inlet,
    /// One side of a grid cell.
    Grid,
    /// The outlet pipe, still filling.
    OutletFill,
    /// The outlet pipe, full. Such a front is retired into [`FlowSimulator::outlet_front`].
    Outlet,
}

/// Fluid filling one pipe segment or one cell's entry side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowFront {
    /// The cell being filled, or the cell an outlet pipe hangs off. [`None`] for the inlet pipe.
    pub location: Option<Location>,
    /// Side the fluid came in by.
    pub entry: Direction,
    /// Fill progress in `[0, 1]`.
    pub progress: f64,
    /// What is being filled.
    pub phase: FlowPhase,
}

impl FlowFront {
    fn inlet() -> Self {
        Self { location: None, entry: Direction::Left, progress: 0.0, phase: FlowPhase::Inlet }
    }

    fn grid(location: Location, entry: Direction) -> Self {
        Self { location: Some(location), entry, progress: 0.0, phase: FlowPhase::Grid }
    }

    fn outlet(anchor: Location) -> Self {
        Self { location: Some(anchor), entry: Direction::Left, progress: 0.0, phase: FlowPhase::OutletFill }
    }

    fn is_pending_at(&self, location: Location) -> bool {
        self.phase == FlowPhase::Grid && self.location == Some(location)
    }
}

/// How full each side of one cell is.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellFillState {
    fractions: [f64; 4],
    filled: bool,
}

impl CellFillState {
    /// Fill fraction in `[0, 1]` of side `direction`.
    pub fn fraction(&self, direction: Direction) -> f64 {
        self.fractions[direction as usize]
    }

    /// Whether fluid has passed through this cell.
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    fn set(&mut self, direction: Direction, fraction: f64) {
        self.fractions[direction as usize] = fraction;
    }
}

/// An opening fluid escapes through.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Leak {
    /// Cell with the unmatched opening.
    pub location: Location,
    /// Side the fluid escapes through.
    pub direction: Direction,
}

/// Everything a run accumulates. [`FlowSimulator::reset`] replaces it with [`Default`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationState {
    run: RunState,
    fronts: Vec<FlowFront>,
    cells: Array2<Option<CellFillState>>,
    leaks: Vec<Leak>,
    leak_timer: f64,
    elapsed: f64,
    reached_outlet: bool,
    inlet_filled: bool,
    outlet_front: Option<FlowFront>,
    failure: Option<FailureKind>,
}

#[derive(Clone, Debug, PartialEq)]
struct Layout {
    grid: Grid,
    inlet_row: usize,
    outlet_row: usize,
}

impl Layout {
    fn inlet(&self) -> Location {
        Location(self.inlet_row, 0)
    }

    fn outlet(&self) -> Location {
        Location(self.outlet_row, self.grid.cols() - 1)
    }
}

/// Runs fluid through a grid one tick at a time.
///
/// [`Self::start`] snapshots the grid, so pieces moved afterwards only take effect after [`Self::reset`] and a fresh start.
#[derive(Clone, Debug, Default)]
pub struct FlowSimulator {
    config: SimulationConfig,
    layout: Option<Layout>,
    state: SimulationState,
}

impl FlowSimulator {
    /// An idle simulator with default timing.
    pub fn new() -> Self {
        Self::default()
    }

    /// An idle simulator with custom timing.
    pub fn with_config(config: SimulationConfig) -> Self {
        Self { config, layout: None, state: Default::default() }
    }

    /// Begin a run on `grid`, seeding a single front in the inlet pipe.
    pub fn start(&mut self, grid: &Grid, inlet_row: usize, outlet_row: usize) -> Result<(), SimulationError> {
        if self.state.run != RunState::Idle {
            return Err(SimulationError::AlreadyStarted);
        }
        for row in [inlet_row, outlet_row] {
            if row >= grid.rows() {
                return Err(SimulationError::RowOutOfBounds { row, rows: grid.rows() });
            }
        }

        self.layout = Some(Layout { grid: grid.clone(), inlet_row, outlet_row });
        self.state = SimulationState {
            run: RunState::Active,
            fronts: vec![FlowFront::inlet()],
            cells: Array2::from_elem((grid.rows(), grid.cols()), None),
            ..Default::default()
        };

        Ok(())
    }

    /// Advance every front by `dt` seconds and report where the run stands.
    ///
    /// Returns [`Status::None`] while idle; once terminal, keeps returning the terminal status.
    pub fn update(&mut self, dt: f64) -> Status {
        match (self.state.run, &self.layout) {
            (RunState::Active, Some(layout)) => self.state.advance(layout, &self.config, dt),
            _ => self.status(),
        }
    }

    /// Tick with a fixed `dt` until the run ends or `max_ticks` have passed.
    pub fn run(&mut self, dt: f64, max_ticks: usize) -> Status {
        for _ in 0..max_ticks {
            let status = self.update(dt);
            if status != Status::None {
                return status;
            }
        }

        Status::None
    }

    /// Drop all run progress and return to idle. The grid given to [`Self::start`] is not touched.
    pub fn reset(&mut self) {
        self.layout = None;
        self.state = SimulationState::default();
    }

    /// Current status.
    pub fn status(&self) -> Status {
        match self.state.run {
            RunState::Idle | RunState::Active => Status::None,
            RunState::Success => Status::Success,
            RunState::LeakFail => Status::LeakFail,
        }
    }

    /// Current lifecycle state.
    pub fn run_state(&self) -> RunState {
        self.state.run
    }

    /// Why the run failed, once it has.
    pub fn failure(&self) -> Option<FailureKind> {
        self.state.failure
    }

    /// Everything the run has accumulated.
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Fronts still moving.
    pub fn fronts(&self) -> &[FlowFront] {
        &self.state.fronts
    }

    /// Fill state of the cell at `location`, once fluid has reached it.
    pub fn cell_fill(&self, location: Location) -> Option<&CellFillState> {
        self.state.cells.get(location.as_index())?.as_ref()
    }

    /// Leaks found so far, in discovery order.
    pub fn leaks(&self) -> &[Leak] {
        &self.state.leaks
    }

    /// Seconds leaks have been present.
    pub fn leak_timer(&self) -> f64 {
        self.state.leak_timer
    }

    /// Seconds simulated since start.
    pub fn elapsed(&self) -> f64 {
        self.state.elapsed
    }

    /// Whether fluid has drained through the outlet.
    pub fn reached_outlet(&self) -> bool {
        self.state.reached_outlet
    }

    /// Whether the inlet pipe is full.
    pub fn inlet_filled(&self) -> bool {
        self.state.inlet_filled
    }

    /// The retired outlet front, once the outlet pipe is full.
    pub fn outlet_front(&self) -> Option<&FlowFront> {
        self.state.outlet_front.as_ref()
    }
}

impl SimulationState {
    fn advance(&mut self, layout: &Layout, config: &SimulationConfig, dt: f64) -> Status {
        self.elapsed += dt;
        let step = config.fill_rate * dt;

        let current = std::mem::take(&mut self.fronts);
        let mut next = Vec::with_capacity(current.len());

        for front in &current {
            let mut front = *front;
            front.progress = (front.progress + step).min(1.0);

            match (front.phase, front.location) {
                (FlowPhase::Inlet, _) => {
                    if front.progress < 1.0 {
                        next.push(front);
                    } else {
                        self.inlet_filled = true;
                        next.push(FlowFront::grid(layout.inlet(), Direction::Left));
                    }
                }
                (FlowPhase::OutletFill, _) => {
                    if front.progress < 1.0 {
                        next.push(front);
                    } else {
                        self.reached_outlet = true;
                        front.phase = FlowPhase::Outlet;
                        self.outlet_front = Some(front);
                    }
                }
                (FlowPhase::Grid, Some(location)) => {
                    self.cell_mut(location).set(front.entry, front.progress);
                    if front.progress < 1.0 {
                        next.push(front);
                    } else {
                        self.resolve(layout, location, front.entry, &current, &mut next);
                    }
                }
                // retired and malformed fronts never sit in the active list
                (FlowPhase::Grid, None) | (FlowPhase::Outlet, _) => {}
            }
        }

        self.fronts = next;

        if !self.leaks.is_empty() {
            self.leak_timer += dt;
            if self.leak_timer >= config.leak_timeout {
                self.finish(RunState::LeakFail, Some(FailureKind::Leak));
            }
        } else if self.reached_outlet {
            self.finish(RunState::Success, None);
        } else if self.fronts.is_empty() {
            self.finish(RunState::LeakFail, Some(FailureKind::DeadEnd));
        }

        match self.run {
            RunState::Success => Status::Success,
            RunState::LeakFail => Status::LeakFail,
            RunState::Idle | RunState::Active => Status::None,
        }
    }

    /// Fluid has fully entered `location` from `entry`: push it out of every other opening at once.
    fn resolve(&mut self, layout: &Layout, location: Location, entry: Direction, current: &[FlowFront], next: &mut Vec<FlowFront>) {
        let cell = self.cell_mut(location);
        cell.set(entry, 1.0);
        if cell.filled {
            return;
        }
        cell.filled = true;

        let Some(piece) = layout.grid.piece(location) else {
            warn!(?location, ?entry, "fluid resolved in a cell with no piece");
            self.register_leak(location, entry);
            return;
        };
        if !piece.opens(entry) {
            self.register_leak(location, entry);
            return;
        }

        let exits = piece.exits_for(entry);
        for exit in exits.iter() {
            cell.set(exit, 1.0);
        }

        for exit in exits.iter() {
            if location == layout.outlet() && exit == Direction::Right {
                next.push(FlowFront::outlet(location));
                continue;
            }

            let neighbor = exit.attempt_from(location);
            let back = exit.invert();
            if layout.grid.piece(neighbor).is_some_and(|piece| piece.opens(back)) {
                let filled = self.cell(neighbor).is_some_and(|state| state.filled);
                let pending = current.iter().chain(next.iter()).any(|front| front.is_pending_at(neighbor));
                if !filled && !pending {
                    next.push(FlowFront::grid(neighbor, back));
                }
            } else {
                self.register_leak(location, exit);
            }
        }
    }

    fn register_leak(&mut self, location: Location, direction: Direction) {
        let leak = Leak { location, direction };
        if !self.leaks.contains(&leak) {
            debug!(?location, ?direction, "leak registered");
            self.leaks.push(leak);
        }
    }

    fn finish(&mut self, run: RunState, failure: Option<FailureKind>) {
        debug!(?run, ?failure, elapsed = self.elapsed, leaks = self.leaks.len(), "run finished");
        self.run = run;
        self.failure = failure;
    }

    fn cell(&self, location: Location) -> Option<&CellFillState> {
        self.cells.get(location.as_index())?.as_ref()
    }

    fn cell_mut(&mut self, location: Location) -> &mut CellFillState {
        self.cells[location.as_index()].get_or_insert_with(CellFillState::default)
    }
}
