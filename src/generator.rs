use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument, warn};

use crate::config::LevelConfig;
use crate::direction::Direction;
use crate::error::GenerationError;
use crate::grid::Grid;
use crate::location::Location;
use crate::loops::add_loops;
use crate::manifest::PieceManifest;
use crate::network::ConnectionGraph;
use crate::obstacles::{check_shortcut, place_obstacles};
use crate::piece::PieceType;
use crate::walk::{fallback_path, find_path, WalkSpec};

/// Whole attempts (walk, obstacles, loops, extraction) before falling back to a fixed path.
pub const MAX_GENERATION_ATTEMPTS: usize = 200;

/// A generated level, ready to hand to the placement layer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Puzzle {
    /// The board with obstacles only.
    pub grid: Grid,
    /// Row of the inlet, which feeds column 0 from the left.
    pub inlet_row: usize,
    /// Row of the outlet, which drains the last column to the right.
    pub outlet_row: usize,
    /// Pieces the player may place, decoys included.
    pub manifest: PieceManifest,
    /// The intended placement, one piece per network cell.
    pub solution: Vec<(Location, PieceType)>,
    /// Cells on the intended inlet-to-outlet path, branch loops excluded.
    pub path_len: usize,
    /// Whether every random attempt was rejected and the fixed fallback path was used.
    pub fallback: bool,
}

impl Puzzle {
    /// The first-column cell the inlet pours into.
    pub fn inlet(&self) -> Location {
        Location(self.inlet_row, 0)
    }

    /// The last-column cell the outlet drains.
    pub fn outlet(&self) -> Location {
        Location(self.outlet_row, self.grid.cols() - 1)
    }

    /// A copy of [`Self::grid`] with the intended solution placed.
    pub fn solved_grid(&self) -> Grid {
        let mut grid = self.grid.clone();
        for (location, piece) in &self.solution {
            grid.place_piece(*location, *piece);
        }
        grid
    }
}

/// Puzzle generator owning its random source.
///
/// Seed it with [`Generator::from_seed`] for reproducible levels.
pub struct Generator<R: Rng = StdRng> {
    rng: R,
}

impl Generator<StdRng> {
    /// A generator whose output is fully determined by `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// A generator seeded from system entropy.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<R: Rng> Generator<R> {
    /// A generator drawing from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate one level. Always succeeds; see [`generate_level`].
    pub fn generate(&mut self, config: &LevelConfig) -> Puzzle {
        generate_level(config, &mut self.rng)
    }

    /// Generate one level per config, in order.
    pub fn generate_all(&mut self, configs: &[LevelConfig]) -> Vec<Puzzle> {
        generate_all_levels(configs, &mut self.rng)
    }
}

/// Generate one level per config, in order, drawing all randomness from `rng`.
pub fn generate_all_levels<R: Rng + ?Sized>(configs: &[LevelConfig], rng: &mut R) -> Vec<Puzzle> {
    configs.iter().map(|config| generate_level(config, rng)).collect()
}

/// Generate a level for `config`.
///
/// Rejected attempts are retried from scratch up to [`MAX_GENERATION_ATTEMPTS`] times, after which a fixed
/// zig-zag path is used, so this never fails.
#[instrument(level = "debug", skip_all, fields(min_path_length = config.min_path_length, loops = config.loop_count))]
pub fn generate_level<R: Rng + ?Sized>(config: &LevelConfig, rng: &mut R) -> Puzzle {
    for attempt in 0..MAX_GENERATION_ATTEMPTS {
        match attempt_level(config, rng) {
            Ok(puzzle) => {
                debug!(attempt, path_len = puzzle.path_len, cells = puzzle.solution.len(), "level generated");
                return puzzle;
            }
            Err(reason) => debug!(attempt, %reason, "generation attempt rejected"),
        }
    }

    warn!(attempts = MAX_GENERATION_ATTEMPTS, "every attempt rejected, using fallback path");
    fallback_level(config, rng)
}

fn attempt_level<R: Rng + ?Sized>(config: &LevelConfig, rng: &mut R) -> Result<Puzzle, GenerationError> {
    let (rows, cols) = (config.rows(), config.cols());
    let inlet_row = rng.gen_range(0..rows);
    let outlet_row = rng.gen_range(0..rows);
    let inlet = Location(inlet_row, 0);
    let outlet = Location(outlet_row, cols - 1);

    let path = find_path(&WalkSpec {
        rows,
        cols,
        start: inlet,
        target: outlet,
        min_len: config.min_path_length.max(1),
    }, rng)?;

    let mut grid = Grid::with_dims(config.dims);
    place_obstacles(&mut grid, &path, &config.obstacle_count, rng);
    if config.reject_trivial_shortcut {
        check_shortcut(&grid, inlet, outlet, path.len())?;
    }

    let mut graph = ConnectionGraph::from_path(&path, Direction::Left, Direction::Right);
    let added = add_loops(&mut graph, &grid, config.loop_count, rng);
    if added < config.loop_count {
        if config.require_all_loops {
            return Err(GenerationError::LoopUnavailable { requested: config.loop_count, added });
        }
        debug!(requested = config.loop_count, added, "accepting fewer branch loops");
    }

    let solution = graph.to_pieces()?;
    let manifest = manifest_for(&solution, config, rng);

    Ok(Puzzle {
        grid,
        inlet_row,
        outlet_row,
        manifest,
        solution,
        path_len: path.len(),
        fallback: false,
    })
}

fn fallback_level<R: Rng + ?Sized>(config: &LevelConfig, rng: &mut R) -> Puzzle {
    let inlet_row = rng.gen_range(0..config.rows());
    let outlet_row = rng.gen_range(0..config.rows());
    let path = fallback_path(config.cols(), inlet_row, outlet_row);
    let graph = ConnectionGraph::from_path(&path, Direction::Left, Direction::Right);

    let solution = graph.iter()
        .filter_map(|(location, openings)| PieceType::from_openings(openings).map(|piece| (location, piece)))
        .collect_vec();
    debug_assert_eq!(solution.len(), graph.len(), "fallback path produced an orphan junction");

    Puzzle {
        grid: Grid::with_dims(config.dims),
        inlet_row,
        outlet_row,
        manifest: manifest_for(&solution, config, rng),
        solution,
        path_len: path.len(),
        fallback: true,
    }
}

fn manifest_for<R: Rng + ?Sized>(solution: &[(Location, PieceType)], config: &LevelConfig, rng: &mut R) -> PieceManifest {
    let mut manifest = PieceManifest::tally(solution.iter().map(|(_, piece)| *piece));
    manifest.add_distractors(config.distractor_policy.count_for(solution.len()), rng);
    manifest
}
