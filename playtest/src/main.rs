use pipewright::{FlowSimulator, Generator, LevelConfig, Status};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// one frame at 60 fps
const FRAME: f64 = 1.0 / 60.0;
const MAX_FRAMES: usize = 60 * 600;

/// Reads `RUST_LOG`, defaulting to `warn`. Output goes to stderr.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

fn main() {
    init_logging();

    // RUST_LOG=pipewright=debug cargo run -p playtest -- 1234
    let seed = match std::env::args().nth(1).map(|arg| arg.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(err)) => {
            warn!(%err, "seed is not a number, using 0");
            0
        }
        None => 0,
    };

    let mut generator = Generator::from_seed(seed);
    for (tier, puzzle) in generator.generate_all(&LevelConfig::campaign()).into_iter().enumerate() {
        let solved = puzzle.solved_grid();
        println!("tier {} (inlet row {}, outlet row {}, path {} cells{})", tier, puzzle.inlet_row, puzzle.outlet_row,
                 puzzle.path_len, if puzzle.fallback { ", fallback" } else { "" });
        print!("{}", puzzle.grid);
        println!();
        print!("{}", solved);
        for (piece, count) in puzzle.manifest.iter() {
            print!("{}x{} ", piece.glyph(), count);
        }
        println!();

        let mut sim = FlowSimulator::new();
        if let Err(err) = sim.start(&solved, puzzle.inlet_row, puzzle.outlet_row) {
            warn!(tier, %err, "could not start simulation");
            continue;
        }
        let status = sim.run(FRAME, MAX_FRAMES);
        info!(tier, ?status, elapsed = sim.elapsed(), "simulated intended solution");
        match status {
            Status::Success => println!("flows in {:.2}s\n", sim.elapsed()),
            Status::LeakFail => println!("fails ({:?}) with {} leaks\n", sim.failure(), sim.leaks().len()),
            Status::None => println!("still flowing after {:.2}s\n", sim.elapsed()),
        }
    }
}
