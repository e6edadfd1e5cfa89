use docopt::Docopt;
use error_chain::bail;
use serde_derive::Deserialize;
use mazes3d::{
    generation::{GenerationPass, GeneratorConfigBuilder, MazeGenerator, PassStatus},
    lattice_dimensions::LatticeDimensions,
    partitions::{Orientation, PartitionKind},
    units::{Depth, Height, Width},
};
use std::{
    io,
    io::prelude::*,
    fs::File,
    time::{Duration, Instant},
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "Mazes3d

Usage:
    mazes3d_driver -h | --help
    mazes3d_driver [--width=<w>] [--height=<h>] [--depth=<d>] [--seed=<n>] [--frame-rate=<n>] [--frames] [--text] [--text-out=<path>]

Options:
    -h --help              Show this screen.
    --width=<w>            Number of cells along x [default: 5].
    --height=<h>           Number of layers along y [default: 1].
    --depth=<d>            Number of cells along z [default: 5].
    --seed=<n>             Seed for the maze. A random maze is generated if not given.
    --frame-rate=<n>       Target frames per second of the simulated frame loop [default: 30].
    --frames               Generate a slice at a time inside a simulated frame loop and report how many frames it took.
    --text                 Print each layer of the carved maze.
    --text-out=<path>      Output file path for a textual rendering of the carved maze.

Set RUST_LOG (e.g. RUST_LOG=mazes3d=debug) to see generation logs on stderr.
";
#[derive(Debug, Deserialize)]
struct MazeArgs {
    flag_width: usize,
    flag_height: usize,
    flag_depth: usize,
    flag_seed: Option<u64>,
    flag_frame_rate: u32,
    flag_frames: bool,
    flag_text: bool,
    flag_text_out: String,
}

mod errors {
    use error_chain::*;
    error_chain! {

        links {
            Generation(::mazes3d::errors::Error, ::mazes3d::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    init_logging();

    let dimensions = LatticeDimensions::new(Width(args.flag_width),
                                            Height(args.flag_height),
                                            Depth(args.flag_depth))
        .chain_err(|| "Invalid maze size")?;

    let config = GeneratorConfigBuilder::new()
        .target_frame_rate(args.flag_frame_rate)
        .seed(args.flag_seed)
        .build();
    let mut generator = MazeGenerator::new(config);
    let mut pass = generator.generate(dimensions)?;

    let status = if args.flag_frames {
        let (status, frames) = run_frame_loop(&mut pass, &mut generator);
        println!("generated in {} frames, {} steps", frames, pass.steps());
        status
    } else {
        pass.run_to_completion(&mut generator)
    };
    if status != PassStatus::Completed {
        bail!("Maze generation did not complete: {:?}", status);
    }

    print_summary(&generator, &dimensions);

    if let Some(maze) = generator.maze() {
        if args.flag_text {
            println!("{}", maze);
        }
        if !args.flag_text_out.is_empty() {
            write_text_to_file(&format!("{}", maze), &args.flag_text_out)
                .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

/// Resume the pass once per frame, feeding it the measured duration of the previous frame.
fn run_frame_loop(pass: &mut GenerationPass, generator: &mut MazeGenerator) -> (PassStatus, usize) {
    let mut frames = 0;
    let mut frame_delta = Duration::from_secs(0);
    let mut frame_start = Instant::now();
    loop {
        frames += 1;
        match pass.resume(generator, frame_delta) {
            PassStatus::InProgress => {
                let now = Instant::now();
                frame_delta = now.duration_since(frame_start);
                frame_start = now;
            }
            status => return (status, frames),
        }
    }
}

fn print_summary(generator: &MazeGenerator, dimensions: &LatticeDimensions) {
    let inner = generator.inner_placements();
    let floors = inner.iter().filter(|p| p.kind == PartitionKind::Floor).count();
    let rotated = inner.iter()
        .filter(|p| p.kind == PartitionKind::Wall && p.orientation == Orientation::Rotated90)
        .count();

    println!("run {}: {}x{}x{} cells",
             generator.current_run().value(),
             dimensions.width().0,
             dimensions.height().0,
             dimensions.depth().0);
    println!("{} placements: {} boundary walls, {} inner walls ({} rotated), {} floors",
             generator.placements().len(),
             generator.boundary_placements().len(),
             inner.len() - floors,
             rotated,
             floors);
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}
