#![forbid(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;
use glam::IVec3;
use stronghold_locator::engine::DEFAULT_TOP_K;
use stronghold_locator::geometry::{EYE_OFFSET_ALTERNATE, EYE_OFFSET_STANDARD};
use stronghold_locator::prelude::*;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// X block coordinate of the first throw
    #[arg(long, allow_hyphen_values = true)]
    x: i32,

    /// Z block coordinate of the first throw
    #[arg(long, allow_hyphen_values = true)]
    z: i32,

    /// Heading of the first throw in degrees (0 = north, 90 = east)
    #[arg(long, allow_hyphen_values = true)]
    heading: f64,

    /// Measured distance to the stronghold for the first throw, in blocks
    #[arg(long)]
    distance: Option<f64>,

    /// Key presses counted for the first throw, converted to a distance
    #[arg(long, conflicts_with = "distance")]
    presses: Option<u32>,

    /// X block coordinate of the second throw
    #[arg(long, allow_hyphen_values = true, requires_all = ["z2", "heading2"])]
    x2: Option<i32>,

    /// Z block coordinate of the second throw
    #[arg(long, allow_hyphen_values = true, requires_all = ["x2", "heading2"])]
    z2: Option<i32>,

    /// Heading of the second throw in degrees
    #[arg(long, allow_hyphen_values = true, requires_all = ["x2", "z2"])]
    heading2: Option<f64>,

    /// Number of candidates to print
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Sub-block eye offset; defaults to the Java edition value
    #[arg(long)]
    eye_offset: Option<f64>,

    /// Use the alternative eye offset instead of the standard one
    #[arg(long, conflicts_with = "eye_offset")]
    alternate_offset: bool,

    /// Refine each cell down to its most likely chunk
    #[arg(long)]
    sub_cell: bool,

    /// Include the scattered structure class in the grid
    #[arg(long)]
    scattered: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let eye_offset = match (args.eye_offset, args.alternate_offset) {
        (Some(offset), _) => offset,
        (None, true) => EYE_OFFSET_ALTERNATE,
        (None, false) => EYE_OFFSET_STANDARD,
    };
    let scoring = ScoringConfig::default()
        .with_eye_offset(eye_offset)
        .with_sub_cell_precision(args.sub_cell.then(SubCellPrecision::default));
    let config = EngineConfig::default()
        .with_scoring(scoring)
        .with_top_k(args.top_k);

    let mut grid = GridConfig::default();
    if args.scattered {
        grid = grid.with_class(ClassConfig::scattered());
    }
    let cells = CellSet::generate(&grid).context("generating placement cells")?;
    info!("Grid holds {} cells.", cells.len());

    let mut engine = InferenceEngine::new(cells.into(), config).context("configuring engine")?;

    let distance = match (args.distance, args.presses) {
        (Some(d), _) => Some(d),
        (None, Some(presses)) => match distance_from_pixel_count(presses) {
            Some(d) => Some(d),
            None => bail!("--presses must be at least 1"),
        },
        (None, None) => None,
    };
    engine
        .record(IVec3::new(args.x, 64, args.z), args.heading, distance)
        .context("first throw")?;

    if let (Some(x2), Some(z2), Some(heading2)) = (args.x2, args.z2, args.heading2) {
        engine
            .record(IVec3::new(x2, 64, z2), heading2, None)
            .context("second throw")?;
    }

    let result = engine.calculate_default().context("calculating")?;
    println!("mode: {:?}", result.mode);
    for diagnostic in &result.diagnostics {
        println!("note: {diagnostic}");
    }
    println!(
        "{:>3}  {:>14}  {:>12}  {:>8}  {:>8}  {:>8}  label",
        "#", "overworld", "nether", "prob", "conf", "dist"
    );
    for (rank, c) in result.candidates.iter().enumerate() {
        println!(
            "{:>3}  {:>14}  {:>12}  {:>7.1}%  {:>7.1}%  {:>8.0}  {}",
            rank + 1,
            format!("{}, {}", c.overworld.x, c.overworld.y),
            format!("{}, {}", c.nether.x, c.nether.y),
            c.normalized_probability * 100.0,
            c.confidence * 100.0,
            c.distance_from_observer,
            c.diagnostic_label
        );
    }
    Ok(())
}
