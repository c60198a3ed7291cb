#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates an Endless Dungeon map, plans the
//! route to the goal structure and prints both to the terminal.

mod ascii;
mod config;

use std::{fmt, io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use endless_dungeon_core::{CellCoord, Path};
use endless_dungeon_rendering::{AgentPresentation, RenderingBackend, Scene, VisualKey, VisualTable};
use endless_dungeon_system_generation::Generator;
use endless_dungeon_system_movement::{PathFollower, StepOutcome};
use endless_dungeon_system_pathfinding::find_path;
use endless_dungeon_world::{query, Grid, ReachabilityField};
use tracing::{info, Level};

use crate::{
    ascii::AsciiBackend,
    config::{parse_cell, FileConfig, Overrides, RunConfig},
};

/// Generate a dungeon map and walk an agent to its goal structure
#[derive(Parser, Debug)]
#[command(name = "endless-dungeon")]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML configuration file; flags override its values
    #[arg(short = 'c', long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Visual manifest replacing the built-in glyph table
    #[arg(short = 'm', long, value_name = "PATH")]
    manifest: Option<PathBuf>,

    /// Start cell as COLUMN,ROW; defaults to the west end of the corridor
    #[arg(long, value_name = "C,R", value_parser = parse_cell)]
    start: Option<CellCoord>,

    /// Goal cell as COLUMN,ROW; defaults to the structure anchor
    #[arg(long, value_name = "C,R", value_parser = parse_cell)]
    goal: Option<CellCoord>,

    /// Number of movement steps to simulate before printing
    #[arg(long, default_value_t = 0)]
    steps: u32,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    overrides: Overrides,
}

/// Entry point for the Endless Dungeon command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    run(&args)
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let config = RunConfig::resolve(&file, &args.overrides)?;
    let seed = config.seed.unwrap_or_else(rand::random);
    info!(seed, "generating map");

    let grid = Generator::new(config.generation)
        .generate(seed)
        .context("failed to generate map")?;
    let anchor = query::structure_anchor(&grid).context("generated map has no goal structure")?;
    let start = args.start.unwrap_or(CellCoord::new(0, anchor.row()));
    let goal = args.goal.unwrap_or(anchor);

    let path = find_path(&grid, start, goal).context("failed to plan path")?;
    let field = ReachabilityField::from_goal(&grid, goal)?;

    let table = match &args.manifest {
        Some(path) => VisualTable::from_manifest_path(path)?,
        None => ascii::default_table(),
    };
    let scene = Scene::from_grid(&grid, &table, config.layout.tile_size())?.with_path(&path);
    let agent = simulate_agent(&path, &config, args.steps, &table)?;

    AsciiBackend::new(io::stdout().lock()).present(&scene, agent)?;

    println!(
        "{}",
        Summary {
            seed,
            grid: &grid,
            start,
            goal,
            path: &path,
            reachable_cells: field.reachable_count(),
        }
    );
    Ok(())
}

fn simulate_agent(
    path: &Path,
    config: &RunConfig,
    steps: u32,
    table: &VisualTable,
) -> Result<Option<AgentPresentation>> {
    if steps == 0 || path.is_empty() {
        return Ok(None);
    }

    let mut follower = PathFollower::new(path.clone(), config.movement)?;
    for _ in 0..steps {
        if follower.step() == StepOutcome::Finished {
            break;
        }
    }

    Ok(Some(AgentPresentation {
        position: follower.position(),
        heading_degrees: follower.heading_degrees(),
        cell: follower.nearest_cell(),
        resource: table.resource(VisualKey::Agent).map(str::to_owned),
    }))
}

/// Trailing report printed below the map.
struct Summary<'a> {
    seed: u64,
    grid: &'a Grid,
    start: CellCoord,
    goal: CellCoord,
    path: &'a Path,
    reachable_cells: usize,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let census = query::census(self.grid);
        writeln!(f, "seed: {}", self.seed)?;
        writeln!(f, "size: {}x{}", self.grid.columns(), self.grid.rows())?;
        writeln!(f, "obstacles placed: {}", census.obstacles())?;
        writeln!(
            f,
            "route: ({}, {}) -> ({}, {})",
            self.start.column(),
            self.start.row(),
            self.goal.column(),
            self.goal.row()
        )?;
        if self.path.is_empty() {
            writeln!(f, "path length: unreachable")?;
        } else {
            writeln!(f, "path length: {} cells", self.path.len())?;
        }
        write!(f, "reachable cells: {}", self.reachable_cells)
    }
}
