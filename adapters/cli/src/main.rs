#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner for Route Defence.

mod leaderboard;
mod persistence;

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use route_defence_core::{CellCoord, Event, TowerKind};
use route_defence_simulation::{Simulation, SimulationConfig};
use route_defence_world::{query, Layout};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::leaderboard::Leaderboard;

/// Command-line arguments for the headless runner.
#[derive(Debug, Parser)]
#[command(
    name = "route-defence",
    about = "Runs a Route Defence session without a window"
)]
struct CliArgs {
    /// File listing one `(x, y)` waypoint per line.
    #[arg(long, value_name = "FILE")]
    route: PathBuf,

    /// Optional file listing extra `(column, row)` path cells.
    #[arg(long, value_name = "FILE")]
    path_cells: Option<PathBuf>,

    /// Number of grid columns.
    #[arg(long, default_value_t = 50)]
    columns: u32,

    /// Number of grid rows.
    #[arg(long, default_value_t = 36)]
    rows: u32,

    /// Side length of a grid cell in world units.
    #[arg(long, default_value_t = 20.0)]
    cell_length: f32,

    /// TOML file overriding cadence, economy, unit and wave settings.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Tower to place before the first wave, as `kind@column,row`.
    #[arg(long = "tower", value_name = "KIND@COL,ROW")]
    towers: Vec<TowerSpec>,

    /// Simulated seconds to run before stopping.
    #[arg(long, default_value_t = 60)]
    duration_secs: u64,

    /// Simulated milliseconds advanced per frame.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Writes a save code for the session to this file on exit.
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Restores towers, economy and wave from a save code file.
    #[arg(long, value_name = "FILE")]
    load: Option<PathBuf>,

    /// JSON leaderboard updated when the game ends.
    #[arg(long, default_value = "leaderboard.json")]
    leaderboard: PathBuf,

    /// Initials recorded on the leaderboard.
    #[arg(long, default_value = "AAA")]
    initials: String,
}

/// Tower placement request parsed from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TowerSpec {
    kind: TowerKind,
    cell: CellCoord,
}

impl FromStr for TowerSpec {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let (kind, cell) = value
            .split_once('@')
            .ok_or_else(|| anyhow!("expected `kind@column,row`, got `{value}`"))?;
        let (column, row) = cell
            .split_once(',')
            .ok_or_else(|| anyhow!("expected `column,row`, got `{cell}`"))?;

        Ok(Self {
            kind: kind.trim().parse()?,
            cell: CellCoord::new(
                column
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid column `{column}`"))?,
                row.trim()
                    .parse()
                    .with_context(|| format!("invalid row `{row}`"))?,
            ),
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();
    run(&args)
}

fn run(args: &CliArgs) -> Result<()> {
    let layout = load_layout(args)?;
    let config = load_config(args.config.as_deref())?;
    let mut simulation = Simulation::new(layout, config);

    if let Some(path) = &args.load {
        let code = fs::read_to_string(path)
            .with_context(|| format!("failed to read save code from {}", path.display()))?;
        let record = persistence::decode(&code)
            .with_context(|| format!("failed to decode save code from {}", path.display()))?;
        info!(
            towers = record.towers.len(),
            wave = record.wave.get(),
            "restoring save"
        );
        simulation.rehydrate(record);
    }

    for spec in &args.towers {
        match simulation.place_tower(spec.cell, spec.kind) {
            Ok(tower) => {
                debug!(tower = tower.get(), kind = %spec.kind, cell = %spec.cell, "tower placed");
            }
            Err(reason) => {
                warn!(kind = %spec.kind, cell = %spec.cell, %reason, "tower rejected");
            }
        }
    }

    let wave = simulation
        .start_wave()
        .context("failed to start the first wave")?;
    info!(wave = wave.get(), "wave started");

    let frame = Duration::from_millis(args.frame_ms.max(1));
    let deadline = Duration::from_secs(args.duration_secs);
    let mut elapsed = Duration::ZERO;
    while elapsed < deadline {
        simulation.advance(frame);
        elapsed += frame;
        report(&simulation.drain_events());

        if let Some(result) = simulation.take_game_over() {
            info!(score = result.score, wave = result.wave.get(), "session over");
            record_score(&args.leaderboard, &args.initials, result.score)?;
            break;
        }
    }

    let snapshot = simulation.snapshot();
    println!(
        "wave {} | money {} | health {} | score {} | units {} | towers {}",
        snapshot.wave.get(),
        snapshot.economy.money,
        snapshot.economy.health,
        snapshot.economy.score,
        snapshot.units.len(),
        snapshot.towers.len(),
    );

    if let Some(path) = &args.save {
        let code = persistence::encode(&simulation.save_record())
            .context("failed to encode save code")?;
        fs::write(path, format!("{code}\n"))
            .with_context(|| format!("failed to write save code to {}", path.display()))?;
        info!(path = %path.display(), "save code written");
    }

    Ok(())
}

fn load_layout(args: &CliArgs) -> Result<Layout> {
    let route = fs::read_to_string(&args.route)
        .with_context(|| format!("failed to read route from {}", args.route.display()))?;
    let cells = args
        .path_cells
        .as_ref()
        .map(|path| {
            fs::read_to_string(path)
                .with_context(|| format!("failed to read path cells from {}", path.display()))
        })
        .transpose()?;

    let layout = Layout::load(
        &route,
        cells.as_deref(),
        args.columns,
        args.rows,
        args.cell_length,
    )
    .context("failed to build layout")?;
    info!(
        waypoints = layout.route().len(),
        blocked = layout.grid().blocked_cells().count(),
        "layout loaded"
    );
    Ok(layout)
}

fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read config from {}", path.display()))?;
    SimulationConfig::from_toml_str(&source)
        .with_context(|| format!("invalid config in {}", path.display()))
}

fn record_score(path: &Path, initials: &str, score: u64) -> Result<()> {
    let mut board = Leaderboard::load(path)?;
    board.add(initials, score);
    board.save(path)?;
    if let Some(best) = board.entries().first() {
        info!(initials = %best.initials, score = best.score, "leaderboard leader");
    }
    Ok(())
}

fn report(events: &[Event]) {
    for event in events {
        match event {
            Event::UnitKilled {
                unit,
                tower,
                reward,
                ..
            } => {
                debug!(unit = unit.get(), tower = tower.get(), reward, "unit killed");
            }
            Event::UnitBreached { unit, damage } => {
                info!(unit = unit.get(), damage, "unit breached");
            }
            Event::GameOver { score } => info!(score, "game over"),
            _ => {}
        }
    }
}
