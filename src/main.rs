use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::sync::Mutex;
use tracing::info;

use tides::{
    autoflood::AutoFlood,
    engine::{EngineBuilder, EngineSettings},
    scenario::ScenarioLoader,
    Simulation, SimulationEvent, World,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Hex terrain flood simulation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/coastal_demo.yaml")]
    scenario: PathBuf,

    /// Override turn count (uses scenario default when omitted)
    #[arg(long)]
    turns: Option<u64>,

    /// Override snapshot interval in turns (0 disables)
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Drive turns from the wall-clock timer instead of back to back
    #[arg(long)]
    auto_flood: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let config = scenario.map_config()?;
    let turns = scenario.turns(cli.turns);

    let settings = EngineSettings {
        snapshot_interval_turns: cli
            .snapshot_interval
            .unwrap_or(scenario.snapshot_interval_turns),
        snapshot_dir: cli
            .snapshot_dir
            .unwrap_or_else(|| PathBuf::from("snapshots")),
    };
    let engine = EngineBuilder::standard(settings, scenario.pollution_table()).build();
    let mut simulation = Simulation::new(engine)
        .with_catalog(scenario.catalog())
        .with_bands(scenario.bands);
    simulation.subscribe(|event| match event {
        SimulationEvent::TurnCompleted(summary) => info!(
            target: "tides::cli",
            turn = summary.turn,
            flooded = summary.converted.len(),
            sea_level = summary.sea_level,
            pollution = summary.pollution_total,
            "turn"
        ),
        SimulationEvent::BoardStateChanged { to, .. } => {
            info!(target: "tides::cli", state = ?to, "board")
        }
        SimulationEvent::MapBuilt { .. } => {}
    });
    simulation
        .build_map(&config)
        .with_context(|| format!("Failed to build map for scenario '{}'", scenario.name))?;

    let simulation = if cli.auto_flood {
        run_auto_flood(simulation, turns, &scenario).await?
    } else {
        for _ in 0..turns {
            simulation.next_turn()?;
        }
        simulation
    };

    let world = simulation.world().context("map unloaded during run")?;
    let state = world.state();
    println!(
        "Scenario '{}' completed {} turns. Sea level: {:.2}, flooded: {:.1}%, pollution: {:.1}, board: {:?}",
        scenario.name,
        state.turn,
        state.sea_level,
        world.flooded_ratio() * 100.0,
        state.pollution_total,
        simulation.board_state()
    );
    Ok(())
}

async fn run_auto_flood(
    simulation: Simulation,
    turns: u64,
    scenario: &tides::scenario::LoadedScenario,
) -> Result<Simulation> {
    let interval = scenario.auto_flood_interval()?;
    let remaining = turns.saturating_sub(simulation.world().map_or(0, World::turn));
    let shared = Arc::new(Mutex::new(simulation));
    let mut auto = AutoFlood::new(Arc::clone(&shared));
    if remaining > 0 {
        if !auto.start_limited(interval, remaining) {
            bail!("auto-flood could not start with interval {interval:?}");
        }

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut poll = tokio::time::interval(interval);
        while auto.is_flooding() {
            tokio::select! {
                _ = &mut ctrl_c => {
                    info!(target: "tides::cli", "interrupted");
                    break;
                }
                _ = poll.tick() => {}
            }
        }
        auto.stop().await;
    }
    drop(auto);

    let simulation = Arc::try_unwrap(shared)
        .map_err(|_| anyhow::anyhow!("simulation still shared after auto-flood stopped"))?;
    Ok(simulation.into_inner())
}
