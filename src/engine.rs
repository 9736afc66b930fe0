use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    grid::TileId,
    hex::GridIndex,
    snapshot::SnapshotWriter,
    systems::{FloodSystem, PollutionSystem, PollutionTable, RegionMergeSystem},
    world::World,
};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Zero disables snapshots.
    pub snapshot_interval_turns: u64,
    pub snapshot_dir: PathBuf,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            snapshot_interval_turns: 0,
            snapshot_dir: PathBuf::from("snapshots"),
        }
    }
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    /// Flood, then regroup water, then account pollution.
    pub fn standard(settings: EngineSettings, pollution: PollutionTable) -> Self {
        Self::new(settings)
            .with_system(FloodSystem::new())
            .with_system(RegionMergeSystem::new())
            .with_system(PollutionSystem::new(pollution))
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn push_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    pub fn build(self) -> Engine {
        Engine {
            systems: self.systems,
            snapshot_writer: SnapshotWriter::new(
                &self.settings.snapshot_dir,
                self.settings.snapshot_interval_turns,
            ),
        }
    }
}

pub struct Engine {
    systems: Vec<Box<dyn System>>,
    snapshot_writer: SnapshotWriter,
}

impl Engine {
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|system| system.name()).collect()
    }

    /// Runs every system once, in registration order, and closes the turn.
    pub fn step(&mut self, world: &mut World) -> Result<TurnSummary> {
        let turn = world.turn() + 1;
        let map_name = world.name().to_string();
        world.begin_turn();

        let mut system_reports = Vec::with_capacity(self.systems.len());
        for system in &mut self.systems {
            let ctx = SystemContext {
                turn,
                flood_increment: world.flood_increment(),
                map_name: &map_name,
            };
            let start = Instant::now();
            system
                .run(&ctx, world)
                .with_context(|| format!("system '{}' failed on turn {turn}", system.name()))?;
            system_reports.push(SystemRunReport {
                name: system.name().to_string(),
                duration_ms: start.elapsed().as_secs_f64() * 1_000.0,
            });
        }
        world.advance_turn();

        // The turn is committed; a failed snapshot only costs the file.
        let snapshot_path = match self.snapshot_writer.maybe_write(world) {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!(
                    target: "tides::engine",
                    turn = world.turn(),
                    error = %err,
                    "snapshot write failed"
                );
                None
            }
        };
        Ok(TurnSummary::collect(world, system_reports, snapshot_path))
    }

    pub fn run(&mut self, world: &mut World, turns: u64) -> Result<()> {
        self.run_with_hook(world, turns, |_| {})
    }

    pub fn run_with_hook<F>(&mut self, world: &mut World, turns: u64, mut hook: F) -> Result<()>
    where
        F: FnMut(&TurnSummary),
    {
        for _ in 0..turns {
            let summary = self.step(world)?;
            hook(&summary);
        }
        Ok(())
    }
}

pub struct SystemContext<'a> {
    pub turn: u64,
    pub flood_increment: f64,
    pub map_name: &'a str,
}

pub trait System: Send {
    fn name(&self) -> &str;
    fn run(&mut self, ctx: &SystemContext, world: &mut World) -> Result<()>;
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemRunReport {
    pub name: String,
    pub duration_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnSummary {
    pub turn: u64,
    pub converted: Vec<GridIndex>,
    pub freed_pollution: f64,
    pub pollution_delta: f64,
    pub pollution_total: f64,
    pub sea_level: f64,
    pub water_tiles: usize,
    pub flooded_ratio: f64,
    pub merge_groups: Vec<Vec<TileId>>,
    pub system_reports: Vec<SystemRunReport>,
    pub snapshot_path: Option<PathBuf>,
}

impl TurnSummary {
    fn collect(
        world: &World,
        system_reports: Vec<SystemRunReport>,
        snapshot_path: Option<PathBuf>,
    ) -> Self {
        let state = world.state();
        Self {
            turn: state.turn,
            converted: world.ledger.converted.clone(),
            freed_pollution: world.ledger.freed_pollution,
            pollution_delta: world.ledger.pollution_delta,
            pollution_total: state.pollution_total,
            sea_level: state.sea_level,
            water_tiles: world.grid().water_count(),
            flooded_ratio: world.flooded_ratio(),
            merge_groups: world.merge_groups(),
            system_reports,
            snapshot_path,
        }
    }
}
