//! The top-level simulation context the orchestration layer talks to.
//!
//! `Simulation` owns the engine, the current world (if a map has been built)
//! and the observer list. All commands go through `&mut self`, so one caller
//! drives it at a time; the auto-flood driver shares it behind a mutex.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::MapConfig,
    engine::{Engine, EngineBuilder, EngineSettings, TurnSummary},
    grid::{GridError, Tile, TileCatalog},
    systems::PollutionTable,
    world::World,
};

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("no map loaded")]
    NoMapLoaded,
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Turn(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardState {
    NoMap,
    NewBoard,
    LowPollution,
    ModeratePollution,
    HighPollution,
}

/// Cumulative-pollution thresholds between the board states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PollutionBands {
    pub moderate: f64,
    pub high: f64,
}

impl PollutionBands {
    pub fn classify(&self, pollution_total: f64) -> BoardState {
        if pollution_total >= self.high {
            BoardState::HighPollution
        } else if pollution_total >= self.moderate {
            BoardState::ModeratePollution
        } else {
            BoardState::LowPollution
        }
    }
}

impl Default for PollutionBands {
    fn default() -> Self {
        Self {
            moderate: 1_000_000.0,
            high: 10_000_000.0,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SimulationEvent {
    MapBuilt {
        map: String,
        rows: usize,
        columns: usize,
        starting_water_tiles: usize,
    },
    TurnCompleted(TurnSummary),
    BoardStateChanged {
        from: BoardState,
        to: BoardState,
    },
}

type Observer = Box<dyn FnMut(&SimulationEvent) + Send>;

pub struct Simulation {
    engine: Engine,
    catalog: TileCatalog,
    bands: PollutionBands,
    world: Option<World>,
    board_state: BoardState,
    observers: Vec<Observer>,
}

impl Simulation {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            catalog: TileCatalog::default(),
            bands: PollutionBands::default(),
            world: None,
            board_state: BoardState::NoMap,
            observers: Vec::new(),
        }
    }

    pub fn with_catalog(mut self, catalog: TileCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_bands(mut self, bands: PollutionBands) -> Self {
        self.bands = bands;
        self
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&SimulationEvent) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Replaces the current map. On failure the simulation is left with no
    /// map loaded.
    pub fn build_map(&mut self, config: &MapConfig) -> Result<&World, SimulationError> {
        let world = match World::build(config, &self.catalog) {
            Ok(world) => world,
            Err(err) => {
                tracing::error!(
                    target: "tides::simulation",
                    map = config.name(),
                    error = %err,
                    "map build failed"
                );
                self.world = None;
                self.transition(BoardState::NoMap);
                return Err(err.into());
            }
        };
        tracing::info!(
            target: "tides::simulation",
            map = world.name(),
            rows = world.grid().row_count(),
            columns = world.grid().column_count(),
            water = world.state().starting_water_tiles,
            "map built"
        );
        let event = SimulationEvent::MapBuilt {
            map: world.name().to_string(),
            rows: world.grid().row_count(),
            columns: world.grid().column_count(),
            starting_water_tiles: world.state().starting_water_tiles,
        };
        self.world = Some(world);
        self.emit(&event);
        self.transition(BoardState::NewBoard);
        self.world.as_ref().ok_or(SimulationError::NoMapLoaded)
    }

    /// Floods once, regroups water and accounts pollution.
    pub fn next_turn(&mut self) -> Result<TurnSummary, SimulationError> {
        let world = self.world.as_mut().ok_or(SimulationError::NoMapLoaded)?;
        let summary = self.engine.step(world)?;
        tracing::debug!(
            target: "tides::simulation",
            turn = summary.turn,
            converted = summary.converted.len(),
            pollution_total = summary.pollution_total,
            flooded_ratio = summary.flooded_ratio,
            "turn completed"
        );
        let next_state = self.bands.classify(summary.pollution_total);
        self.emit(&SimulationEvent::TurnCompleted(summary.clone()));
        self.transition(next_state);
        Ok(summary)
    }

    pub fn tile(&self, row: usize, col: usize) -> Result<&Tile, SimulationError> {
        let world = self.world.as_ref().ok_or(SimulationError::NoMapLoaded)?;
        Ok(world.tile(row, col)?)
    }

    /// Zero when no map is loaded.
    pub fn flooded_ratio(&self) -> f64 {
        self.world.as_ref().map_or(0.0, World::flooded_ratio)
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.world.is_some()
    }

    pub fn board_state(&self) -> BoardState {
        self.board_state
    }

    fn transition(&mut self, to: BoardState) {
        let from = self.board_state;
        if from == to {
            return;
        }
        self.board_state = to;
        tracing::info!(target: "tides::simulation", ?from, ?to, "board state changed");
        self.emit(&SimulationEvent::BoardStateChanged { from, to });
    }

    fn emit(&mut self, event: &SimulationEvent) {
        for observer in &mut self.observers {
            observer(event);
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        let engine =
            EngineBuilder::standard(EngineSettings::default(), PollutionTable::default()).build();
        Self::new(engine)
    }
}
