pub mod autoflood;
pub mod config;
pub mod engine;
pub mod geo;
pub mod grid;
pub mod hex;
pub mod mapgen;
pub mod scenario;
pub mod simulation;
pub mod snapshot;
pub mod systems;
pub mod terrain;
pub mod world;

pub use config::MapConfig;
pub use engine::{Engine, EngineBuilder, EngineSettings, TurnSummary};
pub use simulation::{BoardState, Simulation, SimulationError, SimulationEvent};
pub use world::World;
