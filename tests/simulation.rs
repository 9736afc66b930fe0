mod common;

use std::sync::{Arc, Mutex};

use tides::{
    engine::{EngineBuilder, EngineSettings},
    grid::{GridError, TileCatalog},
    hex::HexLayout,
    simulation::PollutionBands,
    systems::PollutionTable,
    terrain::TerrainCategory,
    BoardState, Simulation, SimulationError, SimulationEvent,
};

fn recorder(simulation: &mut Simulation) -> Arc<Mutex<Vec<SimulationEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    simulation.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    events
}

#[test]
fn build_map_announces_a_new_board() {
    let rows = common::island_basin();
    let config = common::config("basin", &common::as_cells(&rows), 1.0);
    let mut simulation = Simulation::default();
    let events = recorder(&mut simulation);

    let world = simulation.build_map(&config).unwrap();
    assert_eq!(world.grid().len(), 9);
    assert_eq!(world.turn(), 0);
    assert_eq!(simulation.board_state(), BoardState::NewBoard);

    let events = events.lock().unwrap();
    assert!(matches!(
        events[0],
        SimulationEvent::MapBuilt {
            rows: 3,
            columns: 3,
            starting_water_tiles: 1,
            ..
        }
    ));
    assert!(matches!(
        events[1],
        SimulationEvent::BoardStateChanged {
            from: BoardState::NoMap,
            to: BoardState::NewBoard
        }
    ));
}

#[test]
fn next_turn_advances_the_counters() {
    let rows = common::island_basin();
    let config = common::config("basin", &common::as_cells(&rows), 1.0);
    let mut simulation = Simulation::default();
    simulation.build_map(&config).unwrap();

    let summary = simulation.next_turn().unwrap();
    assert_eq!(summary.turn, 1);
    assert_eq!(summary.sea_level, 1.0);
    assert!(summary.converted.is_empty());
    assert_eq!(summary.water_tiles, 1);

    simulation.next_turn().unwrap();
    let third = simulation.next_turn().unwrap();
    assert_eq!(third.turn, 3);
    assert_eq!(third.converted.len(), 8);
    assert_eq!(third.merge_groups.len(), 1);
    assert_eq!(third.merge_groups[0].len(), 9);
    let names: Vec<&str> = third.system_reports.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["flood", "region_merge", "pollution"]);
}

#[test]
fn get_tile_reports_out_of_range() {
    let rows = common::island_basin();
    let config = common::config("basin", &common::as_cells(&rows), 1.0);
    let mut simulation = Simulation::default();
    simulation.build_map(&config).unwrap();

    let tile = simulation.tile(1, 1).unwrap();
    assert_eq!(tile.terrain, TerrainCategory::Ocean);
    assert!(matches!(
        simulation.tile(3, 0),
        Err(SimulationError::Grid(GridError::IndexOutOfRange { row: 3, col: 0, .. }))
    ));
}

#[test]
fn missing_prefab_leaves_no_map_loaded() {
    let rows = common::island_basin();
    let config = common::config("basin", &common::as_cells(&rows), 1.0);

    let ocean_only = TileCatalog::new(HexLayout::default(), [TerrainCategory::Ocean]);
    let mut simulation = Simulation::default().with_catalog(ocean_only);
    let err = simulation.build_map(&config).unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Grid(GridError::MissingPrefabOfType(TerrainCategory::Barren))
    ));
    assert!(!simulation.is_loaded());
    assert_eq!(simulation.board_state(), BoardState::NoMap);
    assert!(matches!(simulation.next_turn(), Err(SimulationError::NoMapLoaded)));
}

#[test]
fn failed_rebuild_drops_the_previous_map() {
    let rows = common::island_basin();
    let good = common::config("basin", &common::as_cells(&rows), 1.0);
    let catalog = TileCatalog::new(
        HexLayout::default(),
        [TerrainCategory::Ocean, TerrainCategory::Barren],
    );
    let mut simulation = Simulation::default().with_catalog(catalog);
    simulation.build_map(&good).unwrap();
    assert!(simulation.is_loaded());

    let bad = common::config("farm", &[&[("Agriculture", 1.0)]], 1.0);
    assert!(simulation.build_map(&bad).is_err());
    assert!(!simulation.is_loaded());
    assert_eq!(simulation.board_state(), BoardState::NoMap);
}

#[test]
fn rebuilding_starts_from_turn_zero() {
    let rows = common::island_basin();
    let config = common::config("basin", &common::as_cells(&rows), 1.0);
    let mut simulation = Simulation::default();
    simulation.build_map(&config).unwrap();
    simulation.next_turn().unwrap();
    simulation.next_turn().unwrap();

    let world = simulation.build_map(&config).unwrap();
    assert_eq!(world.turn(), 0);
    assert_eq!(world.state().sea_level, 0.0);
    assert_eq!(simulation.board_state(), BoardState::NewBoard);
}

#[test]
fn pollution_moves_the_board_through_bands() {
    let config = common::config("city", &[&[("Urban", 40.0), ("Urban", 40.0)]], 0.1);
    let bands = PollutionBands {
        moderate: 50_000.0,
        high: 140_000.0,
    };
    let mut simulation = Simulation::default().with_bands(bands);
    let events = recorder(&mut simulation);
    simulation.build_map(&config).unwrap();

    // 48,000 per turn.
    simulation.next_turn().unwrap();
    assert_eq!(simulation.board_state(), BoardState::LowPollution);
    simulation.next_turn().unwrap();
    assert_eq!(simulation.board_state(), BoardState::ModeratePollution);
    simulation.next_turn().unwrap();
    assert_eq!(simulation.board_state(), BoardState::HighPollution);

    let transitions: Vec<BoardState> = events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            SimulationEvent::BoardStateChanged { to, .. } => Some(*to),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        [
            BoardState::NewBoard,
            BoardState::LowPollution,
            BoardState::ModeratePollution,
            BoardState::HighPollution
        ]
    );
}

#[test]
fn snapshot_failure_does_not_undo_the_turn() {
    let temp = tempfile::tempdir().expect("tempdir");
    let blocker = temp.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let settings = EngineSettings {
        snapshot_interval_turns: 1,
        snapshot_dir: blocker,
    };
    let engine = EngineBuilder::standard(settings, PollutionTable::default()).build();
    let mut simulation = Simulation::new(engine);
    let events = recorder(&mut simulation);
    let rows = common::island_basin();
    let config = common::config("basin", &common::as_cells(&rows), 1.0);
    simulation.build_map(&config).unwrap();

    let summary = simulation.next_turn().expect("turn still completes");
    assert_eq!(summary.turn, 1);
    assert!(summary.snapshot_path.is_none());
    assert_eq!(simulation.world().unwrap().turn(), 1);
    assert_eq!(simulation.board_state(), BoardState::LowPollution);
    assert!(events
        .lock()
        .unwrap()
        .iter()
        .any(|event| matches!(event, SimulationEvent::TurnCompleted(summary) if summary.turn == 1)));
}
