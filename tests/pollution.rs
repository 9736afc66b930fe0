mod common;

use tides::{
    grid::TileCatalog,
    systems::{pollution_per_turn, PollutionTable},
    terrain::TerrainCategory,
    Simulation,
};

#[test]
fn urban_and_forest_totals() {
    let urban = [("Urban", 3.0); 5];
    let forest = [("Forest", 3.0); 5];
    let grid = common::grid(&[&urban, &forest]);
    let table = PollutionTable::empty()
        .with(TerrainCategory::Urban, 24_000.0)
        .with(TerrainCategory::Forest, -0.1);

    let total = pollution_per_turn(&grid, &table);
    assert!((total - 119_999.5).abs() < 1e-6, "got {total}");
    // The default table has the same two entries for these categories.
    let default_total = pollution_per_turn(&grid, &PollutionTable::default());
    assert!((default_total - 119_999.5).abs() < 1e-6);
}

#[test]
fn water_and_barren_emit_nothing() {
    let grid = common::grid(&[&[("Salt Water", 0.0), ("Barren", 12.0), ("Glaciers and Snow", 80.0)]]);
    assert_eq!(pollution_per_turn(&grid, &PollutionTable::default()), 0.0);
}

#[test]
fn fresh_map_has_flooded_nothing() {
    let rows = common::island_basin();
    let config = common::config("basin", &common::as_cells(&rows), 1.0);
    let mut simulation = Simulation::default().with_catalog(TileCatalog::default());
    let world = simulation.build_map(&config).unwrap();
    assert_eq!(world.flooded_ratio(), 0.0);
    assert_eq!(simulation.flooded_ratio(), 0.0);
}

#[test]
fn flooded_ratio_counts_only_new_water() {
    let rows = common::island_basin();
    let config = common::config("basin", &common::as_cells(&rows), 1.0);
    let mut simulation = Simulation::default();
    simulation.build_map(&config).unwrap();
    for _ in 0..3 {
        simulation.next_turn().unwrap();
    }
    assert!((simulation.flooded_ratio() - 8.0 / 9.0).abs() < 1e-12);
}

#[test]
fn pollution_accumulates_each_turn() {
    let config = common::config("town", &[&[("Salt Water", 0.0), ("Urban", 50.0)]], 0.1);
    let mut simulation = Simulation::default();
    simulation.build_map(&config).unwrap();
    let first = simulation.next_turn().unwrap();
    let second = simulation.next_turn().unwrap();
    assert_eq!(first.pollution_delta, 24_000.0);
    assert_eq!(second.pollution_total, 48_000.0);
    assert_eq!(second.freed_pollution, 0.0);
}
