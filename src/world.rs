use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    config::MapConfig,
    grid::{build_grid, GridError, Tile, TileCatalog, TileGrid, TileId},
    hex::GridIndex,
    systems::{flooded_ratio, merge_water_regions, WaterRegion},
};

/// Counters carried from turn to turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub turn: u64,
    pub pollution_total: f64,
    /// Cumulative rise applied to every water tile since the map was built.
    pub sea_level: f64,
    pub starting_water_tiles: usize,
    pub total_tiles: usize,
}

/// Scratch space the systems fill during a single turn.
#[derive(Debug, Clone, Default)]
pub(crate) struct TurnLedger {
    pub(crate) converted: Vec<GridIndex>,
    pub(crate) freed_pollution: f64,
    pub(crate) pollution_delta: f64,
}

#[derive(Debug)]
pub struct World {
    pub(crate) name: String,
    pub(crate) grid: TileGrid,
    pub(crate) state: SimulationState,
    pub(crate) regions: Vec<WaterRegion>,
    pub(crate) ledger: TurnLedger,
    flood_increment: f64,
}

impl World {
    /// Builds the tile grid for `config` and groups the initial water.
    pub fn build(config: &MapConfig, catalog: &TileCatalog) -> Result<Self, GridError> {
        let grid = build_grid(config.geo(), config.scale_offset(), catalog)?;
        let state = SimulationState {
            starting_water_tiles: grid.water_count(),
            total_tiles: grid.len(),
            ..SimulationState::default()
        };
        let regions = merge_water_regions(&grid);
        Ok(Self {
            name: config.name().to_string(),
            grid,
            state,
            regions,
            ledger: TurnLedger::default(),
            flood_increment: config.flood_increment(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn turn(&self) -> u64 {
        self.state.turn
    }

    pub fn flood_increment(&self) -> f64 {
        self.flood_increment
    }

    pub fn regions(&self) -> &[WaterRegion] {
        &self.regions
    }

    /// Regions with more than one tile, as tile-id groups.
    pub fn merge_groups(&self) -> Vec<Vec<TileId>> {
        self.regions
            .iter()
            .filter(|region| region.needs_merge())
            .map(|region| region.tile_ids.clone())
            .collect()
    }

    pub fn tile(&self, row: usize, col: usize) -> Result<&Tile, GridError> {
        self.grid.tile(row, col)
    }

    pub fn flooded_ratio(&self) -> f64 {
        flooded_ratio(
            self.grid.water_count(),
            self.state.starting_water_tiles,
            self.state.total_tiles,
        )
    }

    pub(crate) fn begin_turn(&mut self) {
        self.ledger = TurnLedger::default();
    }

    pub(crate) fn advance_turn(&mut self) {
        self.state.turn += 1;
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            map: self.name.clone(),
            generated_at: Utc::now(),
            state: self.state.clone(),
            flooded_ratio: self.flooded_ratio(),
            rows: self.grid.row_count(),
            columns: self.grid.column_count(),
            merge_groups: self.merge_groups(),
            tiles: self.grid.iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub map: String,
    pub generated_at: DateTime<Utc>,
    pub state: SimulationState,
    pub flooded_ratio: f64,
    pub rows: usize,
    pub columns: usize,
    pub merge_groups: Vec<Vec<TileId>>,
    pub tiles: Vec<Tile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{GeoGrid, GeoSample};

    fn config() -> MapConfig {
        // One ocean column on the left of a 3x6 survey, flat forest elsewhere.
        let rows = (0..3)
            .map(|r| {
                (0..6)
                    .map(|c| {
                        let label = if c <= 1 { "Salt Water" } else { "Forest" };
                        GeoSample::new(r as f64, c as f64, 5.0, label)
                    })
                    .collect()
            })
            .collect();
        MapConfig::new("strip", GeoGrid::new(rows).unwrap(), 1, 0.5).unwrap()
    }

    #[test]
    fn build_records_starting_counts() {
        let world = World::build(&config(), &TileCatalog::default()).unwrap();
        assert_eq!(world.state().total_tiles, 12);
        assert_eq!(world.state().starting_water_tiles, 3);
        assert_eq!(world.turn(), 0);
        assert_eq!(world.flooded_ratio(), 0.0);
        assert_eq!(world.regions().len(), 1);
        assert_eq!(world.merge_groups(), vec![world.regions()[0].tile_ids.clone()]);
    }

    #[test]
    fn snapshot_carries_every_tile() {
        let world = World::build(&config(), &TileCatalog::default()).unwrap();
        let snapshot = world.snapshot();
        assert_eq!(snapshot.map, "strip");
        assert_eq!(snapshot.tiles.len(), 12);
        assert_eq!((snapshot.rows, snapshot.columns), (3, 4));
    }
}
