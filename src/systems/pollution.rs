use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{
    engine::{System, SystemContext},
    grid::TileGrid,
    terrain::TerrainCategory,
    world::World,
};

/// Per-turn pollution emitted by one tile of each terrain category.
///
/// Categories without an entry emit nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PollutionTable {
    per_tile: BTreeMap<TerrainCategory, f64>,
}

impl PollutionTable {
    pub fn empty() -> Self {
        Self {
            per_tile: BTreeMap::new(),
        }
    }

    pub fn with(mut self, terrain: TerrainCategory, per_tile: f64) -> Self {
        self.per_tile.insert(terrain, per_tile);
        self
    }

    /// Overrides entries, keeping the rest of the table.
    pub fn extend(&mut self, overrides: &BTreeMap<TerrainCategory, f64>) {
        self.per_tile
            .extend(overrides.iter().map(|(terrain, value)| (*terrain, *value)));
    }

    pub fn contribution(&self, terrain: TerrainCategory) -> f64 {
        self.per_tile.get(&terrain).copied().unwrap_or(0.0)
    }
}

impl Default for PollutionTable {
    fn default() -> Self {
        Self::empty()
            .with(TerrainCategory::Urban, 24_000.0)
            .with(TerrainCategory::Forest, -0.1)
            .with(TerrainCategory::Farm, 0.05)
            .with(TerrainCategory::Rural, 0.02)
    }
}

pub fn pollution_per_turn(grid: &TileGrid, table: &PollutionTable) -> f64 {
    grid.iter()
        .map(|tile| table.contribution(tile.terrain))
        .sum()
}

/// Share of the map that has gone under since it was built.
pub fn flooded_ratio(water_tiles: usize, starting_water_tiles: usize, total_tiles: usize) -> f64 {
    if total_tiles == 0 {
        return 0.0;
    }
    (water_tiles as f64 - starting_water_tiles as f64) / total_tiles as f64
}

pub struct PollutionSystem {
    table: PollutionTable,
}

impl PollutionSystem {
    pub fn new(table: PollutionTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PollutionTable {
        &self.table
    }
}

impl Default for PollutionSystem {
    fn default() -> Self {
        Self::new(PollutionTable::default())
    }
}

impl System for PollutionSystem {
    fn name(&self) -> &str {
        "pollution"
    }

    fn run(&mut self, _ctx: &SystemContext, world: &mut World) -> Result<()> {
        let delta = world.ledger.freed_pollution + pollution_per_turn(&world.grid, &self.table);
        world.ledger.pollution_delta = delta;
        world.state.pollution_total += delta;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_categories_contribute_nothing() {
        let table = PollutionTable::default();
        assert_eq!(table.contribution(TerrainCategory::Ocean), 0.0);
        assert_eq!(table.contribution(TerrainCategory::Barren), 0.0);
        assert_eq!(table.contribution(TerrainCategory::Urban), 24_000.0);
    }

    #[test]
    fn overrides_keep_other_entries() {
        let mut table = PollutionTable::default();
        table.extend(&BTreeMap::from([(TerrainCategory::Urban, 10.0)]));
        assert_eq!(table.contribution(TerrainCategory::Urban), 10.0);
        assert_eq!(table.contribution(TerrainCategory::Forest), -0.1);
    }

    #[test]
    fn ratio_guards_empty_map() {
        assert_eq!(flooded_ratio(0, 0, 0), 0.0);
        assert_eq!(flooded_ratio(3, 3, 10), 0.0);
        assert_eq!(flooded_ratio(8, 3, 10), 0.5);
    }
}
