use std::collections::VecDeque;

use anyhow::Result;
use serde::Serialize;

use crate::{
    engine::{System, SystemContext},
    grid::{TileGrid, TileId},
    hex::GridIndex,
    world::World,
};

/// A maximal connected body of water at the time it was computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaterRegion {
    pub tiles: Vec<GridIndex>,
    pub tile_ids: Vec<TileId>,
}

impl WaterRegion {
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Single tiles have nothing to combine.
    pub fn needs_merge(&self) -> bool {
        self.tiles.len() > 1
    }

    pub fn contains(&self, index: GridIndex) -> bool {
        self.tiles.contains(&index)
    }
}

/// Partitions all water tiles into connected regions under hex adjacency.
///
/// Seeds are taken in row-major order and every water tile lands in exactly
/// one region. Tiles are not modified.
pub fn merge_water_regions(grid: &TileGrid) -> Vec<WaterRegion> {
    let columns = grid.column_count();
    let slot = |index: GridIndex| index.row * columns + index.col;
    let mut visited = vec![false; grid.len()];
    let mut regions = Vec::new();

    for seed in grid.iter() {
        if !seed.is_water() || visited[slot(seed.index)] {
            continue;
        }
        visited[slot(seed.index)] = true;
        let mut region = WaterRegion {
            tiles: Vec::new(),
            tile_ids: Vec::new(),
        };
        let mut queue = VecDeque::from([seed.index]);
        while let Some(index) = queue.pop_front() {
            let Some(tile) = grid.get(index) else {
                continue;
            };
            region.tiles.push(index);
            region.tile_ids.push(tile.id);
            for neighbour in grid.neighbors(index) {
                if visited[slot(neighbour)] {
                    continue;
                }
                match grid.get(neighbour) {
                    Some(candidate) if candidate.is_water() => {
                        visited[slot(neighbour)] = true;
                        queue.push_back(neighbour);
                    }
                    Some(_) => {}
                    None => tracing::warn!(
                        target: "tides::regions",
                        row = neighbour.row,
                        col = neighbour.col,
                        "could not find tile for in-bounds neighbour"
                    ),
                }
            }
        }
        regions.push(region);
    }

    regions
}

pub struct RegionMergeSystem;

impl RegionMergeSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RegionMergeSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for RegionMergeSystem {
    fn name(&self) -> &str {
        "region_merge"
    }

    fn run(&mut self, ctx: &SystemContext, world: &mut World) -> Result<()> {
        world.regions = merge_water_regions(&world.grid);
        tracing::trace!(
            target: "tides::regions",
            turn = ctx.turn,
            regions = world.regions.len(),
            "water regions recomputed"
        );
        Ok(())
    }
}
