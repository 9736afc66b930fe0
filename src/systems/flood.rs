use std::collections::{HashSet, VecDeque};

use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    grid::{Tile, TileGrid},
    hex::{GridIndex, WorldPosition},
    world::World,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloodOutcome {
    /// Indices converted from land to water, in the order they flooded.
    pub converted: Vec<GridIndex>,
    pub freed_pollution: f64,
}

/// One flood step: raise every water tile by `increment`, then spread water
/// from all of them into adjacent land that sits strictly below the front.
///
/// Land at exactly the water's elevation holds until the water rises past it.
/// Flooded cells get a brand-new tile; the land tile is dropped.
pub fn flood(grid: &mut TileGrid, increment: f64) -> FloodOutcome {
    let sources = grid.water_indices();
    for index in &sources {
        if let Some(tile) = grid.get_mut(*index) {
            tile.elevation += increment;
        }
    }

    let mut visited: HashSet<GridIndex> = sources.iter().copied().collect();
    let mut queue: VecDeque<GridIndex> = sources.into_iter().collect();
    let mut outcome = FloodOutcome::default();

    while let Some(index) = queue.pop_front() {
        let Some(source) = grid.get(index).cloned() else {
            tracing::warn!(
                target: "tides::flood",
                row = index.row,
                col = index.col,
                "queued water tile vanished from grid"
            );
            continue;
        };
        let neighbours: Vec<GridIndex> = grid.neighbors(index).collect();
        for neighbour in neighbours {
            if visited.contains(&neighbour) {
                continue;
            }
            let land = match grid.get(neighbour) {
                None => {
                    tracing::warn!(
                        target: "tides::flood",
                        row = neighbour.row,
                        col = neighbour.col,
                        "could not find tile for in-bounds neighbour"
                    );
                    continue;
                }
                Some(tile) if tile.is_water() || tile.elevation >= source.elevation => continue,
                Some(tile) => tile.clone(),
            };

            outcome.freed_pollution += released_pollution(&land);
            let id = grid.allocate_id();
            let water = Tile {
                id,
                terrain: source.terrain,
                elevation: source.elevation,
                index: land.index,
                position: WorldPosition {
                    x: land.position.x,
                    y: source.position.y,
                    z: land.position.z,
                },
                land_use_label: source.land_use_label.clone(),
                latitude: land.latitude,
                longitude: land.longitude,
                submerged_label: Some(land.land_use_label),
            };
            grid.replace(water);
            visited.insert(neighbour);
            queue.push_back(neighbour);
            outcome.converted.push(neighbour);
        }
    }

    outcome
}

/// Pollution a destroyed land tile gives back when it goes under.
///
/// Stored pollution is not modelled yet, so nothing is released.
fn released_pollution(_tile: &Tile) -> f64 {
    0.0
}

pub struct FloodSystem;

impl FloodSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FloodSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for FloodSystem {
    fn name(&self) -> &str {
        "flood"
    }

    fn run(&mut self, ctx: &SystemContext, world: &mut World) -> Result<()> {
        world.state.sea_level += ctx.flood_increment;
        let outcome = flood(&mut world.grid, ctx.flood_increment);
        if !outcome.converted.is_empty() {
            tracing::debug!(
                target: "tides::flood",
                turn = ctx.turn,
                converted = outcome.converted.len(),
                sea_level = world.state.sea_level,
                "land flooded"
            );
        }
        world.ledger.freed_pollution += outcome.freed_pollution;
        world.ledger.converted.extend(outcome.converted);
        Ok(())
    }
}
