//! The hex tile arena and the builder that fills it from a `GeoGrid`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    geo::{GeoGrid, GeoSample},
    hex::{self, GridIndex, HexLayout, WorldPosition},
    terrain::TerrainCategory,
};

#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("tile ({row}, {col}) is outside the {rows}x{columns} grid")]
    IndexOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        columns: usize,
    },
    #[error("no prefab registered for terrain type {0}")]
    MissingPrefabOfType(TerrainCategory),
}

/// Identity of a tile value. Replacing a tile always allocates a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(u64);

impl TileId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub terrain: TerrainCategory,
    /// Land keeps the floored survey elevation; water rises continuously.
    pub elevation: f64,
    pub index: GridIndex,
    pub position: WorldPosition,
    pub land_use_label: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Label of the land tile this water tile replaced, if it was flooded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submerged_label: Option<String>,
}

impl Tile {
    pub fn is_water(&self) -> bool {
        self.terrain.is_water()
    }
}

/// The renderable assets available to the builder: the reference footprint
/// plus the terrain categories that have a prefab.
#[derive(Debug, Clone, PartialEq)]
pub struct TileCatalog {
    layout: HexLayout,
    prefabs: BTreeSet<TerrainCategory>,
}

impl TileCatalog {
    pub fn new(layout: HexLayout, prefabs: impl IntoIterator<Item = TerrainCategory>) -> Self {
        Self {
            layout,
            prefabs: prefabs.into_iter().collect(),
        }
    }

    /// A catalog with a prefab for every terrain category.
    pub fn complete(layout: HexLayout) -> Self {
        Self::new(layout, TerrainCategory::ALL)
    }

    pub fn layout(&self) -> HexLayout {
        self.layout
    }

    pub fn has_prefab(&self, terrain: TerrainCategory) -> bool {
        self.prefabs.contains(&terrain)
    }
}

impl Default for TileCatalog {
    fn default() -> Self {
        Self::complete(HexLayout::default())
    }
}

/// Row-major arena of tiles in retained-grid space.
#[derive(Debug, Clone, Default)]
pub struct TileGrid {
    tiles: Vec<Tile>,
    row_count: usize,
    column_count: usize,
    next_id: u64,
}

impl TileGrid {
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, row: isize, col: isize) -> bool {
        row >= 0
            && col >= 0
            && (row as usize) < self.row_count
            && (col as usize) < self.column_count
    }

    fn slot(&self, index: GridIndex) -> Option<usize> {
        if index.row < self.row_count && index.col < self.column_count {
            Some(index.row * self.column_count + index.col)
        } else {
            None
        }
    }

    pub fn get(&self, index: GridIndex) -> Option<&Tile> {
        self.slot(index).and_then(|slot| self.tiles.get(slot))
    }

    pub(crate) fn get_mut(&mut self, index: GridIndex) -> Option<&mut Tile> {
        let slot = self.slot(index)?;
        self.tiles.get_mut(slot)
    }

    /// Checked lookup for callers outside the simulation.
    pub fn tile(&self, row: usize, col: usize) -> Result<&Tile, GridError> {
        self.get(GridIndex::new(row, col))
            .ok_or(GridError::IndexOutOfRange {
                row,
                col,
                rows: self.row_count,
                columns: self.column_count,
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// In-bounds hex neighbours of `index`.
    pub fn neighbors(&self, index: GridIndex) -> impl Iterator<Item = GridIndex> + '_ {
        hex::neighbors(index.row, index.col)
            .into_iter()
            .filter_map(move |(row, col)| {
                if self.contains(row, col) {
                    Some(GridIndex::new(row as usize, col as usize))
                } else {
                    tracing::trace!(
                        target: "tides::grid",
                        row,
                        col,
                        "neighbour outside grid"
                    );
                    None
                }
            })
    }

    pub fn water_indices(&self) -> Vec<GridIndex> {
        self.tiles
            .iter()
            .filter(|tile| tile.is_water())
            .map(|tile| tile.index)
            .collect()
    }

    pub fn water_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_water()).count()
    }

    pub(crate) fn allocate_id(&mut self) -> TileId {
        let id = TileId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Puts `tile` into its own index and hands back the tile it displaced.
    pub(crate) fn replace(&mut self, tile: Tile) -> Option<Tile> {
        let slot = self.slot(tile.index)?;
        Some(std::mem::replace(&mut self.tiles[slot], tile))
    }
}

/// Walks `geo` at `scale_offset` stride and creates one tile per kept sample.
///
/// Rows are taken from 0; columns skip the first and last survey column.
/// Indices are positions in the retained grid, not raw sample coordinates.
pub fn build_grid(
    geo: &GeoGrid,
    scale_offset: usize,
    catalog: &TileCatalog,
) -> Result<TileGrid, GridError> {
    let stride = scale_offset.max(1);
    let row_samples: Vec<usize> = (0..geo.row_count()).step_by(stride).collect();
    let column_samples: Vec<usize> = (1..geo.column_count().saturating_sub(1))
        .step_by(stride)
        .collect();

    let mut grid = TileGrid::default();
    if row_samples.is_empty() || column_samples.is_empty() {
        tracing::warn!(
            target: "tides::grid",
            data_rows = geo.row_count(),
            data_columns = geo.column_count(),
            scale_offset,
            "map data too small to retain any tiles"
        );
        return Ok(grid);
    }

    grid.row_count = row_samples.len();
    grid.column_count = column_samples.len();
    grid.tiles.reserve(grid.row_count * grid.column_count);

    let layout = catalog.layout();
    for (row, &y) in row_samples.iter().enumerate() {
        for (col, &x) in column_samples.iter().enumerate() {
            let Some(sample) = geo.get(y, x) else {
                continue;
            };
            if !catalog.has_prefab(sample.terrain) {
                return Err(GridError::MissingPrefabOfType(sample.terrain));
            }
            let index = GridIndex::new(row, col);
            let id = grid.allocate_id();
            grid.tiles.push(tile_from_sample(id, index, sample, &layout));
        }
    }

    tracing::debug!(
        target: "tides::grid",
        rows = grid.row_count,
        columns = grid.column_count,
        tiles = grid.len(),
        "hex grid built"
    );
    Ok(grid)
}

fn tile_from_sample(id: TileId, index: GridIndex, sample: &GeoSample, layout: &HexLayout) -> Tile {
    let elevation = if sample.terrain == TerrainCategory::Ocean {
        0.0
    } else {
        sample.elevation.floor()
    };
    Tile {
        id,
        terrain: sample.terrain,
        elevation,
        index,
        position: layout.world_position(index),
        land_use_label: sample.land_use_label.clone(),
        latitude: sample.latitude,
        longitude: sample.longitude,
        submerged_label: None,
    }
}
