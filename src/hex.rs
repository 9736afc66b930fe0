//! Offset hex coordinates ("odd-r": odd rows shifted right by half a tile).

use serde::{Deserialize, Serialize};

/// Position of a tile in the retained grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridIndex {
    pub row: usize,
    pub col: usize,
}

impl GridIndex {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

// (column, row) offsets.
const EVEN_ROW_OFFSETS: [(isize, isize); 6] =
    [(-1, 1), (-1, 0), (-1, -1), (0, 1), (1, 0), (0, -1)];
const ODD_ROW_OFFSETS: [(isize, isize); 6] = [(0, 1), (-1, 0), (0, -1), (1, 1), (1, 0), (1, -1)];

/// The six neighbour coordinates of `(row, col)` as `(row, col)` pairs.
///
/// Coordinates are not bounds-checked and may be negative; the grid decides
/// which of them exist. Flooding and region merge both go through here so
/// they agree on what "adjacent" means.
pub fn neighbors(row: usize, col: usize) -> [(isize, isize); 6] {
    let offsets = if row % 2 == 0 {
        EVEN_ROW_OFFSETS
    } else {
        ODD_ROW_OFFSETS
    };
    let row = row as isize;
    let col = col as isize;
    offsets.map(|(dc, dr)| (row + dr, col + dc))
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPosition {
    pub x: f32,
    /// Water-surface height; zero for freshly built tiles, the renderer maps
    /// elevation to height itself.
    pub y: f32,
    pub z: f32,
}

/// Staggered row layout derived from the reference tile's footprint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HexLayout {
    pub tile_width: f32,
    pub tile_height: f32,
}

impl HexLayout {
    /// Rows of hexes sharing edges pack at three quarters of the tile height.
    pub const ROW_PACKING: f32 = 0.75;

    pub fn new(tile_width: f32, tile_height: f32) -> Self {
        Self {
            tile_width,
            tile_height,
        }
    }

    pub fn world_position(&self, index: GridIndex) -> WorldPosition {
        let stagger = if index.row % 2 == 1 {
            self.tile_width / 2.0
        } else {
            0.0
        };
        WorldPosition {
            x: index.col as f32 * self.tile_width + stagger,
            y: 0.0,
            z: index.row as f32 * Self::ROW_PACKING * self.tile_height,
        }
    }
}

impl Default for HexLayout {
    fn default() -> Self {
        // Pointy hex of unit radius.
        Self::new(3f32.sqrt(), 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_row_neighbors() {
        let mut found = neighbors(2, 2).to_vec();
        found.sort();
        assert_eq!(found, vec![(1, 1), (1, 2), (2, 1), (2, 3), (3, 1), (3, 2)]);
    }

    #[test]
    fn odd_row_neighbors() {
        let mut found = neighbors(1, 1).to_vec();
        found.sort();
        assert_eq!(found, vec![(0, 1), (0, 2), (1, 0), (1, 2), (2, 1), (2, 2)]);
    }

    #[test]
    fn adjacency_is_symmetric() {
        for row in 1..6usize {
            for col in 1..6usize {
                for (nr, nc) in neighbors(row, col) {
                    let back = neighbors(nr as usize, nc as usize);
                    assert!(
                        back.contains(&(row as isize, col as isize)),
                        "({row},{col}) -> ({nr},{nc}) is one-way"
                    );
                }
            }
        }
    }

    #[test]
    fn corner_neighbors_may_be_negative() {
        assert!(neighbors(0, 0).iter().any(|&(r, c)| r < 0 || c < 0));
    }

    #[test]
    fn odd_rows_are_staggered() {
        let layout = HexLayout::new(2.0, 4.0);
        let even = layout.world_position(GridIndex::new(0, 1));
        let odd = layout.world_position(GridIndex::new(1, 1));
        assert_eq!(even.x, 2.0);
        assert_eq!(odd.x, 3.0);
        assert_eq!(even.z, 0.0);
        assert_eq!(odd.z, 3.0);
        assert_eq!(layout.world_position(GridIndex::new(2, 0)).z, 6.0);
    }
}
