//! Seeded synthetic coastal survey data in the same shape as real map files.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::geo::{GeoGrid, GeoSample, ParseError};

fn default_origin() -> (f64, f64) {
    (44.0, -124.0)
}

fn default_sample_spacing() -> f64 {
    0.001
}

fn default_slope() -> f64 {
    0.6
}

/// Ocean along the west edge, terrain rising to the east.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticMap {
    pub rows: usize,
    pub columns: usize,
    pub seed: u64,
    /// Mean width of the ocean strip, in survey columns. Defaults to a fifth
    /// of the map.
    #[serde(default)]
    pub coast_columns: Option<usize>,
    /// Elevation gained per survey column inland.
    #[serde(default = "default_slope")]
    pub slope: f64,
    /// Latitude and longitude of sample (0, 0).
    #[serde(default = "default_origin")]
    pub origin: (f64, f64),
    #[serde(default = "default_sample_spacing")]
    pub sample_spacing: f64,
}

impl SyntheticMap {
    pub fn new(rows: usize, columns: usize, seed: u64) -> Self {
        Self {
            rows,
            columns,
            seed,
            coast_columns: None,
            slope: default_slope(),
            origin: default_origin(),
            sample_spacing: default_sample_spacing(),
        }
    }

    pub fn generate(&self) -> Result<GeoGrid, ParseError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mean_coast = self.coast_columns.unwrap_or(self.columns / 5) as f64;
        let mut coast = mean_coast;

        let rows: Vec<Vec<GeoSample>> = (0..self.rows)
            .map(|r| {
                // Random walk pulled back toward the mean gives a ragged shoreline.
                coast += rng.gen_range(-1.0..=1.0) + (mean_coast - coast) * 0.2;
                coast = coast.max(0.0);
                (0..self.columns)
                    .map(|c| self.sample(&mut rng, r, c, coast))
                    .collect()
            })
            .collect();

        GeoGrid::new(rows)
    }

    fn sample(&self, rng: &mut ChaCha8Rng, row: usize, col: usize, coast: f64) -> GeoSample {
        let latitude = self.origin.0 + row as f64 * self.sample_spacing;
        let longitude = self.origin.1 + col as f64 * self.sample_spacing;
        let inland = col as f64 - coast;
        if inland < 0.0 {
            let depth = rng.gen_range(1.0..8.0);
            return GeoSample::new(latitude, longitude, -depth, "Salt Water");
        }

        let elevation = (inland * self.slope + rng.gen_range(-1.5..1.5)).max(0.0);
        let roll: f64 = rng.gen();
        let label = match elevation {
            e if e < 1.5 => {
                if roll < 0.35 {
                    "Wetlands"
                } else {
                    "Recreation"
                }
            }
            e if e < 6.0 => {
                if roll < 0.45 {
                    "Urban"
                } else if roll < 0.8 {
                    "Residential"
                } else {
                    "Agriculture"
                }
            }
            e if e < 12.0 => {
                if roll < 0.5 {
                    "Agriculture"
                } else {
                    "Rangeland"
                }
            }
            e if e < 25.0 => {
                if roll < 0.1 {
                    "Fresh Water"
                } else {
                    "Forest"
                }
            }
            e if e < 40.0 => "Barren",
            _ => "Glaciers and Snow",
        };
        GeoSample::new(latitude, longitude, elevation, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainCategory;

    #[test]
    fn same_seed_same_map() {
        let map = SyntheticMap::new(12, 20, 7);
        let a = map.generate().unwrap();
        let b = map.generate().unwrap();
        assert_eq!(a.row_count(), 12);
        assert_eq!(a.column_count(), 20);
        for r in 0..12 {
            for c in 0..20 {
                assert_eq!(a.get(r, c), b.get(r, c));
            }
        }
    }

    #[test]
    fn west_edge_is_ocean() {
        let grid = SyntheticMap::new(30, 40, 3).generate().unwrap();
        let ocean_rows = grid
            .rows()
            .filter(|row| row[0].terrain == TerrainCategory::Ocean)
            .count();
        assert!(ocean_rows > 20);
        assert!(grid
            .rows()
            .all(|row| row[39].terrain != TerrainCategory::Ocean));
    }
}
