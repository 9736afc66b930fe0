//! Geographic sample data and the parser for the map file format.
//!
//! Map files are an outer JSON array of single-entry objects; each entry's
//! value is one row of sample records:
//!
//! ```json
//! [
//!   { "row_0": [ { "latitude": 49.2, "longitude": -123.1,
//!                  "landUseLabel": "Salt Water", "elevation": -3.0 }, ... ] },
//!   { "row_1": [ ... ] }
//! ]
//! ```

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::terrain::TerrainCategory;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse map data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read map data from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("row {row} has {found} samples, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// One raw measurement with its resolved terrain category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoSample {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub land_use_label: String,
    pub terrain: TerrainCategory,
}

impl GeoSample {
    pub fn new(
        latitude: f64,
        longitude: f64,
        elevation: f64,
        land_use_label: impl Into<String>,
    ) -> Self {
        let land_use_label = land_use_label.into();
        let terrain = TerrainCategory::classify(&land_use_label);
        Self {
            latitude,
            longitude,
            elevation,
            land_use_label,
            terrain,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SampleRecord {
    #[serde(alias = "Latitude")]
    latitude: f64,
    #[serde(alias = "Longitude")]
    longitude: f64,
    #[serde(rename = "landUseLabel", alias = "LandUseLabel")]
    land_use_label: String,
    #[serde(alias = "Elevation")]
    elevation: f64,
}

impl From<SampleRecord> for GeoSample {
    fn from(record: SampleRecord) -> Self {
        GeoSample::new(
            record.latitude,
            record.longitude,
            record.elevation,
            record.land_use_label,
        )
    }
}

/// Rectangular grid of samples, rows then columns. Never mutated once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoGrid {
    rows: Vec<Vec<GeoSample>>,
    row_count: usize,
    column_count: usize,
}

impl GeoGrid {
    /// Builds a grid, rejecting rows whose length differs from row 0.
    pub fn new(rows: Vec<Vec<GeoSample>>) -> Result<Self, ParseError> {
        let column_count = rows.first().map(Vec::len).unwrap_or(0);
        for (row, samples) in rows.iter().enumerate() {
            if samples.len() != column_count {
                return Err(ParseError::RaggedRow {
                    row,
                    expected: column_count,
                    found: samples.len(),
                });
            }
        }
        Ok(Self {
            row_count: rows.len(),
            column_count,
            rows,
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn parse_str(text: &str) -> Result<Self, ParseError> {
        let document: Vec<BTreeMap<String, Vec<SampleRecord>>> = serde_json::from_str(text)?;
        let mut rows = Vec::with_capacity(document.len());
        for entry in document {
            if entry.len() != 1 {
                tracing::debug!(
                    target: "tides::geo",
                    keys = entry.len(),
                    "row object has more than one key, flattening in key order"
                );
            }
            for (_, records) in entry {
                rows.push(records.into_iter().map(GeoSample::from).collect());
            }
        }
        let grid = Self::new(rows)?;
        tracing::debug!(
            target: "tides::geo",
            rows = grid.row_count,
            columns = grid.column_count,
            "map data parsed"
        );
        Ok(grid)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ParseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&text)
    }

    /// Legacy entry point: a malformed document is logged and yields a zero-row grid.
    pub fn parse_or_empty(text: &str) -> Self {
        match Self::parse_str(text) {
            Ok(grid) => grid,
            Err(err) => {
                tracing::error!(target: "tides::geo", error = %err, "map data rejected");
                Self::empty()
            }
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0 || self.column_count == 0
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&GeoSample> {
        self.rows.get(row).and_then(|samples| samples.get(col))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[GeoSample]> {
        self.rows.iter().map(Vec::as_slice)
    }
}
