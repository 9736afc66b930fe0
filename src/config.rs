use thiserror::Error;

use crate::geo::GeoGrid;

pub const DEFAULT_FLOOD_INCREMENT: f64 = 0.01;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("scale offset must be at least 1, got {0}")]
    InvalidScaleOffset(usize),
}

/// Everything `BuildMap` needs. Replaced wholesale when a new map is loaded.
#[derive(Debug, Clone)]
pub struct MapConfig {
    name: String,
    geo: GeoGrid,
    scale_offset: usize,
    flood_increment: f64,
}

impl MapConfig {
    pub fn new(
        name: impl Into<String>,
        geo: GeoGrid,
        scale_offset: usize,
        flood_increment: f64,
    ) -> Result<Self, ConfigError> {
        if scale_offset == 0 {
            return Err(ConfigError::InvalidScaleOffset(scale_offset));
        }
        let flood_increment = if flood_increment.is_finite() && flood_increment > 0.0 {
            flood_increment
        } else {
            tracing::warn!(
                target: "tides::config",
                requested = flood_increment,
                default = DEFAULT_FLOOD_INCREMENT,
                "flood increment must be positive, using default"
            );
            DEFAULT_FLOOD_INCREMENT
        };
        Ok(Self {
            name: name.into(),
            geo,
            scale_offset,
            flood_increment,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geo(&self) -> &GeoGrid {
        &self.geo
    }

    pub fn scale_offset(&self) -> usize {
        self.scale_offset
    }

    pub fn flood_increment(&self) -> f64 {
        self.flood_increment
    }

    pub fn data_row_count(&self) -> usize {
        self.geo.row_count()
    }

    pub fn data_column_count(&self) -> usize {
        self.geo.column_count()
    }
}
