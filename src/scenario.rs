use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::{
    config::{MapConfig, DEFAULT_FLOOD_INCREMENT},
    geo::GeoGrid,
    grid::TileCatalog,
    hex::HexLayout,
    mapgen::SyntheticMap,
    simulation::PollutionBands,
    systems::PollutionTable,
    terrain::TerrainCategory,
};

fn default_scale_offset() -> usize {
    1
}

fn default_flood_increment() -> f64 {
    DEFAULT_FLOOD_INCREMENT
}

fn default_auto_flood_interval_ms() -> u64 {
    100
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    /// JSON map file, relative to the scenario file's directory.
    #[serde(default)]
    pub map_file: Option<PathBuf>,
    #[serde(default)]
    pub synthetic: Option<SyntheticMap>,
    #[serde(default = "default_scale_offset")]
    pub scale_offset: usize,
    #[serde(default = "default_flood_increment")]
    pub flood_increment: f64,
    #[serde(default)]
    pub turns: Option<u64>,
    #[serde(default)]
    pub snapshot_interval_turns: u64,
    #[serde(default)]
    pub tile: TileDimensions,
    /// Per-tile pollution overrides on top of the default table.
    #[serde(default)]
    pub pollution: BTreeMap<TerrainCategory, f64>,
    #[serde(default)]
    pub bands: PollutionBands,
    #[serde(default = "default_auto_flood_interval_ms")]
    pub auto_flood_interval_ms: u64,
    /// Terrain categories with a prefab. Empty means all of them.
    #[serde(default)]
    pub prefabs: Vec<TerrainCategory>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TileDimensions {
    pub width: f32,
    pub height: f32,
}

impl Default for TileDimensions {
    fn default() -> Self {
        let layout = HexLayout::default();
        Self {
            width: layout.tile_width,
            height: layout.tile_height,
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<LoadedScenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.base_dir.clone());
        Ok(LoadedScenario { scenario, root })
    }
}

/// A scenario plus the directory its relative paths resolve against.
#[derive(Debug, Clone)]
pub struct LoadedScenario {
    pub scenario: Scenario,
    root: PathBuf,
}

impl std::ops::Deref for LoadedScenario {
    type Target = Scenario;

    fn deref(&self) -> &Scenario {
        &self.scenario
    }
}

impl LoadedScenario {
    pub fn map_config(&self) -> Result<MapConfig> {
        let geo = self.geo_grid()?;
        MapConfig::new(
            self.name.clone(),
            geo,
            self.scale_offset,
            self.flood_increment,
        )
        .with_context(|| format!("Invalid map settings in scenario '{}'", self.name))
    }

    fn geo_grid(&self) -> Result<GeoGrid> {
        match (&self.map_file, &self.synthetic) {
            (Some(file), None) => {
                let path = self.root.join(file);
                GeoGrid::load(&path)
                    .with_context(|| format!("Failed to load map {}", path.display()))
            }
            (None, Some(synthetic)) => synthetic
                .generate()
                .context("Failed to generate synthetic map"),
            (Some(_), Some(_)) => bail!(
                "scenario '{}' sets both map_file and synthetic",
                self.name
            ),
            (None, None) => bail!("scenario '{}' has no map source", self.name),
        }
    }
}

impl Scenario {
    pub fn turns(&self, override_turns: Option<u64>) -> u64 {
        override_turns.or(self.turns).unwrap_or(40)
    }

    pub fn pollution_table(&self) -> PollutionTable {
        let mut table = PollutionTable::default();
        table.extend(&self.pollution);
        table
    }

    pub fn catalog(&self) -> TileCatalog {
        let layout = HexLayout::new(self.tile.width, self.tile.height);
        if self.prefabs.is_empty() {
            TileCatalog::complete(layout)
        } else {
            TileCatalog::new(layout, self.prefabs.iter().copied())
        }
    }

    pub fn auto_flood_interval(&self) -> Result<Duration> {
        if self.auto_flood_interval_ms == 0 {
            bail!(
                "scenario '{}' sets auto_flood_interval_ms to 0; it must be at least 1",
                self.name
            );
        }
        Ok(Duration::from_millis(self.auto_flood_interval_ms))
    }
}
