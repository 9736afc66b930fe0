use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse terrain class a land-use label resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TerrainCategory {
    Ocean,
    River,
    Lake,
    Forest,
    Barren,
    Urban,
    Farm,
    Rural,
    Snow,
}

const LABEL_TABLE: &[(&str, TerrainCategory)] = &[
    ("Salt Water", TerrainCategory::Ocean),
    ("Ocean", TerrainCategory::Ocean),
    ("Fresh Water", TerrainCategory::Lake),
    ("Lake", TerrainCategory::Lake),
    ("Wetlands", TerrainCategory::River),
    ("River", TerrainCategory::River),
    ("Forest", TerrainCategory::Forest),
    ("Forest Harvesting", TerrainCategory::Forest),
    ("Urban", TerrainCategory::Urban),
    ("Residential", TerrainCategory::Urban),
    ("Commercial", TerrainCategory::Urban),
    ("Industrial", TerrainCategory::Urban),
    ("Agriculture", TerrainCategory::Farm),
    ("Cropland", TerrainCategory::Farm),
    ("Rangeland", TerrainCategory::Rural),
    ("Recreation", TerrainCategory::Rural),
    ("Rural", TerrainCategory::Rural),
    ("Shrubland", TerrainCategory::Rural),
    ("Glaciers and Snow", TerrainCategory::Snow),
    ("Barren", TerrainCategory::Barren),
    ("Mining", TerrainCategory::Barren),
];

impl TerrainCategory {
    pub const ALL: [TerrainCategory; 9] = [
        TerrainCategory::Ocean,
        TerrainCategory::River,
        TerrainCategory::Lake,
        TerrainCategory::Forest,
        TerrainCategory::Barren,
        TerrainCategory::Urban,
        TerrainCategory::Farm,
        TerrainCategory::Rural,
        TerrainCategory::Snow,
    ];

    /// Ocean, River and Lake flood and merge; everything else is land.
    pub fn is_water(self) -> bool {
        matches!(
            self,
            TerrainCategory::Ocean | TerrainCategory::River | TerrainCategory::Lake
        )
    }

    /// Exact lookup in the land-use table.
    pub fn from_label(label: &str) -> Option<Self> {
        LABEL_TABLE
            .iter()
            .find(|(known, _)| *known == label)
            .map(|(_, category)| *category)
    }

    /// Lookup that never fails: unknown labels are reported and become `Barren`.
    pub fn classify(label: &str) -> Self {
        match Self::from_label(label) {
            Some(category) => category,
            None => {
                tracing::warn!(
                    target: "tides::terrain",
                    label,
                    "unmapped land-use label, defaulting to Barren"
                );
                TerrainCategory::Barren
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TerrainCategory::Ocean => "Ocean",
            TerrainCategory::River => "River",
            TerrainCategory::Lake => "Lake",
            TerrainCategory::Forest => "Forest",
            TerrainCategory::Barren => "Barren",
            TerrainCategory::Urban => "Urban",
            TerrainCategory::Farm => "Farm",
            TerrainCategory::Rural => "Rural",
            TerrainCategory::Snow => "Snow",
        }
    }
}

impl fmt::Display for TerrainCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
