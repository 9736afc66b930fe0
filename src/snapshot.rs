use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::world::World;

/// Writes `<dir>/<map>/turn_NNNNNN.json` every `interval` turns.
pub struct SnapshotWriter {
    dir: PathBuf,
    interval: u64,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>, interval: u64) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            interval,
        }
    }

    pub fn is_due(&self, turn: u64) -> bool {
        self.interval != 0 && turn != 0 && turn % self.interval == 0
    }

    pub fn maybe_write(&self, world: &World) -> Result<Option<PathBuf>> {
        if !self.is_due(world.turn()) {
            return Ok(None);
        }
        self.write(world).map(Some)
    }

    pub fn write(&self, world: &World) -> Result<PathBuf> {
        let dir = self.dir.join(world.name());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;
        let path = dir.join(format!("turn_{:06}.json", world.turn()));
        let json = serde_json::to_string_pretty(&world.snapshot())
            .context("Failed to serialize world snapshot")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        tracing::debug!(
            target: "tides::snapshot",
            turn = world.turn(),
            path = %path.display(),
            "snapshot written"
        );
        Ok(path)
    }
}
