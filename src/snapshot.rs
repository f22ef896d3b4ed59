use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::world::{SavedState, World};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes the persistable part of the world every `interval` ticks.
pub struct SnapshotWriter {
    output_dir: PathBuf,
    interval: u64,
}

impl SnapshotWriter {
    pub fn new(output_dir: impl AsRef<Path>, interval: u64) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            interval,
        }
    }

    pub fn maybe_write(
        &self,
        world: &World,
        scenario_name: &str,
    ) -> Result<Option<PathBuf>, SnapshotError> {
        if self.interval == 0 || world.tick() % self.interval != 0 {
            return Ok(None);
        }
        self.write(world, scenario_name).map(Some)
    }

    pub fn write(&self, world: &World, scenario_name: &str) -> Result<PathBuf, SnapshotError> {
        let dir = self.output_dir.join(scenario_name);
        fs::create_dir_all(&dir)?;
        let file_path = dir.join(format!("tick_{:06}.json", world.tick()));
        let json = serde_json::to_string_pretty(&world.saved_state(scenario_name))?;
        fs::write(&file_path, json)?;
        Ok(file_path)
    }

    /// Reads a snapshot back. Creature stats are clamped into range.
    pub fn load(path: impl AsRef<Path>) -> Result<SavedState, SnapshotError> {
        let data = fs::read_to_string(path)?;
        let mut saved: SavedState = serde_json::from_str(&data)?;
        saved.creature.normalize();
        Ok(saved)
    }

    /// Snapshot files for one scenario, oldest first.
    pub fn list(&self, scenario_name: &str) -> Result<Vec<PathBuf>, SnapshotError> {
        let dir = self.output_dir.join(scenario_name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut snapshots = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let is_snapshot = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("tick_") && name.ends_with(".json"));
            if is_snapshot {
                snapshots.push(path);
            }
        }
        snapshots.sort();
        Ok(snapshots)
    }
}
