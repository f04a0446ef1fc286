//! Watch-list persistence: a JSON file with locked, atomic writes

use super::entry::WatchMap;
use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::warn;

/// File-backed store for the watch map.
///
/// The serialized form is `{crn -> WatchEntry}`. Writes go to a temp file
/// first and are renamed into place under an exclusive lock. Entries that
/// come back with an empty watcher list violate the non-empty invariant and
/// are dropped on load.
#[derive(Debug, Clone)]
pub struct WatchStore {
    path: PathBuf,
}

impl WatchStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the user's config directory
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("course-seat-monitor")
            .join("watches.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the watch map. A missing file is an empty map; a malformed file
    /// is an error so corrupted state never silently wipes the watch list.
    pub fn load(&self) -> Result<WatchMap> {
        if !self.path.exists() {
            return Ok(WatchMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read watch store {}", self.path.display()))?;
        let mut map: WatchMap = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse watch store {}", self.path.display()))?;

        let before = map.len();
        map.retain(|_, entry| !entry.watchers.is_empty());
        if map.len() != before {
            warn!(
                dropped = before - map.len(),
                "Dropped watch entries with no watchers on load"
            );
        }

        Ok(map)
    }

    /// Persist the full watch map atomically
    pub fn save(&self, map: &WatchMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open watch store {}", self.path.display()))?;
        lock.lock_exclusive()?;

        let temp_path = self.path.with_extension("tmp");
        let result = (|| -> Result<()> {
            let temp_file = File::create(&temp_path)?;
            serde_json::to_writer_pretty(&temp_file, map)?;
            temp_file.sync_all()?;
            fs::rename(&temp_path, &self.path)?;
            Ok(())
        })();

        lock.unlock()?;
        result
    }
}
