//! Which recording was selected, persisted across restarts
//!
//! Only the selection is stored. Playback is always rebuilt from it.

use super::store::Store;
use crate::{RecordingsError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    /// Schema version for future migrations
    pub version: i32,
    /// Ids from the store root down to the selected recording
    pub uuid_path: Vec<Uuid>,
}

impl NavigationState {
    pub fn new(uuid_path: Vec<Uuid>) -> Self {
        Self {
            version: 1,
            uuid_path,
        }
    }

    /// State pointing at `id`, if the store still contains it
    pub fn for_recording(store: &Store, id: Uuid) -> Option<Self> {
        store.uuid_path(id).map(Self::new)
    }

    /// Load a saved state; a missing file means nothing to restore
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            debug!("No navigation state at {:?}", path);
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .map_err(|e| RecordingsError::IOError(format!("Failed to read navigation state: {}", e)))?;

        let state = serde_json::from_str(&content)
            .map_err(|e| RecordingsError::ConfigError(format!("Failed to parse navigation state: {}", e)))?;

        info!("Loaded navigation state from {:?}", path);
        Ok(Some(state))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| RecordingsError::ConfigError(format!("Failed to serialize navigation state: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| RecordingsError::IOError(format!("Failed to write navigation state: {}", e)))?;

        debug!("Saved navigation state to {:?}", path);
        Ok(())
    }
}
