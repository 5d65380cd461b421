//! Player configuration
//!
//! Loaded from a JSON file; every field has a default so partial files work.

use crate::playback::DEFAULT_TICK_INTERVAL;
use crate::{RecordingsError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// How often progress is re-read while playing
    pub tick_interval_ms: u64,

    /// Play through the sound card. When off, playback is simulated
    /// against the wall clock.
    pub enable_audio_output: bool,

    /// Where the selected recording is remembered between runs
    pub navigation_state_path: Option<PathBuf>,

    /// JSON index of folders and recordings
    pub library_path: Option<PathBuf>,

    /// Capacity of the service command channel
    pub command_buffer: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            enable_audio_output: true,
            navigation_state_path: None,
            library_path: None,
            command_buffer: 64,
        }
    }
}

impl PlayerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Disable audio output (simulated playback)
    pub fn without_audio_output(mut self) -> Self {
        self.enable_audio_output = false;
        self
    }

    pub fn with_navigation_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.navigation_state_path = Some(path.into());
        self
    }

    pub fn with_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(RecordingsError::ConfigError(
                "tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.command_buffer == 0 {
            return Err(RecordingsError::ConfigError(
                "command_buffer must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a file, or return defaults if it doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| RecordingsError::IOError(format!("Failed to read config file: {}", e)))?;

        let config: PlayerConfig = serde_json::from_str(&content)
            .map_err(|e| RecordingsError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_millis(50));
        assert!(config.enable_audio_output);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = PlayerConfig::default()
            .with_tick_interval(Duration::from_millis(10))
            .without_audio_output()
            .with_navigation_state_path("/tmp/nav.json")
            .with_library_path("/tmp/library.json");

        assert_eq!(config.tick_interval_ms, 10);
        assert!(!config.enable_audio_output);
        assert_eq!(config.navigation_state_path, Some(PathBuf::from("/tmp/nav.json")));
        assert_eq!(config.library_path, Some(PathBuf::from("/tmp/library.json")));
    }

    #[test]
    fn test_zero_tick_interval_rejected() {
        let config = PlayerConfig::default().with_tick_interval(Duration::ZERO);
        assert!(matches!(config.validate(), Err(RecordingsError::ConfigError(_))));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("player.json");
        std::fs::write(&path, r#"{ "enable_audio_output": false }"#).unwrap();

        let config = PlayerConfig::load(&path).unwrap();
        assert!(!config.enable_audio_output);
        assert_eq!(config.tick_interval_ms, 50);
        assert_eq!(config.command_buffer, 64);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = PlayerConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, PlayerConfig::default());
    }
}
