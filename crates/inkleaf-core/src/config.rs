//! Editor configuration.

use crate::autosave::{DEFAULT_AUTOSAVE_DELAY_MS, ThumbnailSize};
use crate::clock::Duration;
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::scene::DEFAULT_SURFACE_SIZE;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file name looked up in the data directory.
pub const CONFIG_FILE_NAME: &str = "inkleaf.json";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Editor configuration. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet period before an autosave fires.
    pub autosave_delay_ms: u64,
    /// Maximum number of undo snapshots.
    pub history_limit: usize,
    /// Drawing surface size for new documents.
    pub surface_width: f64,
    pub surface_height: f64,
    /// Library thumbnail size in pixels.
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
    /// Storage directory; the platform data directory when unset.
    pub data_dir: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            surface_width: DEFAULT_SURFACE_SIZE.width,
            surface_height: DEFAULT_SURFACE_SIZE.height,
            thumbnail_width: 160,
            thumbnail_height: 100,
            data_dir: None,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load `path`, falling back to defaults when the file does not exist.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let config = Self::from_json(&json)?;
                log::info!("Loaded configuration from {:?}", path);
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn surface_size(&self) -> Size {
        Size::new(self.surface_width, self.surface_height)
    }

    pub fn thumbnail_size(&self) -> ThumbnailSize {
        ThumbnailSize {
            width: self.thumbnail_width,
            height: self.thumbnail_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = EditorConfig::from_json(r#"{"autosave_delay_ms": 250}"#).unwrap();
        assert_eq!(config.autosave_delay(), Duration::from_millis(250));
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(config.surface_size(), DEFAULT_SURFACE_SIZE);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig::load_from_path(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(EditorConfig::load_from_path(&path), Err(ConfigError::Parse(_))));
    }
}
