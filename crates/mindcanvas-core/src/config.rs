//! Editor configuration.

use crate::input::DoubleClickConfig;
use crate::layout::LayoutConfig;
use crate::node::{DEFAULT_COLOR, FixedExtent};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Editor configuration. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub layout: LayoutConfig,
    /// Box size used for hit testing and edge endpoints.
    pub node_extent: Size,
    /// Colour for new nodes.
    pub default_color: String,
    pub double_click: DoubleClickConfig,
    /// Where saved maps live. `None` uses the platform data directory.
    pub storage_dir: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            node_extent: FixedExtent::DEFAULT.0,
            default_color: DEFAULT_COLOR.to_string(),
            double_click: DoubleClickConfig::default(),
            storage_dir: None,
        }
    }
}

impl EditorConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration, using defaults if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let config = Self::load(path)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Default config file location, `<config_dir>/mindcanvas/config.json`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mindcanvas").join("config.json"))
    }

    /// Extent provider matching `node_extent`.
    pub fn extents(&self) -> FixedExtent {
        FixedExtent(self.node_extent)
    }
}
