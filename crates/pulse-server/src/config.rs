//! Configuration file management.
//!
//! TOML file, path from `PULSE_CONFIG` (default `buzzpulse.toml`). A
//! missing file yields the built-in defaults; every field has its own
//! default so partial files work.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use pulse_geo::Building;
use pulse_types::Tuning;

/// Complete server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub store: StoreSection,
    pub tuning: Tuning,
    /// Registered buildings resolvable from `b:<slug>` cells.
    pub buildings: Vec<Building>,
}

/// Listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSection {
    /// Data directory holding the SQLite file. Empty = current directory.
    #[serde(default)]
    pub data_dir: String,
    /// Optional hit-log retention sweep, in days. Clamped to at least 7
    /// so the typical-hour baseline keeps its full lookback. `None`
    /// disables pruning.
    #[serde(default)]
    pub hit_retention_days: Option<u32>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            store: StoreSection::default(),
            tuning: Tuning::default(),
            buildings: default_buildings(),
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            data_dir: String::new(),
            hit_retention_days: None,
        }
    }
}

impl ServerConfig {
    /// Load from `PULSE_CONFIG` (default `buzzpulse.toml`). A missing
    /// file is not an error.
    pub fn load() -> anyhow::Result<Self> {
        let path =
            std::env::var("PULSE_CONFIG").unwrap_or_else(|_| "buzzpulse.toml".to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::info!(?path, "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }

    /// Path of the SQLite database file.
    pub fn db_path(&self) -> PathBuf {
        let dir = if self.store.data_dir.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&self.store.data_dir)
        };
        dir.join("buzzpulse.db")
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

/// The pilot campus deployment.
fn default_buildings() -> Vec<Building> {
    vec![
        Building {
            id: "eng-quad".into(),
            name: "Engineering Quad".into(),
            lat: 37.42805,
            lng: -122.1723,
        },
        Building {
            id: "main-quad".into(),
            name: "Main Quad".into(),
            lat: 37.42745,
            lng: -122.1701,
        },
    ]
}
