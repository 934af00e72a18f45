//! Shared application state.

use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

use pulse_geo::BuildingDirectory;
use pulse_types::Tuning;

use crate::config::ServerConfig;

/// State handed to every handler. Store access is serialized behind the
/// connection mutex; everything else is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub tuning: Tuning,
    pub buildings: Arc<BuildingDirectory>,
}

impl AppState {
    pub fn new(conn: Connection, config: &ServerConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            tuning: config.tuning.clone(),
            buildings: Arc::new(BuildingDirectory::new(config.buildings.iter().cloned())),
        }
    }
}
