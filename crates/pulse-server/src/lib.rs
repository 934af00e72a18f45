//! # pulse-server
//!
//! The BuzzPulse HTTP API: anonymous presence ingest, decaying heat-map
//! queries, per-cell stats, and hourly reaction votes. Handlers are thin;
//! scoring and window math live in `pulse-db`, the signature scheme in
//! `pulse-auth`.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use routes::build_router;
pub use state::AppState;

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "buzzpulse";

/// Current wall clock in epoch seconds. The only place the server reads
/// the system clock; everything below takes `now` as an argument.
pub fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
