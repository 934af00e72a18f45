//! Decay and presence tuning knobs.
//!
//! Kept in one struct so deployments override them from config and tests
//! run with compressed time (e.g. a 2-second half-life) without touching
//! production values.

use serde::{Deserialize, Serialize};

/// Scoring and freshness parameters, all in seconds unless noted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuning {
    /// Time for a cell score to halve absent new hits.
    #[serde(default = "default_half_life")]
    pub half_life_secs: u64,
    /// How recently a device must have reported to count as present.
    #[serde(default = "default_presence_window")]
    pub presence_window_secs: u64,
    /// Accepted clock skew / replay window for signed requests.
    #[serde(default = "default_auth_skew")]
    pub auth_skew_secs: u64,
    /// Radius reported for building cells on the heat map, meters.
    #[serde(default = "default_building_radius")]
    pub building_radius_m: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            half_life_secs: default_half_life(),
            presence_window_secs: default_presence_window(),
            auth_skew_secs: default_auth_skew(),
            building_radius_m: default_building_radius(),
        }
    }
}

impl Tuning {
    /// Decay time constant: `e^(-dt/tau)` halves the score after one
    /// half-life.
    pub fn tau(&self) -> f64 {
        self.half_life_secs as f64 / std::f64::consts::LN_2
    }
}

fn default_half_life() -> u64 {
    6 * 3600
}

fn default_presence_window() -> u64 {
    10 * 60
}

fn default_auth_skew() -> u64 {
    300
}

fn default_building_radius() -> f64 {
    25.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = Tuning::default();
        assert_eq!(t.half_life_secs, 21600);
        assert_eq!(t.presence_window_secs, 600);
        assert_eq!(t.auth_skew_secs, 300);
    }

    #[test]
    fn test_tau_halves_after_half_life() {
        let t = Tuning {
            half_life_secs: 100,
            ..Tuning::default()
        };
        let decayed = (-(100.0 / t.tau())).exp();
        assert!((decayed - 0.5).abs() < 1e-12);
    }
}
