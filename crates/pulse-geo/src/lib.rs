//! # pulse-geo
//!
//! Geohash codec and the registered building directory. Everything here is
//! pure: the codec bisects coordinate ranges deterministically, and the
//! directory is an in-memory lookup built once from configuration.

pub mod buildings;
pub mod geohash;

pub use buildings::{Building, BuildingDirectory};
pub use geohash::{cell_radius_meters, decode, encode, GeoError, LatLng};
