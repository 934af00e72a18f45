//! # pulse-auth
//!
//! Anonymous device credentials and the request signature scheme.
//!
//! A device holds an opaque id and a shared secret, both minted once at
//! registration. Every signed request carries the header triple
//! `x-device-id` / `x-timestamp` / `x-signature`, where the signature is
//! `hex(sha256(device_id + "." + timestamp + "." + body + "." + secret))`.
//! The timestamp bounds replay: requests older or newer than the skew
//! window are rejected before any secret lookup.

pub mod credentials;
pub mod signer;

pub use credentials::DeviceCredentials;
pub use signer::{compute_signature, signature_matches, timestamp_fresh, verify_request};

/// Single opaque failure for every authentication problem. Callers never
/// learn whether the device id, the timestamp, or the signature was wrong.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unauthorized")]
pub struct Unauthorized;
