//! Request signature computation and checks.

use sha2::{Digest, Sha256};

use crate::Unauthorized;

/// Compute the expected signature for a request: lowercase hex of
/// `sha256(device_id + "." + timestamp + "." + body + "." + secret)`.
///
/// `body` is the raw request body string exactly as sent; GET requests
/// sign the empty string.
pub fn compute_signature(device_id: &str, timestamp: u64, body: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(device_id.as_bytes());
    hasher.update(b".");
    hasher.update(timestamp.to_string().as_bytes());
    hasher.update(b".");
    hasher.update(body.as_bytes());
    hasher.update(b".");
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare a provided signature against the expected one. Hex digits
/// compare case-insensitively.
pub fn signature_matches(expected: &str, provided: &str) -> bool {
    expected.len() == provided.len() && expected.eq_ignore_ascii_case(provided)
}

/// Replay/clock-skew check: `|now - timestamp| <= skew_secs`.
pub fn timestamp_fresh(now: u64, timestamp: u64, skew_secs: u64) -> bool {
    now.abs_diff(timestamp) <= skew_secs
}

/// Check a complete signed request against a known device secret.
///
/// `timestamp_raw` is the `x-timestamp` header as received; a value that
/// does not parse as epoch seconds fails the same way as a stale or
/// mismatched signature.
pub fn verify_request(
    device_id: &str,
    timestamp_raw: &str,
    signature: &str,
    body: &str,
    secret: &str,
    now: u64,
    skew_secs: u64,
) -> Result<(), Unauthorized> {
    let timestamp: u64 = timestamp_raw.trim().parse().map_err(|_| Unauthorized)?;
    if !timestamp_fresh(now, timestamp, skew_secs) {
        return Err(Unauthorized);
    }
    let expected = compute_signature(device_id, timestamp, body, secret);
    if !signature_matches(&expected, signature) {
        return Err(Unauthorized);
    }
    Ok(())
}
