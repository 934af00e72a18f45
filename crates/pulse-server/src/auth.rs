//! Request authentication glue.
//!
//! Binds the pure signature checks from `pulse-auth` to the device
//! registry: header extraction, freshness, secret lookup, kill-switch,
//! and the `last_seen` touch on success. All failures collapse into
//! `ApiError::Unauthorized`.

use axum::http::HeaderMap;

use pulse_db::queries::devices;
use pulse_db::DbError;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub const DEVICE_ID_HEADER: &str = "x-device-id";
pub const TIMESTAMP_HEADER: &str = "x-timestamp";
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Authenticate a signed request, returning the device id.
///
/// `body` is the raw body string exactly as received (empty for GET).
pub async fn require_device(
    state: &AppState,
    headers: &HeaderMap,
    body: &str,
    now: u64,
) -> ApiResult<String> {
    let device_id = header_str(headers, DEVICE_ID_HEADER)?;
    let timestamp = header_str(headers, TIMESTAMP_HEADER)?;
    let signature = header_str(headers, SIGNATURE_HEADER)?;

    let conn = state.db.lock().await;

    let device = match devices::get(&conn, device_id) {
        Ok(device) => device,
        Err(DbError::NotFound(_)) => return Err(ApiError::Unauthorized),
        Err(e) => return Err(e.into()),
    };
    if device.disabled {
        tracing::warn!(device_id, "disabled device attempted a signed request");
        return Err(ApiError::Unauthorized);
    }

    pulse_auth::verify_request(
        device_id,
        timestamp,
        signature,
        body,
        &device.secret,
        now,
        state.tuning.auth_skew_secs,
    )?;

    devices::touch_last_seen(&conn, device_id, now)?;
    Ok(device.device_id)
}

/// Advisory authentication: identical checks, but any failure yields
/// `None` instead of an error.
pub async fn optional_device(
    state: &AppState,
    headers: &HeaderMap,
    body: &str,
    now: u64,
) -> Option<String> {
    require_device(state, headers, body, now).await.ok()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> ApiResult<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)
}
