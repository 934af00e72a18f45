//! Device registration endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use pulse_auth::DeviceCredentials;
use pulse_db::queries::devices;

use crate::error::ApiResult;
use crate::state::AppState;
use crate::now_secs;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub ok: bool,
    pub device_id: String,
    /// Returned exactly once; the server never hands the secret out again.
    pub secret: String,
}

pub async fn register(State(state): State<AppState>) -> ApiResult<Json<RegisterResponse>> {
    let creds = DeviceCredentials::generate();
    let now = now_secs();

    let conn = state.db.lock().await;
    devices::insert(&conn, &creds.device_id, &creds.secret, now)?;
    drop(conn);

    tracing::info!(device_id = %creds.device_id, "registered device");

    Ok(Json(RegisterResponse {
        ok: true,
        device_id: creds.device_id,
        secret: creds.secret,
    }))
}
