//! Presence hit ingest endpoint.
//!
//! The handler takes the raw body because the signature covers the exact
//! bytes sent, not a re-serialization. Malformed JSON is treated as an
//! empty body and fails cellId validation with 400.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use pulse_db::queries::{ingest, presence};
use pulse_types::CellId;

use crate::error::ApiResult;
use crate::state::AppState;
use crate::{auth, now_secs};

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestBody {
    #[serde(default)]
    pub cell_id: Option<String>,
    /// Epoch seconds; server time when absent or non-finite.
    #[serde(default)]
    pub ts: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub ok: bool,
    pub cell_id: CellId,
    pub ts: u64,
    pub score: f64,
    pub presence: u64,
}

pub async fn ingest(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> ApiResult<Json<IngestResponse>> {
    let now = now_secs();
    let device_id = auth::require_device(&state, &headers, &body, now).await?;

    let parsed: IngestBody = serde_json::from_str(&body).unwrap_or_default();
    let cell = CellId::parse(parsed.cell_id.as_deref().unwrap_or(""))?;
    let ts = resolve_ts(parsed.ts, now);

    let wire = cell.as_wire();
    let mut conn = state.db.lock().await;
    let outcome = ingest::record(&mut conn, &wire, &device_id, ts, state.tuning.tau())?;
    let presence_since = now.saturating_sub(state.tuning.presence_window_secs);
    let presence = presence::count_for_cell(&conn, &wire, presence_since)?;
    drop(conn);

    Ok(Json(IngestResponse {
        ok: true,
        cell_id: cell,
        ts,
        score: outcome.score,
        presence,
    }))
}

/// Client timestamps must be finite and non-negative; anything else falls
/// back to server time.
fn resolve_ts(ts: Option<f64>, now: u64) -> u64 {
    match ts {
        Some(t) if t.is_finite() && t >= 0.0 => t as u64,
        _ => now,
    }
}
