//! Reaction voting endpoint.
//!
//! The caller's cellId claim is ignored: the authoritative cell is
//! whatever the device last reported presence from, and that report must
//! still be inside the presence window. Only building cells take
//! reactions.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use pulse_db::queries::{presence, vibes};
use pulse_types::{hour_bucket, CellId};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::{auth, now_secs};

/// Accepted reaction values; the client offers a fixed tray.
pub const VIBE_VALUES: &[&str] = &["busy", "chill", "hype", "dead", "food", "study"];

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VibeBody {
    /// The client's claim; presence decides the actual cell.
    #[serde(default)]
    pub cell_id: Option<String>,
    #[serde(default)]
    pub vibe: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VibeResponse {
    pub ok: bool,
    pub cell_id: CellId,
    pub vibe: String,
}

pub async fn vibe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> ApiResult<Json<VibeResponse>> {
    let now = now_secs();
    let device_id = auth::require_device(&state, &headers, &body, now).await?;

    let parsed: VibeBody = serde_json::from_str(&body).unwrap_or_default();
    let vibe = parsed
        .vibe
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("Missing vibe".into()))?;
    if !VIBE_VALUES.contains(&vibe) {
        return Err(ApiError::InvalidInput("Invalid vibe".into()));
    }

    let conn = state.db.lock().await;

    let row = presence::get_for_device(&conn, &device_id)?.ok_or(ApiError::NotPresent)?;
    let presence_since = now.saturating_sub(state.tuning.presence_window_secs);
    if row.updated_ts < presence_since {
        return Err(ApiError::NotPresent);
    }

    if let Some(claimed) = parsed.cell_id.as_deref() {
        if claimed != row.cell_id {
            tracing::debug!(claimed, actual = %row.cell_id, "vibe cellId claim overridden by presence");
        }
    }

    let cell = CellId::parse(&row.cell_id)
        .map_err(|_| ApiError::InvalidInput("Invalid cellId".into()))?;
    if !cell.is_building() {
        return Err(ApiError::InvalidInput(
            "Reactions are limited to buildings".into(),
        ));
    }

    vibes::upsert(
        &conn,
        &row.cell_id,
        &device_id,
        hour_bucket(now),
        vibe,
        now,
    )?;

    drop(conn);

    tracing::debug!(cell_id = %row.cell_id, vibe, "recorded vibe");

    Ok(Json(VibeResponse {
        ok: true,
        cell_id: cell,
        vibe: vibe.to_string(),
    }))
}
