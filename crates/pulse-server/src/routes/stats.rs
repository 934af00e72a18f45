//! Per-cell statistics endpoint.
//!
//! Authentication is advisory here: a valid signature only attaches the
//! caller's own current-hour reaction to the response.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use pulse_db::queries::{cells, hits, presence, vibes};
use pulse_types::{hour_bucket, CellId, SECS_PER_HOUR};

use crate::error::ApiResult;
use crate::state::AppState;
use crate::{auth, now_secs};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub cell_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VibeCount {
    pub vibe: String,
    pub count: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub ok: bool,
    pub cell_id: CellId,
    /// Score decayed to now; 0 for never-hit cells.
    pub score: f64,
    pub last_ts: Option<u64>,
    pub last_hour_hits: u64,
    /// 7-day average hit count for the current hour of day.
    pub typical_hits: f64,
    /// `last_hour_hits - typical_hits`.
    pub delta: f64,
    pub current_presence: u64,
    pub vibes: Vec<VibeCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_vibe: Option<String>,
}

pub async fn stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
    headers: HeaderMap,
) -> ApiResult<Json<StatsResponse>> {
    let now = now_secs();
    let cell = CellId::parse(query.cell_id.as_deref().unwrap_or(""))?;
    // GET requests sign the empty body.
    let device_id = auth::optional_device(&state, &headers, "", now).await;

    let wire = cell.as_wire();
    let hour_ago = now.saturating_sub(SECS_PER_HOUR);
    let presence_since = now.saturating_sub(state.tuning.presence_window_secs);

    let conn = state.db.lock().await;

    let (score, last_ts) = match cells::get(&conn, &wire)? {
        Some(row) => (
            cells::decayed_score(row.score, row.last_ts, now, state.tuning.tau()),
            Some(row.last_ts),
        ),
        None => (0.0, None),
    };
    let last_hour_hits = hits::count_since(&conn, &wire, hour_ago)?;
    let typical_hits = hits::typical_hour_count(&conn, &wire, now)?;
    let current_presence = presence::count_for_cell(&conn, &wire, presence_since)?;
    let tallies = vibes::tallies_since(&conn, &wire, hour_ago)?;
    let my_vibe = match &device_id {
        Some(device_id) => {
            vibes::get_for_device_hour(&conn, &wire, device_id, hour_bucket(now))?
        }
        None => None,
    };

    drop(conn);

    Ok(Json(StatsResponse {
        ok: true,
        cell_id: cell,
        score,
        last_ts,
        last_hour_hits,
        typical_hits,
        delta: last_hour_hits as f64 - typical_hits,
        current_presence,
        vibes: tallies
            .into_iter()
            .map(|t| VibeCount {
                vibe: t.vibe,
                count: t.count,
            })
            .collect(),
        my_vibe,
    }))
}
