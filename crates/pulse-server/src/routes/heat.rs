//! Bounding-box heat query endpoint.
//!
//! Cells pass the k-anonymity floor first, then resolve to a point
//! (geohash midpoint or registered building coordinates), and the bbox
//! filter runs against that point. Cells straddling the box edge are
//! included or excluded by their midpoint alone; this stays a point test,
//! not a polygon intersection.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use pulse_db::queries::cells;
use pulse_geo::{cell_radius_meters, decode, BuildingDirectory};
use pulse_types::{CellId, Tuning};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::now_secs;

const DEFAULT_MIN: u64 = 1;
const DEFAULT_WINDOW_MINUTES: u64 = 30;

#[derive(Deserialize)]
pub struct HeatQuery {
    pub bbox: Option<String>,
    pub min: Option<String>,
    pub window: Option<String>,
    pub debug: Option<String>,
}

#[derive(Serialize)]
pub struct HeatPoint {
    pub lat: f64,
    pub lng: f64,
    pub score: f64,
    /// Meters.
    pub radius: f64,
    /// Only with `debug=1`; cell ids stay private by default.
    #[serde(rename = "cellId", skip_serializing_if = "Option::is_none")]
    pub cell_id: Option<String>,
}

#[derive(Serialize)]
pub struct HeatResponse {
    pub ok: bool,
    pub count: usize,
    pub data: Vec<HeatPoint>,
}

struct BBox {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

impl BBox {
    fn contains(&self, lat: f64, lng: f64) -> bool {
        lng >= self.west && lng <= self.east && lat >= self.south && lat <= self.north
    }
}

pub async fn heat(
    State(state): State<AppState>,
    Query(query): Query<HeatQuery>,
) -> ApiResult<Json<HeatResponse>> {
    let bbox = parse_bbox(query.bbox.as_deref())?;
    let min = parse_floor_one(query.min.as_deref(), DEFAULT_MIN);
    let window_minutes = parse_floor_one(query.window.as_deref(), DEFAULT_WINDOW_MINUTES);
    let debug = query.debug.as_deref() == Some("1");

    let now = now_secs();
    let since = now.saturating_sub(window_minutes * 60);

    let conn = state.db.lock().await;
    let rows = cells::active(&conn, since, min)?;
    drop(conn);

    let data: Vec<HeatPoint> = rows
        .iter()
        .filter_map(|row| resolve_point(row, now, &state.tuning, &state.buildings))
        .filter(|p| bbox.contains(p.lat, p.lng))
        .map(|mut p| {
            if !debug {
                p.cell_id = None;
            }
            p
        })
        .collect();

    Ok(Json(HeatResponse {
        ok: true,
        count: data.len(),
        data,
    }))
}

/// Resolve a surviving cell to a map point. Unparseable ids and
/// unregistered buildings are skipped rather than failing the query.
fn resolve_point(
    row: &cells::CellRow,
    now: u64,
    tuning: &Tuning,
    buildings: &BuildingDirectory,
) -> Option<HeatPoint> {
    let score = cells::decayed_score(row.score, row.last_ts, now, tuning.tau());
    match CellId::parse(&row.cell_id).ok()? {
        CellId::Geohash(hash) => {
            let mid = decode(&hash).ok()?;
            Some(HeatPoint {
                lat: mid.lat,
                lng: mid.lng,
                score,
                radius: cell_radius_meters(hash.len()),
                cell_id: Some(row.cell_id.clone()),
            })
        }
        CellId::Building(slug) => {
            let building = buildings.get(&slug)?;
            Some(HeatPoint {
                lat: building.lat,
                lng: building.lng,
                score,
                radius: tuning.building_radius_m,
                cell_id: Some(row.cell_id.clone()),
            })
        }
    }
}

fn parse_bbox(raw: Option<&str>) -> ApiResult<BBox> {
    let raw = raw.ok_or_else(|| ApiError::InvalidInput("Missing bbox".into()))?;
    let parts: Vec<f64> = raw
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| ApiError::InvalidInput("Invalid bbox format".into()))?;
    if parts.len() != 4 || parts.iter().any(|n| !n.is_finite()) {
        return Err(ApiError::InvalidInput("Invalid bbox format".into()));
    }
    Ok(BBox {
        west: parts[0],
        south: parts[1],
        east: parts[2],
        north: parts[3],
    })
}

/// Parse an optional count parameter, defaulting and flooring at 1.
fn parse_floor_one(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(default)
        .max(1)
}
