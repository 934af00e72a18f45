//! Cell score query functions.
//!
//! A cell's stored score is exact as of `last_ts`. Readers re-apply decay
//! relative to their own `now`; writers fold decay in before adding the
//! new hit's contribution.

use rusqlite::{Connection, OptionalExtension};

use crate::Result;

/// A raw cell row.
#[derive(Debug, Clone)]
pub struct CellRow {
    pub cell_id: String,
    pub score: f64,
    pub last_ts: u64,
}

/// Exponential decay of `score` over `now - last_ts` seconds.
///
/// `tau` is the decay time constant (half-life / ln 2). Time running
/// backwards clamps to no decay.
pub fn decayed_score(score: f64, last_ts: u64, now: u64, tau: f64) -> f64 {
    let dt = now.saturating_sub(last_ts) as f64;
    score * (-dt / tau).exp()
}

/// Get a cell row, if the cell has ever been hit.
pub fn get(conn: &Connection, cell_id: &str) -> Result<Option<CellRow>> {
    let row = conn
        .query_row(
            "SELECT cell_id, score, last_ts FROM cells WHERE cell_id = ?1",
            [cell_id],
            |row| {
                Ok(CellRow {
                    cell_id: row.get(0)?,
                    score: row.get(1)?,
                    last_ts: row.get::<_, i64>(2)? as u64,
                })
            },
        )
        .optional()?;
    Ok(row)
}

/// Fold one hit at `ts` into the cell's decayed score. Returns the new
/// score. Callers run this inside the ingest transaction.
pub fn apply_hit(conn: &Connection, cell_id: &str, ts: u64, tau: f64) -> Result<f64> {
    let score = match get(conn, cell_id)? {
        None => {
            let score = 1.0;
            conn.execute(
                "INSERT INTO cells (cell_id, score, last_ts) VALUES (?1, ?2, ?3)",
                rusqlite::params![cell_id, score, ts as i64],
            )?;
            score
        }
        Some(prior) => {
            let score = decayed_score(prior.score, prior.last_ts, ts, tau) + 1.0;
            conn.execute(
                "UPDATE cells SET score = ?1, last_ts = ?2 WHERE cell_id = ?3",
                rusqlite::params![score, ts as i64, cell_id],
            )?;
            score
        }
    };
    Ok(score)
}

/// Cells with positive score whose hit count inside the window meets the
/// k-anonymity floor. Scores are returned as stored; callers decay them
/// to their own `now`.
pub fn active(conn: &Connection, since: u64, min_hits: u64) -> Result<Vec<CellRow>> {
    let mut stmt = conn.prepare(
        "SELECT c.cell_id, c.score, c.last_ts
         FROM cells c
         WHERE c.score > 0
           AND (SELECT COUNT(*) FROM hits h
                WHERE h.cell_id = c.cell_id AND h.ts >= ?1) >= ?2",
    )?;

    let rows = stmt
        .query_map(
            rusqlite::params![since as i64, min_hits as i64],
            |row| {
                Ok(CellRow {
                    cell_id: row.get(0)?,
                    score: row.get(1)?,
                    last_ts: row.get::<_, i64>(2)? as u64,
                })
            },
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
