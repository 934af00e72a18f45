//! Vibe (reaction) query functions.

use rusqlite::{Connection, OptionalExtension};

use crate::Result;

/// Aggregated tally for one vibe value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VibeTally {
    pub vibe: String,
    pub count: u64,
}

/// Record a reaction for the device's current hour slot. A second call in
/// the same hour overwrites the value and timestamp instead of adding a
/// row.
pub fn upsert(
    conn: &Connection,
    cell_id: &str,
    device_id: &str,
    hour: u64,
    vibe: &str,
    ts: u64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO vibes (cell_id, device_id, hour, vibe, ts)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(cell_id, device_id, hour) DO UPDATE SET
             vibe = excluded.vibe,
             ts = excluded.ts",
        rusqlite::params![cell_id, device_id, hour as i64, vibe, ts as i64],
    )?;
    Ok(())
}

/// Per-vibe counts for reactions at or after `since`, busiest first.
pub fn tallies_since(conn: &Connection, cell_id: &str, since: u64) -> Result<Vec<VibeTally>> {
    let mut stmt = conn.prepare(
        "SELECT vibe, COUNT(*) FROM vibes
         WHERE cell_id = ?1 AND ts >= ?2
         GROUP BY vibe
         ORDER BY COUNT(*) DESC, vibe",
    )?;

    let rows = stmt
        .query_map(rusqlite::params![cell_id, since as i64], |row| {
            Ok(VibeTally {
                vibe: row.get(0)?,
                count: row.get::<_, i64>(1)? as u64,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// The caller's own reaction in the given hour slot, if any.
pub fn get_for_device_hour(
    conn: &Connection,
    cell_id: &str,
    device_id: &str,
    hour: u64,
) -> Result<Option<String>> {
    let vibe = conn
        .query_row(
            "SELECT vibe FROM vibes
             WHERE cell_id = ?1 AND device_id = ?2 AND hour = ?3",
            rusqlite::params![cell_id, device_id, hour as i64],
            |row| row.get(0),
        )
        .optional()?;
    Ok(vibe)
}
