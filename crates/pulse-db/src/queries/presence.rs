//! Device presence query functions.
//!
//! At most one row per device: the cell it most recently reported from.
//! Live presence for a cell counts devices whose row is inside the
//! presence window.

use rusqlite::{Connection, OptionalExtension};

use crate::Result;

/// A device's latest reported cell.
#[derive(Debug, Clone)]
pub struct PresenceRow {
    pub device_id: String,
    pub cell_id: String,
    pub updated_ts: u64,
}

/// Record that `device_id` just reported from `cell_id`. Insert or move.
pub fn upsert(conn: &Connection, device_id: &str, cell_id: &str, ts: u64) -> Result<()> {
    conn.execute(
        "INSERT INTO device_presence (device_id, cell_id, updated_ts)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(device_id) DO UPDATE SET
             cell_id = excluded.cell_id,
             updated_ts = excluded.updated_ts",
        rusqlite::params![device_id, cell_id, ts as i64],
    )?;
    Ok(())
}

/// Distinct devices currently at `cell_id`: presence rows with
/// `updated_ts >= since`.
pub fn count_for_cell(conn: &Connection, cell_id: &str, since: u64) -> Result<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM device_presence
         WHERE cell_id = ?1 AND updated_ts >= ?2",
        rusqlite::params![cell_id, since as i64],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

/// The device's current presence row, if it ever reported.
pub fn get_for_device(conn: &Connection, device_id: &str) -> Result<Option<PresenceRow>> {
    let row = conn
        .query_row(
            "SELECT device_id, cell_id, updated_ts
             FROM device_presence WHERE device_id = ?1",
            [device_id],
            |row| {
                Ok(PresenceRow {
                    device_id: row.get(0)?,
                    cell_id: row.get(1)?,
                    updated_ts: row.get::<_, i64>(2)? as u64,
                })
            },
        )
        .optional()?;
    Ok(row)
}
