//! Hit log query functions.

use rusqlite::Connection;

use pulse_types::{hour_of_day, SECS_PER_DAY};

use crate::Result;

/// Append one immutable hit row.
pub fn append(conn: &Connection, cell_id: &str, ts: u64) -> Result<()> {
    conn.execute(
        "INSERT INTO hits (cell_id, ts) VALUES (?1, ?2)",
        rusqlite::params![cell_id, ts as i64],
    )?;
    Ok(())
}

/// Hits for a cell at or after `since`.
pub fn count_since(conn: &Connection, cell_id: &str, since: u64) -> Result<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM hits WHERE cell_id = ?1 AND ts >= ?2",
        rusqlite::params![cell_id, since as i64],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

/// 7-day typical count for the hour-of-day at `now`: group the last seven
/// days' hits by calendar day, keep rows in the matching hour, average the
/// per-day counts. Days with no hits in that hour do not contribute.
pub fn typical_hour_count(conn: &Connection, cell_id: &str, now: u64) -> Result<f64> {
    let since = now.saturating_sub(7 * SECS_PER_DAY);
    let hour = hour_of_day(now);

    let avg: Option<f64> = conn.query_row(
        "SELECT AVG(cnt) FROM (
             SELECT COUNT(*) AS cnt
             FROM hits
             WHERE cell_id = ?1
               AND ts >= ?2
               AND (ts % 86400) / 3600 = ?3
             GROUP BY ts / 86400
         )",
        rusqlite::params![cell_id, since as i64, hour as i64],
        |row| row.get(0),
    )?;

    Ok(avg.unwrap_or(0.0))
}

/// Delete hits strictly older than `cutoff`. Returns the number removed.
pub fn prune_before(conn: &Connection, cutoff: u64) -> Result<usize> {
    let removed = conn.execute(
        "DELETE FROM hits WHERE ts < ?1",
        rusqlite::params![cutoff as i64],
    )?;
    if removed > 0 {
        tracing::debug!(removed, cutoff, "pruned hit log");
    }
    Ok(removed)
}
