//! Device registry query functions.

use rusqlite::Connection;

use crate::{DbError, Result};

/// A raw device row. `secret` stays inside the auth path; never serialize
/// this struct outward.
#[derive(Debug)]
pub struct DeviceRow {
    pub device_id: String,
    pub secret: String,
    pub created_at: u64,
    pub last_seen: u64,
    pub disabled: bool,
}

/// Persist a freshly registered device.
pub fn insert(conn: &Connection, device_id: &str, secret: &str, now: u64) -> Result<()> {
    conn.execute(
        "INSERT INTO devices (device_id, secret, created_at, last_seen, disabled)
         VALUES (?1, ?2, ?3, ?3, 0)",
        rusqlite::params![device_id, secret, now as i64],
    )?;
    Ok(())
}

/// Get a device by id.
pub fn get(conn: &Connection, device_id: &str) -> Result<DeviceRow> {
    conn.query_row(
        "SELECT device_id, secret, created_at, last_seen, disabled
         FROM devices WHERE device_id = ?1",
        [device_id],
        |row| {
            Ok(DeviceRow {
                device_id: row.get(0)?,
                secret: row.get(1)?,
                created_at: row.get::<_, i64>(2)? as u64,
                last_seen: row.get::<_, i64>(3)? as u64,
                disabled: row.get(4)?,
            })
        },
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound("device".into()),
        other => DbError::Sqlite(other),
    })
}

/// Update `last_seen` after a successful authentication.
pub fn touch_last_seen(conn: &Connection, device_id: &str, now: u64) -> Result<()> {
    conn.execute(
        "UPDATE devices SET last_seen = ?1 WHERE device_id = ?2",
        rusqlite::params![now as i64, device_id],
    )?;
    Ok(())
}

/// Manual kill-switch. Not exposed over HTTP; operators flip it directly.
pub fn set_disabled(conn: &Connection, device_id: &str, disabled: bool) -> Result<()> {
    let changed = conn.execute(
        "UPDATE devices SET disabled = ?1 WHERE device_id = ?2",
        rusqlite::params![disabled, device_id],
    )?;
    if changed == 0 {
        return Err(DbError::NotFound("device".into()));
    }
    tracing::info!(device_id, disabled, "device kill-switch updated");
    Ok(())
}
