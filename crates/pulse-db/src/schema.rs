//! SQL schema definitions.

/// Complete v1 schema.
pub const SCHEMA_V1: &str = r#"
-- Aggregation buckets. One row per cell ever hit; rows are never deleted,
-- the score just decays toward zero and read paths skip it.
CREATE TABLE IF NOT EXISTS cells (
    cell_id TEXT PRIMARY KEY,
    score   REAL NOT NULL DEFAULT 0,
    last_ts INTEGER NOT NULL
);

-- Append-only hit log. Feeds the k-anonymity window counts and the 7-day
-- typical-hour baseline.
CREATE TABLE IF NOT EXISTS hits (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    cell_id TEXT NOT NULL,
    ts      INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_hits_cell_ts ON hits(cell_id, ts);

-- Anonymous device registry. The secret is write-once; disabled is a
-- manual kill-switch.
CREATE TABLE IF NOT EXISTS devices (
    device_id  TEXT PRIMARY KEY,
    secret     TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    last_seen  INTEGER NOT NULL,
    disabled   INTEGER NOT NULL DEFAULT 0
);

-- Latest reported cell per device, at most one row per device.
CREATE TABLE IF NOT EXISTS device_presence (
    device_id  TEXT PRIMARY KEY,
    cell_id    TEXT NOT NULL,
    updated_ts INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_presence_cell_ts ON device_presence(cell_id, updated_ts);

-- One reaction slot per device per cell per clock hour; resubmission
-- within the hour overwrites.
CREATE TABLE IF NOT EXISTS vibes (
    cell_id   TEXT NOT NULL,
    device_id TEXT NOT NULL,
    hour      INTEGER NOT NULL,
    vibe      TEXT NOT NULL,
    ts        INTEGER NOT NULL,
    PRIMARY KEY (cell_id, device_id, hour)
);

CREATE INDEX IF NOT EXISTS idx_vibes_cell_ts ON vibes(cell_id, ts);
"#;
