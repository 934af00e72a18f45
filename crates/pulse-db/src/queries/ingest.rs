//! The transactional ingest composite.
//!
//! One hit means three writes that must land together: the decayed score
//! fold, the append-only hit row, and the device presence move. Running
//! them in a single transaction also closes the read-then-write race two
//! concurrent ingests for the same cell would otherwise have.

use rusqlite::Connection;

use crate::queries::{cells, hits, presence};
use crate::Result;

/// Outcome of one recorded hit.
#[derive(Debug, Clone, Copy)]
pub struct IngestOutcome {
    /// Cell score after folding this hit in.
    pub score: f64,
}

/// Record one authenticated hit at `ts` from `device_id` in `cell_id`.
pub fn record(
    conn: &mut Connection,
    cell_id: &str,
    device_id: &str,
    ts: u64,
    tau: f64,
) -> Result<IngestOutcome> {
    let tx = conn.transaction()?;

    let score = cells::apply_hit(&tx, cell_id, ts, tau)?;
    hits::append(&tx, cell_id, ts)?;
    presence::upsert(&tx, device_id, cell_id, ts)?;

    tx.commit()?;

    tracing::debug!(cell_id, ts, score, "recorded hit");
    Ok(IngestOutcome { score })
}
