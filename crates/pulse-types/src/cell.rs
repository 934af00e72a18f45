//! Cell identifiers.
//!
//! A cell is either a geohash grid square or a named campus building. The
//! two kinds are tagged at parse time so downstream code dispatches on the
//! enum instead of re-matching strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{GEOHASH_ALPHABET, GEOHASH_MAX_LEN, GEOHASH_MIN_LEN};

/// Wire prefix for building cells: `b:<slug>`.
const BUILDING_PREFIX: &str = "b:";

/// An aggregation bucket identifier.
///
/// Wire forms: a bare base-32 geohash of length 5-12 (`9q9hvu7`), or a
/// building slug prefixed with `b:` (`b:eng-quad`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CellId {
    /// Geohash grid cell; the string is lowercase base-32, length 5-12.
    Geohash(String),
    /// Named building; the slug matches `[a-z0-9_-]+`.
    Building(String),
}

/// Rejection reasons for malformed cell ids.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CellIdError {
    #[error("missing cellId")]
    Empty,

    #[error("invalid cellId")]
    Invalid,
}

impl CellId {
    /// Parse a wire-form cell id. Trims surrounding whitespace; geohashes
    /// are lowercased before validation.
    pub fn parse(raw: &str) -> Result<Self, CellIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CellIdError::Empty);
        }

        if let Some(slug) = trimmed.strip_prefix(BUILDING_PREFIX) {
            if slug.is_empty() || !slug.bytes().all(is_slug_byte) {
                return Err(CellIdError::Invalid);
            }
            return Ok(CellId::Building(slug.to_string()));
        }

        let hash = trimmed.to_ascii_lowercase();
        if hash.len() < GEOHASH_MIN_LEN || hash.len() > GEOHASH_MAX_LEN {
            return Err(CellIdError::Invalid);
        }
        if !hash.chars().all(|c| GEOHASH_ALPHABET.contains(c)) {
            return Err(CellIdError::Invalid);
        }
        Ok(CellId::Geohash(hash))
    }

    /// The wire/storage form: `b:<slug>` for buildings, the bare hash
    /// otherwise.
    pub fn as_wire(&self) -> String {
        match self {
            CellId::Geohash(h) => h.clone(),
            CellId::Building(slug) => format!("{BUILDING_PREFIX}{slug}"),
        }
    }

    pub fn is_building(&self) -> bool {
        matches!(self, CellId::Building(_))
    }
}

fn is_slug_byte(b: u8) -> bool {
    b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-'
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellId::Geohash(h) => f.write_str(h),
            CellId::Building(slug) => write!(f, "{BUILDING_PREFIX}{slug}"),
        }
    }
}

impl FromStr for CellId {
    type Err = CellIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellId::parse(s)
    }
}

impl TryFrom<String> for CellId {
    type Error = CellIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        CellId::parse(&s)
    }
}

impl From<CellId> for String {
    fn from(id: CellId) -> Self {
        id.as_wire()
    }
}
