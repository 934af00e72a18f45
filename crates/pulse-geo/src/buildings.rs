//! Registered building directory.
//!
//! Building cells (`b:<slug>`) do not decode to coordinates; the server
//! resolves them against this pre-registered slug -> location table. The
//! entries are deserialized straight from the server configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One registered building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    /// Slug used in `b:<slug>` cell ids.
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Slug -> building lookup.
#[derive(Debug, Clone, Default)]
pub struct BuildingDirectory {
    by_slug: HashMap<String, Building>,
}

impl BuildingDirectory {
    /// Build the directory from configured entries. Later duplicates of a
    /// slug replace earlier ones.
    pub fn new(entries: impl IntoIterator<Item = Building>) -> Self {
        let by_slug = entries
            .into_iter()
            .map(|b| (b.id.clone(), b))
            .collect();
        Self { by_slug }
    }

    pub fn get(&self, slug: &str) -> Option<&Building> {
        self.by_slug.get(slug)
    }

    pub fn len(&self) -> usize {
        self.by_slug.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_slug.is_empty()
    }

    /// The default campus deployment: the two quads the pilot shipped with.
    pub fn default_campus() -> Self {
        Self::new([
            Building {
                id: "eng-quad".into(),
                name: "Engineering Quad".into(),
                lat: 37.42805,
                lng: -122.1723,
            },
            Building {
                id: "main-quad".into(),
                name: "Main Quad".into(),
                lat: 37.42745,
                lng: -122.1701,
            },
        ])
    }
}
