use std::collections::BTreeMap;

use foundation::coords::LatLon;
use serde::{Deserialize, Serialize};

use crate::country::RawCoordinates;
use crate::error::FormatError;

/// Pre-baked country name -> position lookup used instead of live geocoding.
///
/// Keys are matched exactly. Entries whose coordinates fail numeric coercion
/// are dropped while parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateTable {
    entries: BTreeMap<String, LatLon>,
}

#[derive(Serialize)]
struct TableEntry {
    lat: f64,
    lon: f64,
}

impl CoordinateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, country: &str) -> Option<LatLon> {
        self.entries.get(country).copied()
    }

    pub fn contains(&self, country: &str) -> bool {
        self.entries.contains_key(country)
    }

    pub fn insert(&mut self, country: impl Into<String>, at: LatLon) {
        self.entries.insert(country.into(), at);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, LatLon)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let raw: BTreeMap<String, RawCoordinates> =
            serde_json::from_str(text).map_err(|e| FormatError::json("coordinate table", e))?;

        let mut table = Self::new();
        for (country, coords) in raw {
            match coords.to_lat_lon() {
                Some(at) => table.insert(country, at),
                None => tracing::debug!(%country, "dropping coordinate table entry without numeric lat/lon"),
            }
        }
        Ok(table)
    }

    /// Serializes in the same `{ "<country>": { "lat", "lon" } }` shape
    /// [`CoordinateTable::parse`] reads.
    pub fn to_json_pretty(&self) -> Result<String, FormatError> {
        let out: BTreeMap<&str, TableEntry> = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), TableEntry { lat: v.lat, lon: v.lon }))
            .collect();
        serde_json::to_string_pretty(&out).map_err(|e| FormatError::json("coordinate table", e))
    }
}
