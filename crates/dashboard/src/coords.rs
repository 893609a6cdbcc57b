use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use foundation::coords::LatLon;
use formats::{CoordinateTable, CountryRecord, coerce};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::DashboardError;
use crate::fetch::{Fetcher, fetch_dataset};

/// Embedded coordinates first, then the table entry for the exact country name.
pub fn resolve_with(record: &CountryRecord, table: &CoordinateTable) -> Option<LatLon> {
    record.coordinates.or_else(|| table.get(&record.country))
}

/// Session-scoped resolver backed by the local coordinate table.
///
/// The table is fetched on first need and kept for the rest of the session.
/// A failed fetch is remembered as an empty table.
#[derive(Debug)]
pub struct CoordinateResolver {
    table_url: String,
    table: RefCell<Option<Rc<CoordinateTable>>>,
}

impl CoordinateResolver {
    pub fn new(table_url: impl Into<String>) -> Self {
        Self {
            table_url: table_url.into(),
            table: RefCell::new(None),
        }
    }

    /// Seeds the cache, skipping the fetch entirely.
    pub fn with_table(table_url: impl Into<String>, table: CoordinateTable) -> Self {
        Self {
            table_url: table_url.into(),
            table: RefCell::new(Some(Rc::new(table))),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.table.borrow().is_some()
    }

    pub async fn table<F: Fetcher + ?Sized>(&self, fetcher: &F) -> Rc<CoordinateTable> {
        if let Some(table) = self.table.borrow().as_ref() {
            return table.clone();
        }
        let table = match fetch_dataset(fetcher, &self.table_url, CoordinateTable::parse).await {
            Ok(table) => {
                debug!(entries = table.len(), url = %self.table_url, "loaded coordinate table");
                table
            }
            Err(e) => {
                warn!(url = %self.table_url, "coordinate table unavailable, using none: {e}");
                CoordinateTable::new()
            }
        };
        // Another resolve may have finished loading while this one was suspended.
        self.table.borrow_mut().get_or_insert_with(|| Rc::new(table)).clone()
    }

    pub async fn resolve<F: Fetcher + ?Sized>(&self, fetcher: &F, record: &CountryRecord) -> Option<LatLon> {
        if let Some(at) = record.coordinates {
            return Some(at);
        }
        let table = self.table(fetcher).await;
        resolve_with(record, &table)
    }
}

pub const NOMINATIM_SEARCH: &str = "https://nominatim.openstreetmap.org/search";

/// Remote geocoder (Nominatim search API).
///
/// Results, including "no match", are cached per country name. Transport
/// failures are not cached. The dashboard never calls this while rendering;
/// it exists for baking coordinate tables offline.
#[derive(Debug)]
pub struct Geocoder {
    base_url: String,
    cache: RefCell<BTreeMap<String, Option<LatLon>>>,
}

impl Geocoder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            cache: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn query_url(&self, country: &str) -> String {
        let q: String = url::form_urlencoded::byte_serialize(country.as_bytes()).collect();
        let sep = if self.base_url.contains('?') { '&' } else { '?' };
        format!("{}{sep}format=json&q={q}", self.base_url)
    }

    pub fn cached(&self, country: &str) -> Option<Option<LatLon>> {
        self.cache.borrow().get(country).copied()
    }

    pub async fn lookup<F: Fetcher + ?Sized>(
        &self,
        fetcher: &F,
        country: &str,
    ) -> Result<Option<LatLon>, DashboardError> {
        if let Some(hit) = self.cached(country) {
            return Ok(hit);
        }
        let body = fetcher
            .get_text(&self.query_url(country))
            .await
            .map_err(DashboardError::Dataset)?;
        let found = parse_search_response(&body).map_err(|message| DashboardError::Geocode {
            country: country.to_string(),
            message,
        })?;
        if found.is_none() {
            debug!(country, "geocoder returned no match");
        }
        self.cache.borrow_mut().insert(country.to_string(), found);
        Ok(found)
    }
}

/// First hit's `lat`/`lon`; Nominatim sends them as strings.
fn parse_search_response(body: &str) -> Result<Option<LatLon>, String> {
    let value: Value = serde_json::from_str(body).map_err(|e| e.to_string())?;
    let Value::Array(hits) = value else {
        return Err("expected a JSON array".to_string());
    };
    Ok(hits
        .first()
        .and_then(|hit| LatLon::from_parts(coerce(hit.get("lat")), coerce(hit.get("lon")))))
}
