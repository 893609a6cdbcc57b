use formats::{CountryRecord, parse_countries};
use runtime::NavToken;
use tracing::{debug, error, warn};

use crate::charts::ChartBackend;
use crate::dashboard::Dashboard;
use crate::fetch::{Fetcher, fetch_dataset};
use crate::map::{EnsureMap, MapBackend, MarkerPlacement};
use crate::outcome::{Degradation, Outcome};
use crate::surface::Document;

/// Rendered country entries and the single highlighted one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountrySelection {
    container_id: String,
    records: Vec<CountryRecord>,
    selected: Option<usize>,
}

impl CountrySelection {
    pub fn new(container_id: impl Into<String>, records: Vec<CountryRecord>) -> Self {
        Self {
            container_id: container_id.into(),
            records,
            selected: None,
        }
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn records(&self) -> &[CountryRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&CountryRecord> {
        self.records.get(index)
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Moves the highlight to `index`, returning the previous one.
    pub fn select(&mut self, index: usize) -> Option<usize> {
        self.selected.replace(index)
    }
}

impl<F, D, M, C> Dashboard<F, D, M, C>
where
    F: Fetcher,
    D: Document,
    M: MapBackend,
    C: ChartBackend,
{
    /// Ensures the map widget exists on the configured container.
    pub fn init_map(&self) -> Outcome<EnsureMap> {
        let id = &self.config.elements.map;
        if !self.document.has_element(id) {
            debug!(target = %id, "map container missing");
            return Outcome::skipped(Degradation::MissingTarget { id: id.clone() });
        }
        self.maps.borrow_mut().ensure_map(id)
    }

    /// Fetches the country records, focuses the first one on the map and
    /// lists them all with the first highlighted.
    ///
    /// Returns the number of entries rendered. Degradations from preparing
    /// the map and from placing the first marker are all kept, in that
    /// order. A marker placement that fails outright only shows up in the
    /// `initial_marker` diagnostic.
    pub async fn render_country_list(&self, target_id: &str, json_path: &str, token: NavToken) -> Outcome<usize> {
        if !self.document.has_element(target_id) {
            debug!(target = target_id, "country list target missing");
            return Outcome::skipped(Degradation::MissingTarget {
                id: target_id.to_string(),
            });
        }
        if let Err(e) = self.document.set_inner_html(target_id, "") {
            return Outcome::Failed(e.into());
        }
        *self.countries.borrow_mut() = CountrySelection::default();

        let records = match fetch_dataset(&self.fetcher, json_path, parse_countries).await {
            Ok(records) => records,
            Err(e) => {
                error!(url = json_path, "country list unavailable: {e}");
                return Outcome::Failed(e);
            }
        };
        if self.is_stale(token) {
            return Outcome::skipped(Degradation::Stale);
        }

        let mut outcome = Outcome::Done(records.len());
        if let Some(reason) = self.init_map().degradation() {
            outcome = outcome.degrade(reason.clone());
        }

        if let Some(first) = records.first() {
            let at = self.resolver.resolve(&self.fetcher, first).await;
            if self.is_stale(token) {
                return Outcome::skipped(Degradation::Stale);
            }
            let placed = self
                .maps
                .borrow_mut()
                .place_marker(at.map(|p| p.lat), at.map(|p| p.lon), Some(first));
            self.note("initial_marker", &placed);
            if let Some(reason) = placed.degradation() {
                outcome = outcome.degrade(reason.clone());
            }
        } else {
            warn!(url = json_path, "country list is empty");
            outcome = outcome.degrade(Degradation::EmptyDataset {
                resource: json_path.to_string(),
            });
        }

        let labels: Vec<String> = records.iter().map(|r| r.country.clone()).collect();
        let class = &self.config.elements.country_item_class;
        if let Err(e) = self.document.render_list(target_id, class, &labels) {
            error!(target = target_id, "unable to render country list: {e}");
            return Outcome::Failed(e.into());
        }

        let has_entries = !records.is_empty();
        *self.countries.borrow_mut() = CountrySelection::new(target_id, records);
        if has_entries {
            self.highlight(0);
        }
        outcome
    }

    /// Focuses the entry at `index`: resolves its coordinates, moves the
    /// marker there and, when a marker was placed, moves the highlight.
    pub async fn select_country(&self, index: usize) -> Outcome<MarkerPlacement> {
        let token = self.current_token();
        let Some(record) = self.countries.borrow().get(index).cloned() else {
            return Outcome::skipped(Degradation::UnknownEntry { index });
        };

        let at = self.resolver.resolve(&self.fetcher, &record).await;
        if self.is_stale(token) {
            return Outcome::skipped(Degradation::Stale);
        }
        let placed = self
            .maps
            .borrow_mut()
            .place_marker(at.map(|p| p.lat), at.map(|p| p.lon), Some(&record));
        if placed.value().is_some() {
            self.highlight(index);
        }
        self.note("select_country", &placed);
        placed
    }

    fn highlight(&self, index: usize) {
        let (container, previous) = {
            let mut selection = self.countries.borrow_mut();
            let previous = selection.select(index);
            (selection.container_id().to_string(), previous)
        };
        let class = &self.config.elements.selected_class;
        if let Some(previous) = previous.filter(|p| *p != index) {
            if let Err(e) = self.document.toggle_item_class(&container, previous, class, false) {
                debug!("unable to clear highlight: {e}");
            }
        }
        if let Err(e) = self.document.toggle_item_class(&container, index, class, true) {
            debug!("unable to highlight entry {index}: {e}");
        }
    }
}
