//! In-memory collaborators for driving a [`Dashboard`] without a browser.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use foundation::coords::LatLon;
use foundation::ids::{Id, IdAllocator};

use crate::charts::{ChartBackend, ChartSpec};
use crate::config::{DashboardConfig, MapControls, MarkerStyle, TileLayer, ViewAnimation};
use crate::dashboard::Dashboard;
use crate::error::{ChartError, FetchError, MapError, SurfaceError};
use crate::fetch::Fetcher;
use crate::map::{MapBackend, Tooltip};
use crate::surface::Document;

/// Serves canned bodies and statuses by exact URL and records every request.
/// Unknown URLs fail as network errors.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: BTreeMap<String, Result<String, u16>>,
    requests: RefCell<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(url.into(), Ok(body.into()));
        self
    }

    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.responses.insert(url.into(), Err(status));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.borrow().iter().filter(|u| *u == url).count()
    }
}

impl Fetcher for StaticFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        match self.responses.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(FetchError::Network {
                url: url.to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
struct ListItem {
    label: String,
    classes: BTreeSet<String>,
}

#[derive(Debug, Clone)]
struct Element {
    parent: Option<String>,
    generation: u64,
    html: String,
    items: Vec<ListItem>,
}

/// A flat stand-in for the DOM.
///
/// Setting markup registers every `id="..."` found in it as a child element
/// and drops the previous children. Each registration gets a fresh
/// generation, so a replaced element is distinguishable from the old one.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: RefCell<BTreeMap<String, Element>>,
    generations: Cell<u64>,
}

impl MemoryDocument {
    pub fn with_elements(ids: &[&str]) -> Self {
        let doc = Self::default();
        for id in ids {
            doc.register(id, None);
        }
        doc
    }

    fn register(&self, id: &str, parent: Option<&str>) {
        let generation = self.generations.get() + 1;
        self.generations.set(generation);
        self.elements.borrow_mut().insert(
            id.to_string(),
            Element {
                parent: parent.map(str::to_string),
                generation,
                html: String::new(),
                items: Vec::new(),
            },
        );
    }

    fn remove_descendants(&self, id: &str) {
        let mut elements = self.elements.borrow_mut();
        loop {
            let doomed: Vec<String> = elements
                .iter()
                .filter(|(_, el)| match el.parent.as_deref() {
                    Some(parent) => parent == id || !elements.contains_key(parent),
                    None => false,
                })
                .map(|(key, _)| key.clone())
                .collect();
            if doomed.is_empty() {
                break;
            }
            for key in doomed {
                elements.remove(&key);
            }
        }
    }

    /// Replaces the content area (`#app`), creating it if needed.
    pub fn set_page(&self, html: &str) {
        if !self.has_element("app") {
            self.register("app", None);
        }
        let _ = self.set_inner_html("app", html);
    }

    /// Simulates the element being swapped for a new node with the same id.
    pub fn replace_element(&self, id: &str) {
        let parent = self.elements.borrow().get(id).and_then(|el| el.parent.clone());
        self.remove_element(id);
        self.register(id, parent.as_deref());
    }

    pub fn remove_element(&self, id: &str) {
        self.remove_descendants(id);
        self.elements.borrow_mut().remove(id);
    }

    pub fn generation(&self, id: &str) -> Option<u64> {
        self.elements.borrow().get(id).map(|el| el.generation)
    }

    pub fn inner_html(&self, id: &str) -> Option<String> {
        self.elements.borrow().get(id).map(|el| el.html.clone())
    }

    pub fn list_labels(&self, id: &str) -> Vec<String> {
        self.elements
            .borrow()
            .get(id)
            .map(|el| el.items.iter().map(|i| i.label.clone()).collect())
            .unwrap_or_default()
    }

    /// Positions of the list entries under `#id` carrying `class`.
    pub fn items_with_class(&self, id: &str, class: &str) -> Vec<usize> {
        self.elements
            .borrow()
            .get(id)
            .map(|el| {
                el.items
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| item.classes.contains(class))
                    .map(|(i, _)| i)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Every `id="..."` attribute value in `html`, in order.
fn element_ids(html: &str) -> Vec<&str> {
    let mut ids = Vec::new();
    for (at, pattern) in html.match_indices("id=\"") {
        let standalone = html[..at]
            .chars()
            .next_back()
            .is_none_or(|c| c.is_whitespace());
        if !standalone {
            continue;
        }
        let rest = &html[at + pattern.len()..];
        if let Some(end) = rest.find('"') {
            ids.push(&rest[..end]);
        }
    }
    ids
}

impl Document for MemoryDocument {
    fn has_element(&self, id: &str) -> bool {
        self.elements.borrow().contains_key(id)
    }

    fn set_inner_html(&self, id: &str, html: &str) -> Result<(), SurfaceError> {
        if !self.has_element(id) {
            return Err(SurfaceError::MissingElement(id.to_string()));
        }
        self.remove_descendants(id);
        if let Some(el) = self.elements.borrow_mut().get_mut(id) {
            el.html = html.to_string();
            el.items.clear();
        }
        for child in element_ids(html) {
            self.register(child, Some(id));
        }
        Ok(())
    }

    fn render_list(&self, container_id: &str, class: &str, labels: &[String]) -> Result<(), SurfaceError> {
        let mut elements = self.elements.borrow_mut();
        let el = elements
            .get_mut(container_id)
            .ok_or_else(|| SurfaceError::MissingElement(container_id.to_string()))?;
        let classes: BTreeSet<String> = class.split_whitespace().map(str::to_string).collect();
        el.items = labels
            .iter()
            .map(|label| ListItem {
                label: label.clone(),
                classes: classes.clone(),
            })
            .collect();
        Ok(())
    }

    fn toggle_item_class(
        &self,
        container_id: &str,
        index: usize,
        class: &str,
        on: bool,
    ) -> Result<(), SurfaceError> {
        let mut elements = self.elements.borrow_mut();
        let item = elements
            .get_mut(container_id)
            .and_then(|el| el.items.get_mut(index))
            .ok_or_else(|| SurfaceError::MissingElement(format!("{container_id}[{index}]")))?;
        if on {
            item.classes.insert(class.to_string());
        } else {
            item.classes.remove(class);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct RecordedMap {
    container: String,
    generation: Option<u64>,
    tile_layers: usize,
    invalidations: usize,
    delayed: Vec<u32>,
    view: Option<(LatLon, u8)>,
}

#[derive(Debug, Clone)]
struct RecordedMarker {
    map: Id,
    tooltip: Option<String>,
}

/// Map widget fake bound to a [`MemoryDocument`]: a map stays bound to its
/// container for as long as the container keeps the generation it had at
/// creation.
pub struct RecordingMapBackend {
    document: Rc<MemoryDocument>,
    ids: IdAllocator,
    maps: BTreeMap<Id, RecordedMap>,
    markers: BTreeMap<Id, RecordedMarker>,
    removed: Vec<Id>,
    created: usize,
    pub fail_tile_layer: bool,
    pub fail_remove_map: bool,
    pub fail_add_marker: bool,
    pub fail_set_view: bool,
    pub fail_fly_to: bool,
}

impl RecordingMapBackend {
    pub fn new(document: Rc<MemoryDocument>) -> Self {
        Self {
            document,
            ids: IdAllocator::new(),
            maps: BTreeMap::new(),
            markers: BTreeMap::new(),
            removed: Vec::new(),
            created: 0,
            fail_tile_layer: false,
            fail_remove_map: false,
            fail_add_marker: false,
            fail_set_view: false,
            fail_fly_to: false,
        }
    }

    fn map_mut(&mut self, map: Id) -> Result<&mut RecordedMap, MapError> {
        self.maps.get_mut(&map).ok_or(MapError::UnknownInstance)
    }

    pub fn created_count(&self) -> usize {
        self.created
    }

    pub fn removed_maps(&self) -> Vec<Id> {
        self.removed.clone()
    }

    pub fn tile_layer_count(&self, map: Id) -> usize {
        self.maps.get(&map).map_or(0, |m| m.tile_layers)
    }

    pub fn invalidations(&self, map: Id) -> usize {
        self.maps.get(&map).map_or(0, |m| m.invalidations)
    }

    pub fn delayed_invalidations(&self, map: Id) -> Vec<u32> {
        self.maps.get(&map).map(|m| m.delayed.clone()).unwrap_or_default()
    }

    pub fn view(&self, map: Id) -> Option<(LatLon, u8)> {
        self.maps.get(&map).and_then(|m| m.view)
    }

    pub fn live_marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn marker_tooltip(&self, marker: Id) -> Option<String> {
        self.markers.get(&marker).and_then(|m| m.tooltip.clone())
    }
}

impl MapBackend for RecordingMapBackend {
    fn create_map(
        &mut self,
        container_id: &str,
        _controls: &MapControls,
        center: LatLon,
        zoom: u8,
    ) -> Result<Id, MapError> {
        let generation = self.document.generation(container_id);
        if generation.is_none() {
            return Err(MapError::MissingContainer(container_id.to_string()));
        }
        let id = self.ids.next_id();
        self.created += 1;
        self.maps.insert(
            id,
            RecordedMap {
                container: container_id.to_string(),
                generation,
                tile_layers: 0,
                invalidations: 0,
                delayed: Vec::new(),
                view: Some((center, zoom)),
            },
        );
        Ok(id)
    }

    fn add_tile_layer(&mut self, map: Id, _layer: &TileLayer) -> Result<(), MapError> {
        if self.fail_tile_layer {
            return Err(MapError::Widget("tile layer failed".to_string()));
        }
        self.map_mut(map)?.tile_layers += 1;
        Ok(())
    }

    fn is_bound_to(&self, map: Id, container_id: &str) -> bool {
        self.maps.get(&map).is_some_and(|m| {
            m.container == container_id && m.generation == self.document.generation(container_id)
        })
    }

    fn invalidate_size(&mut self, map: Id) -> Result<(), MapError> {
        self.map_mut(map)?.invalidations += 1;
        Ok(())
    }

    fn invalidate_size_after(&mut self, map: Id, delay_ms: u32) {
        if let Ok(m) = self.map_mut(map) {
            m.delayed.push(delay_ms);
        }
    }

    fn remove_map(&mut self, map: Id) -> Result<(), MapError> {
        if self.fail_remove_map {
            return Err(MapError::Widget("remove failed".to_string()));
        }
        self.maps.remove(&map).ok_or(MapError::UnknownInstance)?;
        self.markers.retain(|_, marker| marker.map != map);
        self.removed.push(map);
        Ok(())
    }

    fn add_circle_marker(
        &mut self,
        map: Id,
        _at: LatLon,
        _style: &MarkerStyle,
        tooltip: Option<&Tooltip>,
    ) -> Result<Id, MapError> {
        if self.fail_add_marker {
            return Err(MapError::Widget("marker rejected".to_string()));
        }
        self.map_mut(map)?;
        let id = self.ids.next_id();
        self.markers.insert(
            id,
            RecordedMarker {
                map,
                tooltip: tooltip.map(|t| t.html.clone()),
            },
        );
        Ok(id)
    }

    fn remove_marker(&mut self, _map: Id, marker: Id) -> Result<(), MapError> {
        self.markers.remove(&marker).map(|_| ()).ok_or(MapError::UnknownInstance)
    }

    fn set_view(&mut self, map: Id, at: LatLon, zoom: u8, _animation: &ViewAnimation) -> Result<(), MapError> {
        if self.fail_set_view {
            return Err(MapError::Widget("set_view failed".to_string()));
        }
        self.map_mut(map)?.view = Some((at, zoom));
        Ok(())
    }

    fn fly_to(&mut self, map: Id, at: LatLon, zoom: u8, _animation: &ViewAnimation) -> Result<(), MapError> {
        if self.fail_fly_to {
            return Err(MapError::Widget("fly_to failed".to_string()));
        }
        self.map_mut(map)?.view = Some((at, zoom));
        Ok(())
    }
}

/// Chart widget fake. A failed destroy leaves the chart alive.
#[derive(Debug, Default)]
pub struct RecordingChartBackend {
    ids: IdAllocator,
    live: BTreeMap<Id, (String, ChartSpec)>,
    destroyed: Vec<Id>,
    pub fail_create: bool,
    pub fail_destroy: bool,
}

impl RecordingChartBackend {
    pub fn destroyed(&self) -> Vec<Id> {
        self.destroyed.clone()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn spec(&self, chart: Id) -> Option<&ChartSpec> {
        self.live.get(&chart).map(|(_, spec)| spec)
    }
}

impl ChartBackend for RecordingChartBackend {
    fn create(&mut self, canvas_id: &str, spec: &ChartSpec) -> Result<Id, ChartError> {
        if self.fail_create {
            return Err(ChartError::MissingCanvas(canvas_id.to_string()));
        }
        let id = self.ids.next_id();
        self.live.insert(id, (canvas_id.to_string(), spec.clone()));
        Ok(id)
    }

    fn destroy(&mut self, chart: Id) -> Result<(), ChartError> {
        if self.fail_destroy {
            return Err(ChartError::Widget("destroy failed".to_string()));
        }
        self.live.remove(&chart).ok_or(ChartError::UnknownInstance)?;
        self.destroyed.push(chart);
        Ok(())
    }
}

pub type TestDashboard = Dashboard<Rc<StaticFetcher>, Rc<MemoryDocument>, RecordingMapBackend, RecordingChartBackend>;

impl Dashboard<Rc<StaticFetcher>, Rc<MemoryDocument>, RecordingMapBackend, RecordingChartBackend> {
    /// Default configuration, an empty `#app`, and [`fixtures::fetcher`].
    pub fn with_fixtures() -> Self {
        Self::with_fetcher(fixtures::fetcher())
    }

    pub fn with_fetcher(fetcher: StaticFetcher) -> Self {
        let document = Rc::new(MemoryDocument::with_elements(&["app"]));
        let maps = RecordingMapBackend::new(document.clone());
        Dashboard::new(
            DashboardConfig::default(),
            Rc::new(fetcher),
            document,
            maps,
            RecordingChartBackend::default(),
        )
    }
}

/// Small datasets and pages shaped like the shipped ones.
pub mod fixtures {
    use super::StaticFetcher;

    pub const CHART_PAGE: &str = r#"<section><div id="map" class="h-96"></div><div id="countriesList"></div></section>"#;

    pub const HOME_PAGE: &str = r#"<section>
  <canvas id="homeChart"></canvas><div id="homeSummary"></div>
  <canvas id="agePieChart"></canvas><div id="ageSummary"></div>
</section>"#;

    pub const COUNTRIES: &str = r#"[
  {"country":"Greece","depression":6.5,"anxiety":7.1,"year":2021,"coordinates":{"latitude":39.0,"longitude":22.0}},
  {"country":"Chile","depression":5.8,"anxiety":6.4,"year":2021},
  {"country":"Atlantis","depression":4.0,"anxiety":4.5,"year":2021}
]"#;

    pub const COORDINATES: &str = r#"{"Chile":{"lat":-35.6,"lon":-71.5}}"#;

    pub const SCREEN_USE: &str = r#"{"mental_health_vs_screen_use":[
  {"year":2019,"average_screen_time_hours_per_day":3.5,"mental_health_index":74},
  {"year":2020,"average_screen_time_hours_per_day":5.0,"mental_health_index":70},
  {"year":2021,"average_screen_time_hours_per_day":6.2,"mental_health_index":66}
]}"#;

    pub const AGE_GROUPS: &str = r#"{"depression_statistics":{"age_groups":[
  {"age_range":"18-25","percentage_affected":40,"source":"WHO 2022"},
  {"age_range":"26-40","percentage_affected":35},
  {"age_range":"41+","percentage_affected":25}
]}}"#;

    /// Serves both pages and all four datasets at their default paths.
    pub fn fetcher() -> StaticFetcher {
        StaticFetcher::new()
            .with_body("./pages/chart.html", CHART_PAGE)
            .with_body("./pages/home.html", HOME_PAGE)
            .with_body("./data/top_ten_countries_depression.json", COUNTRIES)
            .with_body("./data/country_coords.json", COORDINATES)
            .with_body("./data/mental_health_vs_screen_use.json", SCREEN_USE)
            .with_body("./data/age_wise_depression.json", AGE_GROUPS)
    }
}
