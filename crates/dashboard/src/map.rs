use foundation::coords::{LatLon, finite};
use foundation::ids::Id;
use formats::CountryRecord;
use tracing::{debug, info, warn};

use crate::config::{MapControls, MapOptions, MarkerStyle, TileLayer, ViewAnimation};
use crate::error::MapError;
use crate::html;
use crate::outcome::{Degradation, Outcome};

/// Hover tooltip bound to a marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub html: String,
    pub class_name: String,
    /// Leaflet direction keyword (`top`, `bottom`, ...).
    pub direction: &'static str,
    pub permanent: bool,
}

/// The map widget as seen by [`MapSession`].
///
/// Instances are addressed by ids the backend hands out, so the session
/// never holds widget objects directly.
pub trait MapBackend {
    /// Creates a map inside `#container_id` with the given controls and view.
    fn create_map(
        &mut self,
        container_id: &str,
        controls: &MapControls,
        center: LatLon,
        zoom: u8,
    ) -> Result<Id, MapError>;

    fn add_tile_layer(&mut self, map: Id, layer: &TileLayer) -> Result<(), MapError>;

    /// Whether `map` is still rendered into the element currently carrying
    /// `container_id`. `false` once the element was replaced.
    fn is_bound_to(&self, map: Id, container_id: &str) -> bool;

    /// Re-measures the container now.
    fn invalidate_size(&mut self, map: Id) -> Result<(), MapError>;

    /// Re-measures the container after `delay_ms`. Best-effort.
    fn invalidate_size_after(&mut self, map: Id, delay_ms: u32);

    /// Tears the map down, releasing its surface and listeners.
    fn remove_map(&mut self, map: Id) -> Result<(), MapError>;

    fn add_circle_marker(
        &mut self,
        map: Id,
        at: LatLon,
        style: &MarkerStyle,
        tooltip: Option<&Tooltip>,
    ) -> Result<Id, MapError>;

    fn remove_marker(&mut self, map: Id, marker: Id) -> Result<(), MapError>;

    fn set_view(&mut self, map: Id, at: LatLon, zoom: u8, animation: &ViewAnimation) -> Result<(), MapError>;

    /// Alternative centering used when [`MapBackend::set_view`] fails.
    fn fly_to(&mut self, map: Id, at: LatLon, zoom: u8, animation: &ViewAnimation) -> Result<(), MapError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveMap {
    id: Id,
    container_id: String,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct ActiveMarker {
    id: Id,
    at: LatLon,
}

/// What [`MapSession::ensure_map`] had to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EnsureMap {
    Created(Id),
    Reused(Id),
    /// The container was replaced; the previous instance was torn down.
    Recreated { previous: Id, current: Id },
}

impl EnsureMap {
    pub fn id(&self) -> Id {
        match *self {
            EnsureMap::Created(id) | EnsureMap::Reused(id) => id,
            EnsureMap::Recreated { current, .. } => current,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerPlacement {
    pub map: Id,
    pub marker: Id,
    pub at: LatLon,
}

/// Owns the single map instance and the single marker of a dashboard.
///
/// Invariants: at most one map exists and it is bound to a live container;
/// at most one marker exists, and placing one always removes the previous.
pub struct MapSession<B> {
    backend: B,
    options: MapOptions,
    default_container: String,
    map: Option<ActiveMap>,
    marker: Option<ActiveMarker>,
}

impl<B: MapBackend> MapSession<B> {
    pub fn new(backend: B, options: MapOptions, default_container: impl Into<String>) -> Self {
        Self {
            backend,
            options,
            default_container: default_container.into(),
            map: None,
            marker: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn map_id(&self) -> Option<Id> {
        self.map.as_ref().map(|m| m.id)
    }

    pub fn marker(&self) -> Option<Id> {
        self.marker.map(|m| m.id)
    }

    pub fn marker_position(&self) -> Option<LatLon> {
        self.marker.map(|m| m.at)
    }

    /// Returns a map bound to `#container_id`, creating or re-creating it as
    /// needed.
    pub fn ensure_map(&mut self, container_id: &str) -> Outcome<EnsureMap> {
        let mut teardown_note = None;

        if let Some(active) = self.map.take() {
            if active.container_id == container_id && self.backend.is_bound_to(active.id, container_id) {
                if let Err(e) = self.backend.invalidate_size(active.id) {
                    debug!(map = %active.id, "ignoring re-measure failure: {e}");
                }
                let id = active.id;
                self.map = Some(active);
                return Outcome::Done(EnsureMap::Reused(id));
            }

            // The DOM under the old map was replaced: release it before
            // building a new one. The marker died with it.
            info!(map = %active.id, container = %active.container_id, "tearing down detached map");
            self.marker = None;
            if let Err(e) = self.backend.remove_map(active.id) {
                warn!(map = %active.id, "ignoring map teardown failure: {e}");
                teardown_note = Some(Degradation::DisposeFailed { reason: e.to_string() });
            }

            return match self.create(container_id) {
                Ok(current) => {
                    let ensured = EnsureMap::Recreated {
                        previous: active.id,
                        current,
                    };
                    match teardown_note {
                        Some(reason) => Outcome::partial(ensured, reason),
                        None => Outcome::Done(ensured),
                    }
                }
                Err(e) => Outcome::Failed(e.into()),
            };
        }

        match self.create(container_id) {
            Ok(id) => Outcome::Done(EnsureMap::Created(id)),
            Err(e) => Outcome::Failed(e.into()),
        }
    }

    fn create(&mut self, container_id: &str) -> Result<Id, MapError> {
        let [lat, lon] = self.options.center;
        let center = LatLon::new(lat, lon).unwrap_or_default();
        let id = self
            .backend
            .create_map(container_id, &self.options.controls, center, self.options.zoom)?;
        if let Err(e) = self.backend.add_tile_layer(id, &self.options.tile_layer) {
            // A map without tiles is useless; don't leave it behind.
            if let Err(cleanup) = self.backend.remove_map(id) {
                warn!(map = %id, "unable to remove map after tile layer failure: {cleanup}");
            }
            return Err(e);
        }
        // Tiles mis-render when measured before the container has its final size.
        self.backend.invalidate_size_after(id, self.options.settle_delay_ms);
        debug!(map = %id, container = container_id, "created map");
        self.map = Some(ActiveMap {
            id,
            container_id: container_id.to_string(),
        });
        Ok(id)
    }

    /// Places the single marker.
    ///
    /// Explicit finite `lat`/`lon` win per component; the record's
    /// normalized coordinates fill the gaps. Without a full pair nothing is
    /// placed and the outcome is degraded.
    pub fn place_marker(
        &mut self,
        lat: Option<f64>,
        lon: Option<f64>,
        record: Option<&CountryRecord>,
    ) -> Outcome<MarkerPlacement> {
        let container = match &self.map {
            Some(active) => active.container_id.clone(),
            None => self.default_container.clone(),
        };
        let map = match self.ensure_map(&container) {
            Outcome::Failed(e) => return Outcome::Failed(e),
            ensured => match ensured.into_value() {
                Some(e) => e.id(),
                None => return Outcome::skipped(Degradation::MissingTarget { id: container }),
            },
        };

        self.clear_marker();

        let embedded = record.and_then(|r| r.coordinates);
        let lat = lat.and_then(finite).or(embedded.map(|c| c.lat));
        let lon = lon.and_then(finite).or(embedded.map(|c| c.lon));
        let Some(at) = LatLon::from_parts(lat, lon) else {
            let country = record.map(|r| r.country.clone());
            warn!(country = country.as_deref().unwrap_or("-"), "no valid coordinates; marker skipped");
            return Outcome::skipped(Degradation::NoCoordinates { country });
        };

        let tooltip = record.map(|r| Tooltip {
            html: html::country_tooltip(r),
            class_name: self.options.tooltip_class.clone(),
            direction: "top",
            permanent: false,
        });
        let marker = match self
            .backend
            .add_circle_marker(map, at, &self.options.marker, tooltip.as_ref())
        {
            Ok(id) => id,
            Err(e) => {
                warn!(map = %map, "unable to add marker: {e}");
                return Outcome::Failed(e.into());
            }
        };
        self.marker = Some(ActiveMarker { id: marker, at });

        let placement = MarkerPlacement { map, marker, at };
        match self.recenter(map, at) {
            None => Outcome::Done(placement),
            Some(reason) => Outcome::partial(placement, reason),
        }
    }

    /// Centers on `at`, falling back to `fly_to`. Never propagates failure.
    fn recenter(&mut self, map: Id, at: LatLon) -> Option<Degradation> {
        let zoom = self.options.marker_zoom;
        let animation = self.options.animation.clone();
        let delay = self.options.recenter_delay_ms;

        let primary = match self.backend.set_view(map, at, zoom, &animation) {
            Ok(()) => {
                self.backend.invalidate_size_after(map, delay);
                return None;
            }
            Err(e) => e,
        };
        match self.backend.fly_to(map, at, zoom, &animation) {
            Ok(()) => {
                self.backend.invalidate_size_after(map, delay);
                debug!(map = %map, "set_view failed, used fly_to: {primary}");
                Some(Degradation::RecenterFallback {
                    reason: primary.to_string(),
                })
            }
            Err(fallback) => {
                warn!(map = %map, "failed to center map: {primary}; fallback: {fallback}");
                Some(Degradation::RecenterFailed {
                    reason: fallback.to_string(),
                })
            }
        }
    }

    /// Removes the current marker if any. Returns whether one was removed.
    pub fn clear_marker(&mut self) -> bool {
        let Some(marker) = self.marker.take() else {
            return false;
        };
        if let Some(map) = self.map_id() {
            if let Err(e) = self.backend.remove_marker(map, marker.id) {
                debug!(marker = %marker.id, "ignoring marker removal failure: {e}");
            }
        }
        true
    }

    /// Releases the map and marker, e.g. when the dashboard shuts down.
    pub fn teardown(&mut self) -> Outcome<()> {
        self.clear_marker();
        let Some(active) = self.map.take() else {
            return Outcome::Done(());
        };
        match self.backend.remove_map(active.id) {
            Ok(()) => Outcome::Done(()),
            Err(e) => Outcome::partial((), Degradation::DisposeFailed { reason: e.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EnsureMap, MapSession};
    use crate::config::MapOptions;
    use crate::error::{DashboardError, MapError};
    use crate::outcome::{Degradation, Outcome};
    use crate::testing::{MemoryDocument, RecordingMapBackend};
    use foundation::coords::LatLon;
    use formats::CountryRecord;
    use std::rc::Rc;

    fn session() -> (Rc<MemoryDocument>, MapSession<RecordingMapBackend>) {
        let doc = Rc::new(MemoryDocument::with_elements(&["map"]));
        let backend = RecordingMapBackend::new(doc.clone());
        (doc, MapSession::new(backend, MapOptions::default(), "map"))
    }

    #[test]
    fn ensure_map_reuses_instance_on_same_container() {
        let (_doc, mut maps) = session();
        let first = maps.ensure_map("map");
        let second = maps.ensure_map("map");

        let Outcome::Done(EnsureMap::Created(a)) = first else {
            panic!("expected creation, got {first:?}");
        };
        assert_eq!(second, Outcome::Done(EnsureMap::Reused(a)));
        assert_eq!(maps.backend().tile_layer_count(a), 1);
        assert_eq!(maps.backend().created_count(), 1);
        assert_eq!(maps.backend().invalidations(a), 1);
        assert_eq!(maps.backend().delayed_invalidations(a), vec![200]);
    }

    #[test]
    fn ensure_map_recreates_after_container_replacement() {
        let (doc, mut maps) = session();
        let a = maps.ensure_map("map").into_value().unwrap().id();
        doc.replace_element("map");

        let out = maps.ensure_map("map");
        let Outcome::Done(EnsureMap::Recreated { previous, current }) = out else {
            panic!("expected re-creation, got {out:?}");
        };
        assert_eq!(previous, a);
        assert_ne!(current, a);
        assert_eq!(maps.backend().removed_maps(), vec![a]);

        // Same container again: reused, old instance not torn down twice.
        assert_eq!(maps.ensure_map("map"), Outcome::Done(EnsureMap::Reused(current)));
        assert_eq!(maps.backend().removed_maps(), vec![a]);
    }

    #[test]
    fn teardown_failure_is_swallowed() {
        let (doc, mut maps) = session();
        maps.ensure_map("map");
        doc.replace_element("map");
        maps.backend_mut().fail_remove_map = true;

        let out = maps.ensure_map("map");
        assert!(matches!(out.degradation(), Some(Degradation::DisposeFailed { .. })));
        assert!(matches!(out.value(), Some(EnsureMap::Recreated { .. })));
    }

    #[test]
    fn tile_layer_failure_removes_the_half_built_map() {
        let (_doc, mut maps) = session();
        maps.backend_mut().fail_tile_layer = true;

        let out = maps.ensure_map("map");
        assert!(out.is_failed(), "{out:?}");
        assert_eq!(maps.map_id(), None);
        assert_eq!(maps.backend().created_count(), 1);
        assert_eq!(maps.backend().removed_maps().len(), 1);
    }

    #[test]
    fn tile_layer_error_wins_over_cleanup_error() {
        let (_doc, mut maps) = session();
        maps.backend_mut().fail_tile_layer = true;
        maps.backend_mut().fail_remove_map = true;

        let out = maps.ensure_map("map");
        assert!(
            matches!(
                &out,
                Outcome::Failed(DashboardError::Map(MapError::Widget(msg))) if msg == "tile layer failed"
            ),
            "{out:?}"
        );
        assert_eq!(maps.map_id(), None);
    }

    #[test]
    fn missing_container_fails_without_state() {
        let (doc, mut maps) = session();
        doc.remove_element("map");
        assert!(maps.ensure_map("map").is_failed());
        assert_eq!(maps.map_id(), None);
    }

    #[test]
    fn placing_twice_leaves_one_marker_at_second_position() {
        let (_doc, mut maps) = session();
        maps.place_marker(Some(10.0), Some(20.0), None);
        let out = maps.place_marker(Some(-5.0), Some(7.5), None);

        let placed = out.value().copied().unwrap();
        assert_eq!(placed.at, LatLon::new(-5.0, 7.5).unwrap());
        assert_eq!(maps.backend().live_marker_count(), 1);
        assert_eq!(maps.marker_position(), LatLon::new(-5.0, 7.5));
        assert_eq!(maps.backend().view(placed.map), Some((placed.at, 5)));
    }

    #[test]
    fn record_coordinates_fill_missing_arguments() {
        let (_doc, mut maps) = session();
        let record = CountryRecord::new("Chile", 5.0, 6.0, 2020).with_coordinates(LatLon::new(-35.6, -71.5).unwrap());

        let out = maps.place_marker(Some(f64::NAN), None, Some(&record));
        assert_eq!(out.value().map(|p| p.at), LatLon::new(-35.6, -71.5));

        let out = maps.place_marker(Some(1.0), None, Some(&record));
        assert_eq!(out.value().map(|p| p.at), LatLon::new(1.0, -71.5));

        let tooltip = maps.backend().marker_tooltip(out.value().unwrap().marker).unwrap();
        assert!(tooltip.contains("Chile"));
    }

    #[test]
    fn missing_coordinates_skip_and_clear_marker() {
        let (_doc, mut maps) = session();
        maps.place_marker(Some(1.0), Some(2.0), None);

        let record = CountryRecord::new("Atlantis", 1.0, 1.0, 2000);
        let out = maps.place_marker(None, None, Some(&record));
        assert_eq!(
            out,
            Outcome::skipped(Degradation::NoCoordinates {
                country: Some("Atlantis".to_string())
            })
        );
        assert_eq!(maps.marker(), None);
        assert_eq!(maps.backend().live_marker_count(), 0);
    }

    #[test]
    fn recenter_falls_back_then_gives_up_quietly() {
        let (_doc, mut maps) = session();
        maps.backend_mut().fail_set_view = true;
        let out = maps.place_marker(Some(1.0), Some(2.0), None);
        assert!(matches!(out.degradation(), Some(Degradation::RecenterFallback { .. })));
        assert!(out.value().is_some());

        maps.backend_mut().fail_fly_to = true;
        let out = maps.place_marker(Some(3.0), Some(4.0), None);
        assert!(matches!(out.degradation(), Some(Degradation::RecenterFailed { .. })));
        assert_eq!(maps.backend().live_marker_count(), 1);
    }

    #[test]
    fn failed_marker_add_is_reported() {
        let (_doc, mut maps) = session();
        maps.backend_mut().fail_add_marker = true;
        assert!(maps.place_marker(Some(1.0), Some(2.0), None).is_failed());
        assert_eq!(maps.marker(), None);
    }

    #[test]
    fn clear_marker_is_idempotent() {
        let (_doc, mut maps) = session();
        maps.place_marker(Some(1.0), Some(2.0), None);
        assert!(maps.clear_marker());
        assert!(!maps.clear_marker());
        assert_eq!(maps.backend().live_marker_count(), 0);
    }

    #[test]
    fn teardown_releases_everything() {
        let (_doc, mut maps) = session();
        let placed = maps.place_marker(Some(1.0), Some(2.0), None).into_value().unwrap();
        assert!(maps.teardown().is_done());
        assert_eq!(maps.map_id(), None);
        assert_eq!(maps.backend().removed_maps(), vec![placed.map]);
    }
}
