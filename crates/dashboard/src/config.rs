use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DashboardError;

const MAX_ZOOM: u8 = 20;

/// Everything the dashboard needs to know about its page and data.
///
/// All fields have defaults matching the shipped `index.html`, `pages/` and
/// `data/` layout, so an empty JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Element whose markup is replaced on navigation.
    pub content_id: String,
    /// Directory holding `<page>.html` fragments.
    pub pages_dir: String,
    /// Page shown when the fragment is empty.
    pub default_page: String,
    pub data: DataPaths,
    pub elements: ElementIds,
    pub map: MapOptions,
    /// Remote geocoder search endpoint (never used while rendering).
    pub geocoder_url: String,
    /// `tracing` filter directive for the front ends.
    pub log_level: String,
    /// How many diagnostics are kept in memory.
    pub diagnostics_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            content_id: "app".to_string(),
            pages_dir: "./pages".to_string(),
            default_page: "chart".to_string(),
            data: DataPaths::default(),
            elements: ElementIds::default(),
            map: MapOptions::default(),
            geocoder_url: "https://nominatim.openstreetmap.org/search".to_string(),
            log_level: "info".to_string(),
            diagnostics_capacity: 256,
        }
    }
}

impl DashboardConfig {
    /// Parses a JSON object of overrides.
    ///
    /// Only objects are accepted: serde would otherwise read `[]` as a
    /// sequence of zero fields and fill in every default.
    pub fn from_json_str(text: &str) -> Result<Self, DashboardError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| DashboardError::Config(e.to_string()))?;
        if !value.is_object() {
            return Err(DashboardError::Config("configuration must be a JSON object".to_string()));
        }
        let config: Self =
            serde_json::from_value(value).map_err(|e| DashboardError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.content_id.trim().is_empty() {
            return Err(DashboardError::Config("content_id must not be empty".to_string()));
        }
        if self.default_page.trim().is_empty() {
            return Err(DashboardError::Config("default_page must not be empty".to_string()));
        }
        if self.map.zoom > MAX_ZOOM || self.map.marker_zoom > MAX_ZOOM {
            return Err(DashboardError::Config("map zoom levels must be within 0..=20".to_string()));
        }
        if !(self.map.marker.radius.is_finite() && self.map.marker.radius > 0.0) {
            return Err(DashboardError::Config("marker radius must be positive".to_string()));
        }
        Ok(())
    }

    pub fn page_url(&self, page: &str) -> String {
        format!("{}/{page}.html", self.pages_dir.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub countries: String,
    pub coordinates: String,
    pub screen_use: String,
    pub age_groups: String,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            countries: "./data/top_ten_countries_depression.json".to_string(),
            coordinates: "./data/country_coords.json".to_string(),
            screen_use: "./data/mental_health_vs_screen_use.json".to_string(),
            age_groups: "./data/age_wise_depression.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub map: String,
    pub countries_list: String,
    pub home_chart: String,
    pub home_summary: String,
    pub age_chart: String,
    pub age_summary: String,
    /// Class carried by every country list entry.
    pub country_item_class: String,
    /// Class marking the selected country entry.
    pub selected_class: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            map: "map".to_string(),
            countries_list: "countriesList".to_string(),
            home_chart: "homeChart".to_string(),
            home_summary: "homeSummary".to_string(),
            age_chart: "agePieChart".to_string(),
            age_summary: "ageSummary".to_string(),
            country_item_class: "country-item p-3 rounded-lg border border-gray-200".to_string(),
            selected_class: "bg-blue-100".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileLayer {
    pub url: String,
    pub attribution: String,
    pub subdomains: String,
    pub detect_retina: bool,
}

impl Default for TileLayer {
    /// CartoDB Positron, a light basemap.
    fn default() -> Self {
        Self {
            url: "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png".to_string(),
            attribution: "© OpenStreetMap contributors © CARTO".to_string(),
            subdomains: "abcd".to_string(),
            detect_retina: true,
        }
    }
}

/// Interaction controls. The defaults keep the map from hijacking page
/// scrolling inside the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapControls {
    pub zoom_control: bool,
    pub attribution_control: bool,
    pub scroll_wheel_zoom: bool,
    pub double_click_zoom: bool,
    pub box_zoom: bool,
    pub dragging: bool,
}

impl Default for MapControls {
    fn default() -> Self {
        Self {
            zoom_control: true,
            attribution_control: false,
            scroll_wheel_zoom: false,
            double_click_zoom: false,
            box_zoom: false,
            dragging: true,
        }
    }
}

/// Fixed-radius point marker style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    pub radius: f64,
    pub color: String,
    pub weight: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius: 6.0,
            color: "#2563eb".to_string(),
            weight: 1.0,
            fill_color: "#2563eb".to_string(),
            fill_opacity: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewAnimation {
    pub animate: bool,
    pub duration_s: f64,
}

impl Default for ViewAnimation {
    fn default() -> Self {
        Self {
            animate: true,
            duration_s: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// `[lat, lon]` of the initial view.
    pub center: [f64; 2],
    pub zoom: u8,
    pub tile_layer: TileLayer,
    pub controls: MapControls,
    pub marker: MarkerStyle,
    /// Zoom used when centering on a marker.
    pub marker_zoom: u8,
    pub animation: ViewAnimation,
    /// Delay before re-measuring a freshly created map.
    pub settle_delay_ms: u32,
    /// Delay before re-measuring after re-centering.
    pub recenter_delay_ms: u32,
    pub tooltip_class: String,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0],
            zoom: 2,
            tile_layer: TileLayer::default(),
            controls: MapControls::default(),
            marker: MarkerStyle::default(),
            marker_zoom: 5,
            animation: ViewAnimation::default(),
            settle_delay_ms: 200,
            recenter_delay_ms: 250,
            tooltip_class: "bg-white shadow-lg rounded px-2 py-1".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DashboardConfig;
    use crate::error::DashboardError;

    #[test]
    fn empty_object_yields_defaults() {
        let config = DashboardConfig::from_json_str("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.page_url("home"), "./pages/home.html");
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let config = DashboardConfig::from_json_str(
            r#"{"pages_dir":"/static/pages/","map":{"marker_zoom":7}}"#,
        )
        .unwrap();
        assert_eq!(config.page_url("chart"), "/static/pages/chart.html");
        assert_eq!(config.map.marker_zoom, 7);
        assert_eq!(config.map.zoom, 2);
        assert_eq!(config.elements.map, "map");
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(DashboardConfig::from_json_str(r#"{"content_id":" "}"#).is_err());
        assert!(DashboardConfig::from_json_str(r#"{"map":{"zoom":40}}"#).is_err());
        assert!(DashboardConfig::from_json_str("[]").is_err());
    }

    #[test]
    fn rejects_non_object_documents() {
        for text in ["[]", "[\"app\"]", "null", "3", "\"app\""] {
            let err = DashboardConfig::from_json_str(text).unwrap_err();
            assert!(matches!(err, DashboardError::Config(_)), "{text}: {err}");
        }
    }

    #[test]
    fn rejects_non_finite_marker_radius() {
        let mut config = DashboardConfig::default();
        config.map.marker.radius = f64::NAN;
        assert!(config.validate().is_err());
        config.map.marker.radius = f64::INFINITY;
        assert!(config.validate().is_err());
        config.map.marker.radius = 6.0;
        assert!(config.validate().is_ok());
    }
}
