use dashboard::config::{MapControls, MarkerStyle, TileLayer, ViewAnimation};
use dashboard::{ChartBackend, ChartError, ChartSpec, MapBackend, MapError, Tooltip};
use foundation::coords::LatLon;
use foundation::ids::{Id, IdAllocator};
use serde_json::json;
use wasm_bindgen::prelude::*;

// Leaflet (`L`) and Chart.js (`Chart`) are loaded by the page. Instances stay
// on the JS side, keyed by the ids handed out from Rust.
#[wasm_bindgen(inline_js = "
const maps = new Map();
const markers = new Map();
const charts = new Map();

function lookupMap(id) {
    const m = maps.get(id);
    if (!m) throw new Error('unknown map ' + id);
    return m;
}

export function dash_map_create(id, containerId, optionsJson) {
    const el = document.getElementById(containerId);
    if (!el) throw new Error('map container #' + containerId + ' not found');
    const o = JSON.parse(optionsJson);
    const map = L.map(el, {
        zoomControl: o.controls.zoom_control,
        attributionControl: o.controls.attribution_control,
        scrollWheelZoom: o.controls.scroll_wheel_zoom,
        doubleClickZoom: o.controls.double_click_zoom,
        boxZoom: o.controls.box_zoom,
        dragging: o.controls.dragging,
    }).setView([o.lat, o.lon], o.zoom);
    maps.set(id, { map, el });
}

export function dash_map_tile_layer(id, layerJson) {
    const l = JSON.parse(layerJson);
    L.tileLayer(l.url, {
        attribution: l.attribution,
        subdomains: l.subdomains,
        detectRetina: l.detect_retina,
    }).addTo(lookupMap(id).map);
}

export function dash_map_bound_to(id, containerId) {
    const m = maps.get(id);
    return !!m && m.el.isConnected && document.getElementById(containerId) === m.el;
}

export function dash_map_invalidate(id) {
    lookupMap(id).map.invalidateSize();
}

export function dash_map_invalidate_after(id, delayMs) {
    setTimeout(() => {
        const m = maps.get(id);
        if (m) {
            try { m.map.invalidateSize(); } catch (e) { /* container gone */ }
        }
    }, delayMs);
}

export function dash_map_remove(id) {
    const m = lookupMap(id);
    maps.delete(id);
    m.map.remove();
}

export function dash_marker_add(mapId, markerId, lat, lon, styleJson, tooltipHtml, tooltipClass, direction, permanent) {
    const s = JSON.parse(styleJson);
    const marker = L.circleMarker([lat, lon], {
        radius: s.radius,
        color: s.color,
        weight: s.weight,
        fillColor: s.fill_color,
        fillOpacity: s.fill_opacity,
    });
    if (tooltipHtml != null) {
        marker.bindTooltip(tooltipHtml, { direction, permanent, className: tooltipClass });
    }
    marker.addTo(lookupMap(mapId).map);
    markers.set(markerId, marker);
}

export function dash_marker_remove(mapId, markerId) {
    const marker = markers.get(markerId);
    markers.delete(markerId);
    if (!marker) throw new Error('unknown marker ' + markerId);
    lookupMap(mapId).map.removeLayer(marker);
}

export function dash_map_set_view(id, lat, lon, zoom, animate, duration) {
    lookupMap(id).map.setView([lat, lon], zoom, { animate, duration });
}

export function dash_map_fly_to(id, lat, lon, zoom, animate, duration) {
    lookupMap(id).map.flyTo([lat, lon], zoom, { animate, duration });
}

function bandLabel(scale, value) {
    for (const b of scale.bands) {
        if (b.inclusive ? value >= b.threshold : value > b.threshold) return b.label;
    }
    return scale.fallback;
}

function lineConfig(spec) {
    const scales = {
        x: {
            grid: { display: false, drawBorder: false },
            ticks: { color: '#6b7280' },
            title: { display: true, text: spec.x_title, color: '#6b7280' },
        },
    };
    for (const axis of spec.axes) {
        scales[axis.id] = {
            type: 'linear',
            position: axis.position,
            grid: axis.grid ? { color: 'rgba(15,23,42,0.06)', drawBorder: false } : { display: false, drawBorder: false },
            ticks: { color: '#6b7280', maxTicksLimit: 5, callback: (v) => bandLabel(axis.bands, v) },
        };
    }
    return {
        type: 'line',
        data: {
            labels: spec.labels,
            datasets: spec.datasets.map((d) => ({
                label: d.label,
                data: d.data,
                borderColor: d.color,
                backgroundColor: d.fill_color,
                yAxisID: d.axis,
                tension: d.tension,
                pointRadius: d.point_radius,
                pointHoverRadius: d.point_radius + 2,
                fill: false,
            })),
        },
        options: {
            responsive: true,
            maintainAspectRatio: false,
            interaction: { mode: spec.tooltip_mode, intersect: false },
            plugins: {
                legend: { display: spec.show_legend },
                tooltip: { enabled: true, displayColors: false },
            },
            scales,
        },
    };
}

function doughnutConfig(spec) {
    const centerText = {
        id: 'centerText',
        afterDraw(chart) {
            const { ctx, chartArea: { left, top, width, height } } = chart;
            const x = left + width / 2;
            const y = top + height / 2;
            ctx.save();
            ctx.fillStyle = '#374151';
            ctx.textAlign = 'center';
            ctx.textBaseline = 'middle';
            ctx.font = '600 14px ui-sans-serif, system-ui, sans-serif';
            ctx.fillText(spec.center.title, x, y - 8);
            ctx.font = '700 18px ui-sans-serif, system-ui, sans-serif';
            ctx.fillText(spec.center.value, x, y + 12);
            ctx.restore();
        },
    };
    return {
        type: 'doughnut',
        data: {
            labels: spec.labels,
            datasets: [{
                data: spec.values,
                backgroundColor: spec.colors,
                borderColor: spec.border_color,
                borderWidth: spec.border_width,
                offset: spec.offset,
            }],
        },
        options: {
            responsive: true,
            maintainAspectRatio: false,
            cutout: spec.cutout,
            rotation: spec.rotation,
            plugins: {
                legend: {
                    position: spec.legend_position,
                    align: 'center',
                    labels: {
                        color: '#374151',
                        usePointStyle: true,
                        pointStyle: 'circle',
                        boxWidth: 10,
                        padding: 12,
                        generateLabels: () => spec.legend.map((text, i) => ({
                            text,
                            fillStyle: spec.colors[i],
                            hidden: false,
                            index: i,
                        })),
                    },
                },
                tooltip: {
                    enabled: true,
                    callbacks: { label: (ctx) => spec.tooltips[ctx.dataIndex] },
                },
            },
        },
        plugins: [centerText],
    };
}

export function dash_chart_create(id, canvasId, specJson) {
    const canvas = document.getElementById(canvasId);
    if (!canvas) throw new Error('canvas #' + canvasId + ' not found');
    const spec = JSON.parse(specJson);
    const config = spec.kind === 'line' ? lineConfig(spec) : doughnutConfig(spec);
    charts.set(id, new Chart(canvas.getContext('2d'), config));
}

export function dash_chart_destroy(id) {
    const chart = charts.get(id);
    charts.delete(id);
    if (!chart) throw new Error('unknown chart ' + id);
    chart.destroy();
}
")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn dash_map_create(id: u32, container_id: &str, options_json: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn dash_map_tile_layer(id: u32, layer_json: &str) -> Result<(), JsValue>;

    fn dash_map_bound_to(id: u32, container_id: &str) -> bool;

    #[wasm_bindgen(catch)]
    fn dash_map_invalidate(id: u32) -> Result<(), JsValue>;

    fn dash_map_invalidate_after(id: u32, delay_ms: u32);

    #[wasm_bindgen(catch)]
    fn dash_map_remove(id: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn dash_marker_add(
        map_id: u32,
        marker_id: u32,
        lat: f64,
        lon: f64,
        style_json: &str,
        tooltip_html: Option<String>,
        tooltip_class: &str,
        direction: &str,
        permanent: bool,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn dash_marker_remove(map_id: u32, marker_id: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn dash_map_set_view(id: u32, lat: f64, lon: f64, zoom: u8, animate: bool, duration: f64) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn dash_map_fly_to(id: u32, lat: f64, lon: f64, zoom: u8, animate: bool, duration: f64) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn dash_chart_create(id: u32, canvas_id: &str, spec_json: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn dash_chart_destroy(id: u32) -> Result<(), JsValue>;
}

fn js_message(e: &JsValue) -> String {
    e.as_string()
        .or_else(|| js_sys::Error::from(e.clone()).message().as_string())
        .unwrap_or_else(|| format!("{e:?}"))
}

fn map_err(e: JsValue) -> MapError {
    MapError::Widget(js_message(&e))
}

fn chart_err(e: JsValue) -> ChartError {
    ChartError::Widget(js_message(&e))
}

// JS numbers hold ids comfortably below 2^32 for a page session.
fn js_id(id: Id) -> u32 {
    id.raw() as u32
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, MapError> {
    serde_json::to_string(value).map_err(|e| MapError::Widget(e.to_string()))
}

/// Leaflet through `inline_js`.
#[derive(Default)]
pub struct LeafletBackend {
    ids: IdAllocator,
}

impl MapBackend for LeafletBackend {
    fn create_map(
        &mut self,
        container_id: &str,
        controls: &MapControls,
        center: LatLon,
        zoom: u8,
    ) -> Result<Id, MapError> {
        let id = self.ids.next_id();
        let options = json!({
            "controls": controls,
            "lat": center.lat,
            "lon": center.lon,
            "zoom": zoom,
        });
        dash_map_create(js_id(id), container_id, &options.to_string()).map_err(|e| {
            if js_message(&e).contains("not found") {
                MapError::MissingContainer(container_id.to_string())
            } else {
                map_err(e)
            }
        })?;
        Ok(id)
    }

    fn add_tile_layer(&mut self, map: Id, layer: &TileLayer) -> Result<(), MapError> {
        dash_map_tile_layer(js_id(map), &to_json(layer)?).map_err(map_err)
    }

    fn is_bound_to(&self, map: Id, container_id: &str) -> bool {
        dash_map_bound_to(js_id(map), container_id)
    }

    fn invalidate_size(&mut self, map: Id) -> Result<(), MapError> {
        dash_map_invalidate(js_id(map)).map_err(map_err)
    }

    fn invalidate_size_after(&mut self, map: Id, delay_ms: u32) {
        dash_map_invalidate_after(js_id(map), delay_ms);
    }

    fn remove_map(&mut self, map: Id) -> Result<(), MapError> {
        dash_map_remove(js_id(map)).map_err(map_err)
    }

    fn add_circle_marker(
        &mut self,
        map: Id,
        at: LatLon,
        style: &MarkerStyle,
        tooltip: Option<&Tooltip>,
    ) -> Result<Id, MapError> {
        let id = self.ids.next_id();
        dash_marker_add(
            js_id(map),
            js_id(id),
            at.lat,
            at.lon,
            &to_json(style)?,
            tooltip.map(|t| t.html.clone()),
            tooltip.map_or("", |t| t.class_name.as_str()),
            tooltip.map_or("top", |t| t.direction),
            tooltip.is_some_and(|t| t.permanent),
        )
        .map_err(map_err)?;
        Ok(id)
    }

    fn remove_marker(&mut self, map: Id, marker: Id) -> Result<(), MapError> {
        dash_marker_remove(js_id(map), js_id(marker)).map_err(map_err)
    }

    fn set_view(&mut self, map: Id, at: LatLon, zoom: u8, animation: &ViewAnimation) -> Result<(), MapError> {
        dash_map_set_view(js_id(map), at.lat, at.lon, zoom, animation.animate, animation.duration_s).map_err(map_err)
    }

    fn fly_to(&mut self, map: Id, at: LatLon, zoom: u8, animation: &ViewAnimation) -> Result<(), MapError> {
        dash_map_fly_to(js_id(map), at.lat, at.lon, zoom, animation.animate, animation.duration_s).map_err(map_err)
    }
}

/// Chart.js through `inline_js`.
#[derive(Default)]
pub struct ChartJsBackend {
    ids: IdAllocator,
}

impl ChartBackend for ChartJsBackend {
    fn create(&mut self, canvas_id: &str, spec: &ChartSpec) -> Result<Id, ChartError> {
        let id = self.ids.next_id();
        dash_chart_create(js_id(id), canvas_id, &spec.to_json()?).map_err(chart_err)?;
        Ok(id)
    }

    fn destroy(&mut self, chart: Id) -> Result<(), ChartError> {
        dash_chart_destroy(js_id(chart)).map_err(chart_err)
    }
}
