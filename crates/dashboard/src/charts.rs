use std::collections::BTreeMap;

use compute::BandScale;
use foundation::ids::Id;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ChartError;
use crate::outcome::{Degradation, Outcome};

/// The charting widget as seen by [`ChartRegistry`].
pub trait ChartBackend {
    /// Draws `spec` into the canvas `#canvas_id`.
    fn create(&mut self, canvas_id: &str, spec: &ChartSpec) -> Result<Id, ChartError>;

    /// Disposes a chart, releasing its canvas context.
    fn destroy(&mut self, chart: Id) -> Result<(), ChartError>;
}

/// Backend-neutral chart description.
///
/// Everything the widget needs is precomputed here (legend strings,
/// tooltip strings, center text), except tick labels: tick positions are
/// chosen by the widget, so axes carry their [`BandScale`] instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Line(LineChart),
    Doughnut(DoughnutChart),
}

impl ChartSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            ChartSpec::Line(_) => "line",
            ChartSpec::Doughnut(_) => "doughnut",
        }
    }

    pub fn to_json(&self) -> Result<String, ChartError> {
        serde_json::to_string(self).map_err(|e| ChartError::Widget(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub labels: Vec<String>,
    pub datasets: Vec<LineDataset>,
    pub x_title: String,
    pub axes: Vec<ValueAxis>,
    pub show_legend: bool,
    /// Chart.js interaction mode for tooltips.
    pub tooltip_mode: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineDataset {
    pub label: String,
    pub data: Vec<f64>,
    pub color: String,
    pub fill_color: String,
    /// Id of the [`ValueAxis`] this dataset is plotted against.
    pub axis: &'static str,
    pub tension: f64,
    pub point_radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueAxis {
    pub id: &'static str,
    /// `left` or `right`.
    pub position: &'static str,
    pub bands: BandScale,
    /// Draw grid lines across the plot area. Only one axis should.
    pub grid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoughnutChart {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
    pub border_color: String,
    pub border_width: u32,
    /// CSS-style percentage, e.g. `72%`.
    pub cutout: String,
    pub rotation: f64,
    /// Gap between slices, in pixels.
    pub offset: u32,
    pub center: CenterText,
    /// One legend entry per label, in order.
    pub legend: Vec<String>,
    pub legend_position: &'static str,
    /// One tooltip line per label, in order.
    pub tooltips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CenterText {
    pub title: String,
    pub value: String,
}

/// At most one live chart per canvas.
pub struct ChartRegistry<C> {
    backend: C,
    live: BTreeMap<String, Id>,
}

impl<C: ChartBackend> ChartRegistry<C> {
    pub fn new(backend: C) -> Self {
        Self {
            backend,
            live: BTreeMap::new(),
        }
    }

    pub fn backend(&self) -> &C {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut C {
        &mut self.backend
    }

    pub fn chart_on(&self, canvas_id: &str) -> Option<Id> {
        self.live.get(canvas_id).copied()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Disposes whatever was drawn on `canvas_id`, then draws `spec`.
    ///
    /// A failed disposal is ignored and reported as a degradation.
    pub fn replace(&mut self, canvas_id: &str, spec: &ChartSpec) -> Outcome<Id> {
        let dispose_note = self.dispose(canvas_id);

        match self.backend.create(canvas_id, spec) {
            Ok(id) => {
                debug!(canvas = canvas_id, chart = %id, kind = spec.kind(), "chart drawn");
                self.live.insert(canvas_id.to_string(), id);
                match dispose_note {
                    Some(reason) => Outcome::partial(id, reason),
                    None => Outcome::Done(id),
                }
            }
            Err(e) => {
                warn!(canvas = canvas_id, "unable to draw chart: {e}");
                Outcome::Failed(e.into())
            }
        }
    }

    /// Disposes the chart on `canvas_id`, if any.
    pub fn dispose(&mut self, canvas_id: &str) -> Option<Degradation> {
        let previous = self.live.remove(canvas_id)?;
        match self.backend.destroy(previous) {
            Ok(()) => None,
            Err(e) => {
                debug!(canvas = canvas_id, chart = %previous, "ignoring chart disposal failure: {e}");
                Some(Degradation::DisposeFailed { reason: e.to_string() })
            }
        }
    }

    pub fn dispose_all(&mut self) {
        let canvases: Vec<String> = self.live.keys().cloned().collect();
        for canvas in canvases {
            self.dispose(&canvas);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CenterText, ChartRegistry, ChartSpec, DoughnutChart};
    use crate::outcome::{Degradation, Outcome};
    use crate::testing::RecordingChartBackend;

    fn spec() -> ChartSpec {
        ChartSpec::Doughnut(DoughnutChart {
            labels: vec!["a".into()],
            values: vec![1.0],
            colors: vec!["#000".into()],
            border_color: "#fff".into(),
            border_width: 2,
            cutout: "72%".into(),
            rotation: -90.0,
            offset: 8,
            center: CenterText {
                title: "Total".into(),
                value: "1.0%".into(),
            },
            legend: vec!["a — 1%".into()],
            legend_position: "right",
            tooltips: vec!["a: 1% (100.0%)".into()],
        })
    }

    #[test]
    fn replacing_disposes_the_previous_chart() {
        let mut charts = ChartRegistry::new(RecordingChartBackend::default());
        let first = charts.replace("c", &spec()).into_value().unwrap();
        let second = charts.replace("c", &spec()).into_value().unwrap();

        assert_ne!(first, second);
        assert_eq!(charts.backend().destroyed(), vec![first]);
        assert_eq!(charts.backend().live_count(), 1);
        assert_eq!(charts.chart_on("c"), Some(second));
    }

    #[test]
    fn disposal_failure_does_not_block_redraw() {
        let mut charts = ChartRegistry::new(RecordingChartBackend::default());
        charts.replace("c", &spec());
        charts.backend_mut().fail_destroy = true;

        let out = charts.replace("c", &spec());
        assert!(matches!(out, Outcome::Degraded { value: Some(_), reason: Degradation::DisposeFailed { .. } }));
        assert_eq!(charts.live_count(), 1);
    }

    #[test]
    fn missing_canvas_fails() {
        let mut charts = ChartRegistry::new(RecordingChartBackend::default());
        charts.backend_mut().fail_create = true;
        assert!(charts.replace("c", &spec()).is_failed());
        assert_eq!(charts.chart_on("c"), None);
    }

    #[test]
    fn spec_serializes_with_kind_tag() {
        let json = spec().to_json().unwrap();
        assert!(json.starts_with(r#"{"kind":"doughnut""#));
        assert!(json.contains(r#""cutout":"72%""#));
    }
}
