use compute::{BandScale, TimeSeriesSummary};
use foundation::ids::Id;
use formats::ScreenUseDataset;
use runtime::NavToken;
use tracing::{debug, error, warn};

use crate::charts::{ChartBackend, ChartSpec, LineChart, LineDataset, ValueAxis};
use crate::dashboard::Dashboard;
use crate::fetch::{Fetcher, fetch_dataset};
use crate::html;
use crate::map::MapBackend;
use crate::outcome::{Degradation, Outcome};
use crate::surface::Document;

const SCREEN_COLOR: &str = "#ef4444";
const SCREEN_FILL: &str = "rgba(239,68,68,0.06)";
const INDEX_COLOR: &str = "#2563eb";
const INDEX_FILL: &str = "rgba(37,99,235,0.04)";

/// Screen time on the right axis, mental-health index on the left, both
/// axes labelled with qualitative bands.
pub fn line_chart(dataset: &ScreenUseDataset) -> ChartSpec {
    let series = |label: &str, data: Vec<f64>, color: &str, fill: &str, axis: &'static str| LineDataset {
        label: label.to_string(),
        data,
        color: color.to_string(),
        fill_color: fill.to_string(),
        axis,
        tension: 0.3,
        point_radius: 3.0,
    };

    ChartSpec::Line(LineChart {
        labels: dataset.year_labels(),
        datasets: vec![
            series(
                "Screen time (hrs/day)",
                dataset.screen_time().values(),
                SCREEN_COLOR,
                SCREEN_FILL,
                "y1",
            ),
            series(
                "Mental health index",
                dataset.mental_health().values(),
                INDEX_COLOR,
                INDEX_FILL,
                "y",
            ),
        ],
        x_title: "Year".to_string(),
        axes: vec![
            ValueAxis {
                id: "y",
                position: "left",
                bands: BandScale::mental_health_index(),
                grid: true,
            },
            ValueAxis {
                id: "y1",
                position: "right",
                bands: BandScale::screen_time(),
                grid: false,
            },
        ],
        show_legend: false,
        tooltip_mode: "index",
    })
}

impl<F, D, M, C> Dashboard<F, D, M, C>
where
    F: Fetcher,
    D: Document,
    M: MapBackend,
    C: ChartBackend,
{
    /// Draws the dual-axis chart on `target_id` and writes its narrative
    /// into the configured summary element.
    pub async fn render_time_series(&self, target_id: &str, json_path: &str, token: NavToken) -> Outcome<Id> {
        if !self.document.has_element(target_id) {
            debug!(target = target_id, "time series canvas missing");
            return Outcome::skipped(Degradation::MissingTarget {
                id: target_id.to_string(),
            });
        }

        let dataset = match fetch_dataset(&self.fetcher, json_path, ScreenUseDataset::parse).await {
            Ok(dataset) => dataset,
            Err(e) => {
                error!(url = json_path, "time series unavailable: {e}");
                return Outcome::Failed(e);
            }
        };
        if self.is_stale(token) {
            return Outcome::skipped(Degradation::Stale);
        }

        let drawn = self.charts.borrow_mut().replace(target_id, &line_chart(&dataset));
        if drawn.value().is_none() {
            return drawn;
        }

        let Some(summary) = TimeSeriesSummary::new(&dataset.screen_time(), &dataset.mental_health()) else {
            warn!(url = json_path, "no years to summarize");
            return drawn.degrade(Degradation::EmptyDataset {
                resource: json_path.to_string(),
            });
        };
        let summary_id = &self.config.elements.home_summary;
        if self.document.has_element(summary_id) {
            if let Err(e) = self
                .document
                .set_inner_html(summary_id, &html::summary_block(&summary.sentences()))
            {
                warn!("unable to write time series summary: {e}");
            }
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::line_chart;
    use crate::charts::ChartSpec;
    use crate::outcome::{Degradation, Outcome};
    use crate::testing::{TestDashboard, fixtures};
    use formats::ScreenUseDataset;
    use pollster::block_on;
    use pretty_assertions::assert_eq;

    const DATA: &str = "./data/mental_health_vs_screen_use.json";

    #[test]
    fn spec_puts_each_series_on_its_own_axis() {
        let ds = ScreenUseDataset::parse(fixtures::SCREEN_USE).unwrap();
        let ChartSpec::Line(chart) = line_chart(&ds) else {
            panic!("expected a line chart");
        };
        assert_eq!(chart.labels, vec!["2019", "2020", "2021"]);
        assert_eq!(chart.datasets[0].axis, "y1");
        assert_eq!(chart.datasets[0].color, "#ef4444");
        assert_eq!(chart.datasets[1].axis, "y");
        assert_eq!(chart.datasets[1].data, vec![74.0, 70.0, 66.0]);
        assert_eq!(chart.axes[0].bands.label_for(75.0), "Excellent");
        assert_eq!(chart.axes[1].bands.label_for(6.0), "Medium");
        assert!(!chart.show_legend);
    }

    #[test]
    fn writes_chart_and_summary() {
        let dash = TestDashboard::with_fixtures();
        dash.document().set_page(fixtures::HOME_PAGE);

        let out = block_on(dash.render_time_series("homeChart", DATA, dash.current_token()));
        assert!(out.is_done(), "{out:?}");

        let summary = dash.document().inner_html("homeSummary").unwrap();
        assert!(summary.contains("has been increasing from 3.5h in 2019 to 6.2h in 2021"), "{summary}");
        assert!(summary.contains("(2.7h, ~77% change)"), "{summary}");
        assert!(summary.contains("The mental health index has been declining"), "{summary}");
        assert!(summary.contains("Highest index: 74 in 2019; lowest: 66 in 2021."), "{summary}");
    }

    #[test]
    fn revisit_replaces_previous_chart() {
        let dash = TestDashboard::with_fixtures();
        dash.document().set_page(fixtures::HOME_PAGE);
        let first = block_on(dash.render_time_series("homeChart", DATA, dash.current_token()))
            .into_value()
            .unwrap();
        let second = block_on(dash.render_time_series("homeChart", DATA, dash.current_token()))
            .into_value()
            .unwrap();

        assert_eq!(dash.with_charts(|c| c.backend().destroyed()), vec![first]);
        assert_eq!(dash.with_charts(|c| c.chart_on("homeChart")), Some(second));
    }

    #[test]
    fn missing_canvas_skips_without_fetching() {
        let dash = TestDashboard::with_fixtures();
        let out = block_on(dash.render_time_series("homeChart", DATA, dash.current_token()));
        assert_eq!(
            out,
            Outcome::skipped(Degradation::MissingTarget {
                id: "homeChart".to_string()
            })
        );
        assert_eq!(dash.fetcher().request_count(DATA), 0);
    }

    #[test]
    fn empty_dataset_draws_but_skips_summary() {
        let dash = TestDashboard::with_fetcher(fixtures::fetcher().with_body(DATA, "{}"));
        dash.document().set_page(fixtures::HOME_PAGE);

        let out = block_on(dash.render_time_series("homeChart", DATA, dash.current_token()));
        assert!(matches!(out.degradation(), Some(Degradation::EmptyDataset { .. })));
        assert_eq!(dash.document().inner_html("homeSummary").as_deref(), Some(""));
    }

    #[test]
    fn undecodable_dataset_fails_quietly() {
        let dash = TestDashboard::with_fetcher(fixtures::fetcher().with_body(DATA, "not json"));
        dash.document().set_page(fixtures::HOME_PAGE);
        assert!(block_on(dash.render_time_series("homeChart", DATA, dash.current_token())).is_failed());
        assert_eq!(dash.with_charts(|c| c.live_count()), 0);
    }
}
