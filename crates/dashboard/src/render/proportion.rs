use compute::ProportionSummary;
use compute::format::{fixed, plain};
use foundation::ids::Id;
use formats::{AgeBreakdown, ChartSeries};
use runtime::NavToken;
use tracing::{debug, error, warn};

use crate::charts::{CenterText, ChartBackend, ChartSpec, DoughnutChart};
use crate::dashboard::Dashboard;
use crate::fetch::{Fetcher, fetch_dataset};
use crate::html;
use crate::map::MapBackend;
use crate::outcome::{Degradation, Outcome};
use crate::surface::Document;

pub const PALETTE: [&str; 6] = ["#FFB020", "#FF6B6B", "#6C5CE7", "#10B981", "#06B6D4", "#FF8A65"];

const SUBJECT: &str = "Depression prevalence";

/// Share of `value` in `total`, in percent. 0 for an empty total.
fn share(value: f64, total: f64) -> f64 {
    if total == 0.0 { 0.0 } else { value / total * 100.0 }
}

/// Ring chart with a centered total, a value legend and share tooltips.
pub fn doughnut_chart(series: &ChartSeries) -> ChartSpec {
    let total = series.total();
    let points = &series.points;

    ChartSpec::Doughnut(DoughnutChart {
        labels: points.iter().map(|p| p.label.clone()).collect(),
        values: series.values(),
        colors: (0..points.len())
            .map(|i| PALETTE[i % PALETTE.len()].to_string())
            .collect(),
        border_color: "#ffffff".to_string(),
        border_width: 2,
        cutout: "72%".to_string(),
        rotation: -90.0,
        offset: 8,
        center: CenterText {
            title: "Total".to_string(),
            value: format!("{}%", fixed(total, 1)),
        },
        legend: points
            .iter()
            .map(|p| format!("{} — {}%", p.label, plain(p.value)))
            .collect(),
        legend_position: "right",
        tooltips: points
            .iter()
            .map(|p| {
                format!(
                    "{}: {}% ({}%)",
                    p.label,
                    plain(p.value),
                    fixed(share(p.value, total), 1)
                )
            })
            .collect(),
    })
}

impl<F, D, M, C> Dashboard<F, D, M, C>
where
    F: Fetcher,
    D: Document,
    M: MapBackend,
    C: ChartBackend,
{
    /// Draws the age-group breakdown on `target_id` and writes the
    /// highest/lowest/average narrative into the configured summary element.
    pub async fn render_proportion(&self, target_id: &str, json_path: &str, token: NavToken) -> Outcome<Id> {
        if !self.document.has_element(target_id) {
            debug!(target = target_id, "proportion canvas missing");
            return Outcome::skipped(Degradation::MissingTarget {
                id: target_id.to_string(),
            });
        }

        let breakdown = match fetch_dataset(&self.fetcher, json_path, AgeBreakdown::parse).await {
            Ok(breakdown) => breakdown,
            Err(e) => {
                error!(url = json_path, "age breakdown unavailable: {e}");
                return Outcome::Failed(e);
            }
        };
        if self.is_stale(token) {
            return Outcome::skipped(Degradation::Stale);
        }

        let series = breakdown.series();
        let drawn = self.charts.borrow_mut().replace(target_id, &doughnut_chart(&series));
        if drawn.value().is_none() {
            return drawn;
        }

        let Some(summary) = ProportionSummary::new(&series, breakdown.source()) else {
            warn!(url = json_path, "no age groups to summarize");
            return drawn.degrade(Degradation::EmptyDataset {
                resource: json_path.to_string(),
            });
        };
        let summary_id = &self.config.elements.age_summary;
        if self.document.has_element(summary_id) {
            let markup = html::headline_block(&summary.headline(SUBJECT), &summary.detail());
            if let Err(e) = self.document.set_inner_html(summary_id, &markup) {
                warn!("unable to write age summary: {e}");
            }
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::doughnut_chart;
    use crate::charts::ChartSpec;
    use crate::outcome::Outcome;
    use crate::testing::{TestDashboard, fixtures};
    use formats::ChartSeries;
    use pollster::block_on;
    use pretty_assertions::assert_eq;

    const DATA: &str = "./data/age_wise_depression.json";

    #[test]
    fn spec_precomputes_legend_tooltips_and_total() {
        let series: ChartSeries = [("18-25", 40.0), ("26-40", 35.0), ("41+", 25.0)].into_iter().collect();
        let ChartSpec::Doughnut(chart) = doughnut_chart(&series) else {
            panic!("expected a doughnut");
        };
        assert_eq!(chart.center.value, "100.0%");
        assert_eq!(chart.legend[0], "18-25 — 40%");
        assert_eq!(chart.tooltips[2], "41+: 25% (25.0%)");
        assert_eq!(chart.colors, vec!["#FFB020", "#FF6B6B", "#6C5CE7"]);
        assert_eq!(chart.cutout, "72%");
        assert_eq!(chart.rotation, -90.0);
    }

    #[test]
    fn palette_wraps_for_many_groups() {
        let series: ChartSeries = (0..8).map(|i| (format!("g{i}"), 1.0)).collect();
        let ChartSpec::Doughnut(chart) = doughnut_chart(&series) else {
            panic!("expected a doughnut");
        };
        assert_eq!(chart.colors[6], "#FFB020");
        assert_eq!(chart.tooltips[0], "g0: 1% (12.5%)");
    }

    #[test]
    fn writes_summary_with_source() {
        let dash = TestDashboard::with_fixtures();
        dash.document().set_page(fixtures::HOME_PAGE);

        let out = block_on(dash.render_proportion("agePieChart", DATA, dash.current_token()));
        assert!(out.is_done(), "{out:?}");

        let summary = dash.document().inner_html("ageSummary").unwrap();
        assert!(
            summary.contains("Depression prevalence is highest among 18-25 (40%) and lowest among 41+ (25%)."),
            "{summary}"
        );
        assert!(summary.contains("about 33.3%. Source: WHO 2022."), "{summary}");
    }

    #[test]
    fn missing_canvas_skips_without_fetching() {
        let dash = TestDashboard::with_fixtures();
        let out = block_on(dash.render_proportion("agePieChart", DATA, dash.current_token()));
        assert!(matches!(out, Outcome::Degraded { value: None, .. }));
        assert_eq!(dash.fetcher().request_count(DATA), 0);
    }

    #[test]
    fn failed_fetch_draws_nothing() {
        let dash = TestDashboard::with_fetcher(fixtures::fetcher().with_status(DATA, 404));
        dash.document().set_page(fixtures::HOME_PAGE);
        assert!(block_on(dash.render_proportion("agePieChart", DATA, dash.current_token())).is_failed());
        assert_eq!(dash.with_charts(|c| c.chart_on("agePieChart")), None);
        assert_eq!(dash.document().inner_html("ageSummary").as_deref(), Some(""));
    }
}
