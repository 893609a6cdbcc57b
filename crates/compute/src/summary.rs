use formats::{ChartSeries, SeriesPoint};

use crate::analysis::{Statistics, Trend, TrendWords};
use crate::format::{fixed, plain};

/// Descriptive statistics of one ordered series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub first: SeriesPoint,
    pub last: SeriesPoint,
    pub min: SeriesPoint,
    pub max: SeriesPoint,
    pub trend: Trend,
    /// `last - first`.
    pub change: f64,
    /// Percentage change from `first`; 0 when `first` is 0.
    pub percent_change: f64,
}

impl SeriesSummary {
    /// `None` for an empty series.
    pub fn from_series(series: &ChartSeries) -> Option<Self> {
        let values = series.values();
        let first = series.first()?.clone();
        let last = series.last()?.clone();
        let min = series.points[Statistics::argmin(&values)?].clone();
        let max = series.points[Statistics::argmax(&values)?].clone();
        Some(Self {
            trend: Trend::between(first.value, last.value),
            change: last.value - first.value,
            percent_change: Statistics::percent_change(first.value, last.value),
            first,
            last,
            min,
            max,
        })
    }
}

/// Two-sentence narrative for the screen time vs. mental-health chart.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesSummary {
    pub screen: SeriesSummary,
    pub mental: SeriesSummary,
}

impl TimeSeriesSummary {
    pub fn new(screen: &ChartSeries, mental: &ChartSeries) -> Option<Self> {
        Some(Self {
            screen: SeriesSummary::from_series(screen)?,
            mental: SeriesSummary::from_series(mental)?,
        })
    }

    pub fn screen_sentence(&self) -> String {
        let s = &self.screen;
        format!(
            "Average daily screen time has been {} from {}h in {} to {}h in {} ({}h, ~{}% change). \
             It was highest in {} ({}h) and lowest in {} ({}h).",
            s.trend.word(TrendWords::Growth),
            plain(s.first.value),
            s.first.label,
            plain(s.last.value),
            s.last.label,
            fixed(s.change, 1),
            fixed(s.percent_change, 0),
            s.max.label,
            plain(s.max.value),
            s.min.label,
            plain(s.min.value),
        )
    }

    pub fn mental_sentence(&self) -> String {
        let m = &self.mental;
        format!(
            "The mental health index has been {}, moving from {} in {} to {} in {} ({} points). \
             Highest index: {} in {}; lowest: {} in {}.",
            m.trend.word(TrendWords::Wellbeing),
            plain(m.first.value),
            m.first.label,
            plain(m.last.value),
            m.last.label,
            fixed(m.change, 1),
            plain(m.max.value),
            m.max.label,
            plain(m.min.value),
            m.min.label,
        )
    }

    pub fn sentences(&self) -> Vec<String> {
        vec![self.screen_sentence(), self.mental_sentence()]
    }
}

/// Highest / lowest / average narrative for a category breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct ProportionSummary {
    pub highest: SeriesPoint,
    pub lowest: SeriesPoint,
    pub average: f64,
    pub total: f64,
    pub source: Option<String>,
}

impl ProportionSummary {
    pub fn new(series: &ChartSeries, source: Option<&str>) -> Option<Self> {
        let values = series.values();
        Some(Self {
            highest: series.points[Statistics::argmax(&values)?].clone(),
            lowest: series.points[Statistics::argmin(&values)?].clone(),
            average: Statistics::mean(&values)?,
            total: series.total(),
            source: source.map(str::to_string),
        })
    }

    pub fn headline(&self, subject: &str) -> String {
        format!(
            "{subject} is highest among {} ({}%) and lowest among {} ({}%).",
            self.highest.label,
            plain(self.highest.value),
            self.lowest.label,
            plain(self.lowest.value),
        )
    }

    pub fn detail(&self) -> String {
        let mut out = format!(
            "On average across the groups the prevalence is about {}%.",
            fixed(self.average, 1)
        );
        if let Some(source) = &self.source {
            out.push_str(&format!(" Source: {source}."));
        }
        out
    }
}
