/// One labelled value of a chart series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// Ordered `(label, value)` sequence used to configure a chart and to
/// compute its summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    pub points: Vec<SeriesPoint>,
}

impl ChartSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, value: f64) {
        self.points.push(SeriesPoint {
            label: label.into(),
            value,
        });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.label.as_str()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn first(&self) -> Option<&SeriesPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }
}

impl<L: Into<String>> FromIterator<(L, f64)> for ChartSeries {
    fn from_iter<I: IntoIterator<Item = (L, f64)>>(iter: I) -> Self {
        let mut series = ChartSeries::new();
        for (label, value) in iter {
            series.push(label, value);
        }
        series
    }
}
