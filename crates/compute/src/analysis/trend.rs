/// Direction of a series, judged from its first and last values only.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

/// How a trend is phrased. Screen time grows or shrinks; an index of
/// wellbeing improves or declines.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrendWords {
    Growth,
    Wellbeing,
}

impl Trend {
    pub fn between(first: f64, last: f64) -> Self {
        if last > first {
            Trend::Increasing
        } else if last < first {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }

    pub fn of(values: &[f64]) -> Option<Self> {
        Some(Self::between(*values.first()?, *values.last()?))
    }

    pub fn word(self, words: TrendWords) -> &'static str {
        match (self, words) {
            (Trend::Increasing, TrendWords::Growth) => "increasing",
            (Trend::Decreasing, TrendWords::Growth) => "decreasing",
            (Trend::Increasing, TrendWords::Wellbeing) => "improving",
            (Trend::Decreasing, TrendWords::Wellbeing) => "declining",
            (Trend::Stable, _) => "stable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Trend, TrendWords};

    #[test]
    fn compares_first_and_last() {
        assert_eq!(Trend::of(&[10.0, 12.0, 15.0]), Some(Trend::Increasing));
        assert_eq!(Trend::of(&[15.0, 12.0, 10.0]), Some(Trend::Decreasing));
        assert_eq!(Trend::of(&[10.0, 10.0, 10.0]), Some(Trend::Stable));
        assert_eq!(Trend::of(&[10.0, 30.0, 10.0]), Some(Trend::Stable));
        assert_eq!(Trend::of(&[]), None);
    }

    #[test]
    fn vocabulary_depends_on_measure() {
        assert_eq!(Trend::Increasing.word(TrendWords::Growth), "increasing");
        assert_eq!(Trend::Increasing.word(TrendWords::Wellbeing), "improving");
        assert_eq!(Trend::Decreasing.word(TrendWords::Wellbeing), "declining");
        assert_eq!(Trend::Stable.word(TrendWords::Wellbeing), "stable");
    }
}
