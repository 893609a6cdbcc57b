use serde::Serialize;

/// One qualitative band: values past `threshold` get `label`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Band {
    pub threshold: f64,
    /// `true` for `>=`, `false` for `>`.
    pub inclusive: bool,
    pub label: String,
}

/// Maps raw axis values onto qualitative labels.
///
/// Bands are checked in order and the first match wins, so list them from
/// the highest threshold down. Values below every band get `fallback`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandScale {
    pub bands: Vec<Band>,
    pub fallback: String,
}

impl BandScale {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            bands: Vec::new(),
            fallback: fallback.into(),
        }
    }

    pub fn at_least(mut self, threshold: f64, label: impl Into<String>) -> Self {
        self.bands.push(Band {
            threshold,
            inclusive: true,
            label: label.into(),
        });
        self
    }

    pub fn above(mut self, threshold: f64, label: impl Into<String>) -> Self {
        self.bands.push(Band {
            threshold,
            inclusive: false,
            label: label.into(),
        });
        self
    }

    pub fn label_for(&self, value: f64) -> &str {
        self.bands
            .iter()
            .find(|b| {
                if b.inclusive {
                    value >= b.threshold
                } else {
                    value > b.threshold
                }
            })
            .map(|b| b.label.as_str())
            .unwrap_or(&self.fallback)
    }

    /// Four bands for the mental-health index axis.
    pub fn mental_health_index() -> Self {
        BandScale::new("Poor")
            .at_least(75.0, "Excellent")
            .at_least(70.0, "Good")
            .at_least(65.0, "Fair")
    }

    /// Three bands for the daily screen-time axis (hours).
    pub fn screen_time() -> Self {
        BandScale::new("Low").above(6.0, "High").above(4.0, "Medium")
    }
}

#[cfg(test)]
mod tests {
    use super::BandScale;

    #[test]
    fn index_bands_are_inclusive() {
        let scale = BandScale::mental_health_index();
        assert_eq!(scale.label_for(80.0), "Excellent");
        assert_eq!(scale.label_for(75.0), "Excellent");
        assert_eq!(scale.label_for(70.0), "Good");
        assert_eq!(scale.label_for(65.0), "Fair");
        assert_eq!(scale.label_for(64.9), "Poor");
    }

    #[test]
    fn screen_time_bands_are_strict() {
        let scale = BandScale::screen_time();
        assert_eq!(scale.label_for(6.5), "High");
        assert_eq!(scale.label_for(6.0), "Medium");
        assert_eq!(scale.label_for(4.0), "Low");
        assert_eq!(scale.label_for(0.0), "Low");
    }
}
