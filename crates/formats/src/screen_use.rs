use serde::Deserialize;

use crate::error::FormatError;
use crate::series::ChartSeries;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScreenUseYear {
    pub year: i32,
    pub average_screen_time_hours_per_day: f64,
    pub mental_health_index: f64,
}

/// Yearly screen time vs. mental-health index dataset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScreenUseDataset {
    #[serde(default, rename = "mental_health_vs_screen_use")]
    pub years: Vec<ScreenUseYear>,
}

impl ScreenUseDataset {
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        serde_json::from_str(text).map_err(|e| FormatError::json("screen use", e))
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn year_labels(&self) -> Vec<String> {
        self.years.iter().map(|y| y.year.to_string()).collect()
    }

    pub fn screen_time(&self) -> ChartSeries {
        self.years
            .iter()
            .map(|y| (y.year.to_string(), y.average_screen_time_hours_per_day))
            .collect()
    }

    pub fn mental_health(&self) -> ChartSeries {
        self.years
            .iter()
            .map(|y| (y.year.to_string(), y.mental_health_index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::ScreenUseDataset;

    #[test]
    fn splits_into_two_series_sharing_labels() {
        let ds = ScreenUseDataset::parse(
            r#"{"mental_health_vs_screen_use":[
                {"year":2019,"average_screen_time_hours_per_day":3.5,"mental_health_index":74},
                {"year":2020,"average_screen_time_hours_per_day":5.2,"mental_health_index":69}]}"#,
        )
        .unwrap();
        assert_eq!(ds.year_labels(), vec!["2019", "2020"]);
        assert_eq!(ds.screen_time().values(), vec![3.5, 5.2]);
        assert_eq!(ds.mental_health().values(), vec![74.0, 69.0]);
    }

    #[test]
    fn missing_array_means_empty() {
        let ds = ScreenUseDataset::parse("{}").unwrap();
        assert!(ds.is_empty());
    }
}
