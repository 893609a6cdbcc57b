use serde::Deserialize;

use crate::error::FormatError;
use crate::series::ChartSeries;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgeGroup {
    pub age_range: String,
    pub percentage_affected: f64,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct DepressionStatistics {
    #[serde(default)]
    age_groups: Vec<AgeGroup>,
}

/// Age-group percentage breakdown dataset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AgeBreakdown {
    #[serde(default)]
    depression_statistics: DepressionStatistics,
}

impl AgeBreakdown {
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        serde_json::from_str(text).map_err(|e| FormatError::json("age breakdown", e))
    }

    pub fn groups(&self) -> &[AgeGroup] {
        &self.depression_statistics.age_groups
    }

    pub fn series(&self) -> ChartSeries {
        self.groups()
            .iter()
            .map(|g| (g.age_range.clone(), g.percentage_affected))
            .collect()
    }

    /// Citation carried by the first group, if any.
    pub fn source(&self) -> Option<&str> {
        self.groups()
            .first()
            .and_then(|g| g.source.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::AgeBreakdown;

    #[test]
    fn reads_groups_and_first_source() {
        let ds = AgeBreakdown::parse(
            r#"{"depression_statistics":{"age_groups":[
                {"age_range":"18-25","percentage_affected":17.0,"source":"NSDUH 2021"},
                {"age_range":"26-49","percentage_affected":9.6}]}}"#,
        )
        .unwrap();
        assert_eq!(ds.groups().len(), 2);
        assert_eq!(ds.source(), Some("NSDUH 2021"));
        assert_eq!(ds.series().labels(), vec!["18-25", "26-49"]);
    }

    #[test]
    fn missing_sections_are_empty() {
        assert!(AgeBreakdown::parse("{}").unwrap().groups().is_empty());
        let ds = AgeBreakdown::parse(r#"{"depression_statistics":{}}"#).unwrap();
        assert_eq!(ds.source(), None);
    }
}
