use foundation::coords::{LatLon, finite, parse_coordinate};
use serde::Deserialize;
use serde_json::Value;

use crate::error::FormatError;

/// One country row of the countries-with-metrics dataset, after coordinate
/// normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRecord {
    pub country: String,
    pub depression: f64,
    pub anxiety: f64,
    pub year: i32,
    pub coordinates: Option<LatLon>,
}

impl CountryRecord {
    pub fn new(country: impl Into<String>, depression: f64, anxiety: f64, year: i32) -> Self {
        Self {
            country: country.into(),
            depression,
            anxiety,
            year,
            coordinates: None,
        }
    }

    pub fn with_coordinates(mut self, at: LatLon) -> Self {
        self.coordinates = Some(at);
        self
    }
}

/// Coordinates as they appear in the wild: either spelling, numbers or
/// numeric strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCoordinates {
    #[serde(default)]
    pub latitude: Option<Value>,
    #[serde(default)]
    pub lat: Option<Value>,
    #[serde(default)]
    pub longitude: Option<Value>,
    #[serde(default)]
    pub lon: Option<Value>,
}

impl RawCoordinates {
    fn lat(&self) -> Option<f64> {
        coerce(self.latitude.as_ref()).or_else(|| coerce(self.lat.as_ref()))
    }

    fn lon(&self) -> Option<f64> {
        coerce(self.longitude.as_ref()).or_else(|| coerce(self.lon.as_ref()))
    }

    pub fn to_lat_lon(&self) -> Option<LatLon> {
        LatLon::from_parts(self.lat(), self.lon())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCountryRecord {
    pub country: String,
    pub depression: f64,
    pub anxiety: f64,
    pub year: i32,
    #[serde(default, alias = "coords")]
    pub coordinates: Option<RawCoordinates>,
    #[serde(flatten)]
    pub top_level: RawCoordinates,
}

/// Coerces a JSON scalar into a finite number. Anything else is absent.
pub fn coerce(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().and_then(finite),
        Value::String(s) => parse_coordinate(s),
        _ => None,
    }
}

/// Maps every accepted coordinate spelling onto one canonical position.
///
/// Precedence per component: nested `latitude`, nested `lat`, top-level
/// `latitude`, top-level `lat` (and likewise for longitude).
pub fn normalize_country(raw: RawCountryRecord) -> CountryRecord {
    let nested = raw.coordinates.unwrap_or_default();
    let lat = nested.lat().or_else(|| raw.top_level.lat());
    let lon = nested.lon().or_else(|| raw.top_level.lon());

    CountryRecord {
        country: raw.country,
        depression: raw.depression,
        anxiety: raw.anxiety,
        year: raw.year,
        coordinates: LatLon::from_parts(lat, lon),
    }
}

pub fn parse_countries(text: &str) -> Result<Vec<CountryRecord>, FormatError> {
    let raw: Vec<RawCountryRecord> =
        serde_json::from_str(text).map_err(|e| FormatError::json("countries", e))?;
    Ok(raw.into_iter().map(normalize_country).collect())
}

#[cfg(test)]
mod tests {
    use super::parse_countries;
    use foundation::coords::LatLon;

    #[test]
    fn nested_latitude_spelling_wins_over_short_form() {
        let rows = parse_countries(
            r#"[{"country":"Greece","depression":6.5,"anxiety":7.1,"year":2021,
                "coordinates":{"latitude":39.0,"lat":1.0,"longitude":22.0,"lon":2.0}}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].coordinates, LatLon::new(39.0, 22.0));
    }

    #[test]
    fn accepts_short_spelling_and_numeric_strings() {
        let rows = parse_countries(
            r#"[{"country":"Chile","depression":5,"anxiety":6,"year":2020,
                "coordinates":{"lat":"-35.6","lon":"-71.5"}}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].coordinates, LatLon::new(-35.6, -71.5));
    }

    #[test]
    fn falls_back_to_top_level_fields_per_component() {
        let rows = parse_countries(
            r#"[{"country":"Peru","depression":4,"anxiety":5,"year":2019,
                "coordinates":{"lat":-9.2},"longitude":-75.0}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].coordinates, LatLon::new(-9.2, -75.0));
    }

    #[test]
    fn coords_alias_is_accepted() {
        let rows = parse_countries(
            r#"[{"country":"Mali","depression":4,"anxiety":5,"year":2019,
                "coords":{"lat":17.5,"lon":-4.0}}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].coordinates, LatLon::new(17.5, -4.0));
    }

    #[test]
    fn non_numeric_values_are_absent() {
        let rows = parse_countries(
            r#"[{"country":"Nowhere","depression":1,"anxiety":2,"year":2000,
                "coordinates":{"lat":"unknown","lon":12},"lat":null},
               {"country":"Bare","depression":1,"anxiety":2,"year":2000}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].coordinates, None);
        assert_eq!(rows[1].coordinates, None);
    }

    #[test]
    fn rejects_malformed_documents() {
        let err = parse_countries(r#"{"country":"x"}"#).unwrap_err();
        assert!(err.to_string().contains("countries"));
    }
}
