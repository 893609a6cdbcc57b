/// Canonical geographic position in decimal degrees.
///
/// Every coordinate that reaches the map goes through this type, so both
/// components are guaranteed to be finite.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    /// Builds a position when both components are finite numbers.
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        Some(Self {
            lat: finite(lat)?,
            lon: finite(lon)?,
        })
    }

    /// Builds a position from two independently resolved components.
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        Self::new(lat?, lon?)
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.lat, self.lon]
    }
}

impl Default for LatLon {
    /// Null Island, the neutral map center.
    fn default() -> Self {
        Self { lat: 0.0, lon: 0.0 }
    }
}

pub fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// Numeric coercion for coordinate text (`"48.85"`, `" 2.35 "`).
///
/// Blank input is absent rather than zero.
pub fn parse_coordinate(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().and_then(finite)
}

#[cfg(test)]
mod tests {
    use super::{LatLon, parse_coordinate};

    #[test]
    fn rejects_non_finite_components() {
        assert!(LatLon::new(f64::NAN, 1.0).is_none());
        assert!(LatLon::new(1.0, f64::INFINITY).is_none());
        assert_eq!(LatLon::new(1.5, -2.0), Some(LatLon { lat: 1.5, lon: -2.0 }));
    }

    #[test]
    fn from_parts_needs_both() {
        assert!(LatLon::from_parts(Some(1.0), None).is_none());
        assert!(LatLon::from_parts(None, Some(1.0)).is_none());
        assert!(LatLon::from_parts(Some(1.0), Some(2.0)).is_some());
    }

    #[test]
    fn parses_coordinate_text() {
        assert_eq!(parse_coordinate(" 48.5 "), Some(48.5));
        assert_eq!(parse_coordinate("-0"), Some(-0.0));
        assert_eq!(parse_coordinate(""), None);
        assert_eq!(parse_coordinate("north"), None);
        assert_eq!(parse_coordinate("NaN"), None);
    }
}
