use serde::{Deserialize, Serialize};

pub const LNG_RANGE: (f64, f64) = (-180.0, 180.0);
pub const LAT_RANGE: (f64, f64) = (-90.0, 90.0);

/// WGS84 longitude/latitude pair in degrees.
///
/// Serializes as a `[lng, lat]` pair, which is the order GeoJSON and the
/// host script both use.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CoordError {
    LngOutOfRange(f64),
    LatOutOfRange(f64),
}

impl std::fmt::Display for CoordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordError::LngOutOfRange(v) => {
                write!(f, "longitude {v} outside [{}, {}]", LNG_RANGE.0, LNG_RANGE.1)
            }
            CoordError::LatOutOfRange(v) => {
                write!(f, "latitude {v} outside [{}, {}]", LAT_RANGE.0, LAT_RANGE.1)
            }
        }
    }
}

impl std::error::Error for CoordError {}

impl LngLat {
    /// Unchecked constructor; use [`LngLat::checked`] for untrusted input.
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Range-checked constructor. Longitude is checked first.
    pub fn checked(lng: f64, lat: f64) -> Result<Self, CoordError> {
        if !(LNG_RANGE.0..=LNG_RANGE.1).contains(&lng) {
            return Err(CoordError::LngOutOfRange(lng));
        }
        if !(LAT_RANGE.0..=LAT_RANGE.1).contains(&lat) {
            return Err(CoordError::LatOutOfRange(lat));
        }
        Ok(Self { lng, lat })
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(p: LngLat) -> Self {
        [p.lng, p.lat]
    }
}

/// Pixel position on the rendering surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::{CoordError, LngLat};

    #[test]
    fn checked_accepts_bounds_inclusive() {
        assert_eq!(
            LngLat::checked(-180.0, -90.0),
            Ok(LngLat::new(-180.0, -90.0))
        );
        assert_eq!(LngLat::checked(180.0, 90.0), Ok(LngLat::new(180.0, 90.0)));
    }

    #[test]
    fn checked_names_offending_axis() {
        assert_eq!(
            LngLat::checked(200.0, 0.0),
            Err(CoordError::LngOutOfRange(200.0))
        );
        assert_eq!(
            LngLat::checked(0.0, -91.0),
            Err(CoordError::LatOutOfRange(-91.0))
        );
        // Both out of range: longitude wins.
        assert_eq!(
            LngLat::checked(200.0, 100.0),
            Err(CoordError::LngOutOfRange(200.0))
        );
    }

    #[test]
    fn serializes_as_pair() {
        let p = LngLat::new(-122.4, 37.8);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "[-122.4,37.8]");
        let back: LngLat = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
