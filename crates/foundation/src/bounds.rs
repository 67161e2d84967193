use serde::{Deserialize, Serialize};

use crate::geo::LngLat;

/// Axis-aligned lon/lat bounding box.
///
/// No antimeridian handling: a box spanning 170..-170 is stored as -170..170.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LngLatBounds {
    pub min: LngLat,
    pub max: LngLat,
}

impl LngLatBounds {
    pub fn new(min: LngLat, max: LngLat) -> Self {
        LngLatBounds { min, max }
    }

    pub fn from_point(p: LngLat) -> Self {
        LngLatBounds { min: p, max: p }
    }

    /// Bounds of all points, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = LngLat>) -> Option<Self> {
        let mut out: Option<Self> = None;
        for p in points {
            match out.as_mut() {
                Some(b) => b.extend(p),
                None => out = Some(Self::from_point(p)),
            }
        }
        out
    }

    pub fn extend(&mut self, p: LngLat) {
        self.min.lng = self.min.lng.min(p.lng);
        self.min.lat = self.min.lat.min(p.lat);
        self.max.lng = self.max.lng.max(p.lng);
        self.max.lat = self.max.lat.max(p.lat);
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut out = *self;
        out.extend(other.min);
        out.extend(other.max);
        out
    }
}

/// Folds optional bounds together; `None` entries are skipped.
pub fn union_all(bounds: impl IntoIterator<Item = Option<LngLatBounds>>) -> Option<LngLatBounds> {
    bounds.into_iter().flatten().reduce(|a, b| a.union(&b))
}

#[cfg(test)]
mod tests {
    use super::{LngLatBounds, union_all};
    use crate::geo::LngLat;

    #[test]
    fn from_points_covers_all() {
        let b = LngLatBounds::from_points([
            LngLat::new(-118.2, 34.0),
            LngLat::new(-74.0, 40.7),
            LngLat::new(-87.6, 41.8),
        ])
        .unwrap();
        assert_eq!(b.min, LngLat::new(-118.2, 34.0));
        assert_eq!(b.max, LngLat::new(-74.0, 41.8));
    }

    #[test]
    fn empty_points_have_no_bounds() {
        assert_eq!(LngLatBounds::from_points(Vec::new()), None);
    }

    #[test]
    fn union_all_skips_missing() {
        let a = LngLatBounds::from_point(LngLat::new(1.0, 1.0));
        let b = LngLatBounds::from_point(LngLat::new(-1.0, 2.0));
        let u = union_all([Some(a), None, Some(b)]).unwrap();
        assert_eq!(u.min, LngLat::new(-1.0, 1.0));
        assert_eq!(u.max, LngLat::new(1.0, 2.0));
        assert_eq!(union_all([None, None]), None);
    }
}
