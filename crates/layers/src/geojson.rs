use foundation::bounds::LngLatBounds;
use foundation::geo::LngLat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::LayerError;

/// Validated GeoJSON feature collection.
///
/// Holds the original JSON (forwarded to the engine as-is) plus the two
/// facts the reconciler needs without re-walking it: the feature count and
/// the bounds of every position it contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct FeatureCollection {
    raw: Value,
    feature_count: usize,
    bounds: Option<LngLatBounds>,
}

impl FeatureCollection {
    pub fn empty() -> Self {
        Self::from_features(Vec::new())
    }

    /// Accepts an object whose `type`, when present, is `FeatureCollection`
    /// and whose `features`, when present, is a list of objects.
    pub fn from_value(raw: &Value) -> Result<Self, LayerError> {
        let obj = raw
            .as_object()
            .ok_or_else(|| LayerError::InvalidGeoJson("expected an object".to_string()))?;
        match obj.get("type") {
            None | Some(Value::Null) => {}
            Some(Value::String(t)) if t == "FeatureCollection" => {}
            Some(other) => {
                return Err(LayerError::InvalidGeoJson(format!(
                    "expected type FeatureCollection, got {other}"
                )));
            }
        }
        let features: &[Value] = match obj.get("features") {
            None | Some(Value::Null) => &[],
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(LayerError::InvalidGeoJson(
                    "`features` must be a list".to_string(),
                ));
            }
        };
        check_features(features)?;
        Ok(Self {
            raw: raw.clone(),
            feature_count: features.len(),
            bounds: features_bounds(features),
        })
    }

    /// Wraps loose feature objects (graphics) into a collection.
    fn from_features(features: Vec<Value>) -> Self {
        let feature_count = features.len();
        let bounds = features_bounds(&features);
        let mut obj = Map::new();
        obj.insert(
            "type".to_string(),
            Value::String("FeatureCollection".to_string()),
        );
        obj.insert("features".to_string(), Value::Array(features));
        Self {
            raw: Value::Object(obj),
            feature_count,
            bounds,
        }
    }

    /// Like [`FeatureCollection::from_features`] but validates each entry.
    pub fn try_from_features(features: &[Value]) -> Result<Self, LayerError> {
        check_features(features)?;
        Ok(Self::from_features(features.to_vec()))
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    pub fn bounds(&self) -> Option<LngLatBounds> {
        self.bounds
    }

    /// Short, stable digest of the collection's JSON.
    pub fn content_hash(&self) -> String {
        content_hash(&self.raw)
    }
}

/// First 16 hex chars of the blake3 digest of `v`'s JSON encoding.
///
/// `serde_json` maps are key-sorted, so equal values hash equally
/// regardless of the key order they were written in.
pub fn content_hash(v: &Value) -> String {
    let bytes = v.to_string();
    let hex = blake3::hash(bytes.as_bytes()).to_hex();
    hex.as_str()[..16].to_string()
}

fn check_features(features: &[Value]) -> Result<(), LayerError> {
    for (i, f) in features.iter().enumerate() {
        let Some(obj) = f.as_object() else {
            return Err(LayerError::InvalidGeoJson(format!(
                "feature {i} must be an object"
            )));
        };
        match obj.get("geometry") {
            None | Some(Value::Null) | Some(Value::Object(_)) => {}
            Some(_) => {
                return Err(LayerError::InvalidGeoJson(format!(
                    "feature {i} geometry must be an object"
                )));
            }
        }
        if let Some(geometry) = obj.get("geometry") {
            let mut positions = Vec::new();
            geometry_positions(geometry, &mut positions);
            for p in positions {
                LngLat::checked(p.lng, p.lat)
                    .map_err(|e| LayerError::InvalidGeoJson(format!("feature {i}: {e}")))?;
            }
        }
    }
    Ok(())
}

fn features_bounds(features: &[Value]) -> Option<LngLatBounds> {
    let mut positions = Vec::new();
    for f in features {
        if let Some(geom) = f.get("geometry") {
            geometry_positions(geom, &mut positions);
        }
    }
    LngLatBounds::from_points(positions)
}

/// Collects every position of a geometry, GeometryCollections included.
fn geometry_positions(geometry: &Value, out: &mut Vec<LngLat>) {
    if let Some(children) = geometry.get("geometries").and_then(Value::as_array) {
        for child in children {
            geometry_positions(child, out);
        }
        return;
    }
    if let Some(coords) = geometry.get("coordinates") {
        coordinate_positions(coords, out);
    }
}

fn coordinate_positions(coords: &Value, out: &mut Vec<LngLat>) {
    let Some(items) = coords.as_array() else {
        return;
    };
    // A position is a list whose first two entries are numbers.
    if let (Some(lng), Some(lat)) = (
        items.first().and_then(Value::as_f64),
        items.get(1).and_then(Value::as_f64),
    ) {
        out.push(LngLat::new(lng, lat));
        return;
    }
    for child in items {
        coordinate_positions(child, out);
    }
}

impl TryFrom<Value> for FeatureCollection {
    type Error = LayerError;

    fn try_from(v: Value) -> Result<Self, Self::Error> {
        FeatureCollection::from_value(&v)
    }
}

impl From<FeatureCollection> for Value {
    fn from(fc: FeatureCollection) -> Self {
        fc.raw
    }
}
