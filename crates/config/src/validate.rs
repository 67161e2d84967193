use catalog::{Basemap, ViewMode};
use foundation::geo::{CoordError, LngLat};
use serde_json::{Map, Value};
use tracing::debug;

use crate::dimension::{Dimension, validate_dimension};
use crate::error::{CenterError, ValidationError};
use crate::layer_list::canonical_layers;
use crate::map_config::{Interaction, MapConfig};

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 20.0;

const KNOWN_KEYS: [&str; 11] = [
    "width",
    "height",
    "basemap",
    "center",
    "zoom",
    "view_mode",
    "layers",
    "feature_layers",
    "geojson",
    "enable_selection",
    "enable_hover",
];

/// Validates a raw configuration object into a canonical [`MapConfig`].
///
/// Fields are checked in a fixed order so the same invalid input always
/// reports the same error.
pub fn validate(raw: &Value) -> Result<MapConfig, ValidationError> {
    let obj = raw.as_object().ok_or_else(|| ValidationError::InvalidConfig {
        reason: format!("expected an object, got {}", json_type(raw)),
    })?;

    for key in obj.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            debug!(key = %key, "ignoring unknown map config key");
        }
    }

    let width = field(obj, "width")
        .map(|v| validate_dimension("width", v))
        .transpose()?
        .unwrap_or(Dimension::DEFAULT_WIDTH);
    let height = field(obj, "height")
        .map(|v| validate_dimension("height", v))
        .transpose()?
        .unwrap_or(Dimension::DEFAULT_HEIGHT);
    let basemap = field(obj, "basemap")
        .map(validate_basemap)
        .transpose()?
        .unwrap_or_default();
    let center = field(obj, "center").map(validate_center).transpose()?;
    let zoom = field(obj, "zoom").map(validate_zoom).transpose()?;
    let view_mode = field(obj, "view_mode")
        .map(validate_view_mode)
        .transpose()?
        .unwrap_or_default();
    let layers = canonical_layers(
        field(obj, "geojson"),
        field(obj, "layers"),
        field(obj, "feature_layers"),
    )?;
    let interaction = Interaction {
        selection: flag(obj, "enable_selection")?.unwrap_or(true),
        hover: flag(obj, "enable_hover")?.unwrap_or(true),
    };

    Ok(MapConfig {
        width,
        height,
        basemap,
        center,
        zoom,
        view_mode,
        layers,
        interaction,
    })
}

pub fn validate_basemap(raw: &Value) -> Result<Basemap, ValidationError> {
    raw.as_str()
        .and_then(Basemap::from_id)
        .ok_or_else(|| ValidationError::InvalidBasemap {
            given: text(raw),
            allowed: Basemap::all_ids(),
        })
}

pub fn validate_view_mode(raw: &Value) -> Result<ViewMode, ValidationError> {
    raw.as_str()
        .and_then(ViewMode::from_id)
        .ok_or_else(|| ValidationError::InvalidViewMode { given: text(raw) })
}

/// `[lng, lat]` with both axes in range; the floats are kept as given.
pub fn validate_center(raw: &Value) -> Result<LngLat, ValidationError> {
    let fail = |reason| ValidationError::InvalidCenter { reason };
    let items = raw.as_array().ok_or(fail(CenterError::NotAList))?;
    if items.len() != 2 {
        return Err(fail(CenterError::WrongArity(items.len())));
    }
    let lng = items[0]
        .as_f64()
        .ok_or(fail(CenterError::NonNumeric { index: 0 }))?;
    let lat = items[1]
        .as_f64()
        .ok_or(fail(CenterError::NonNumeric { index: 1 }))?;
    LngLat::checked(lng, lat).map_err(|e| {
        fail(match e {
            CoordError::LngOutOfRange(v) => CenterError::LngOutOfRange(v),
            CoordError::LatOutOfRange(v) => CenterError::LatOutOfRange(v),
        })
    })
}

pub fn validate_zoom(raw: &Value) -> Result<f64, ValidationError> {
    raw.as_f64()
        .filter(|z| (MIN_ZOOM..=MAX_ZOOM).contains(z))
        .ok_or_else(|| ValidationError::InvalidZoom { given: raw.clone() })
}

fn field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn flag(obj: &Map<String, Value>, key: &'static str) -> Result<Option<bool>, ValidationError> {
    match field(obj, key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(ValidationError::InvalidInteraction { field: key }),
    }
}

fn text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::{validate, validate_basemap, validate_center, validate_view_mode, validate_zoom};
    use crate::dimension::Dimension;
    use crate::error::{CenterError, ValidationError};
    use catalog::{Basemap, ViewMode};
    use foundation::geo::LngLat;
    use layers::error::LayerError;
    use layers::layer::LayerKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn zoom_bounds() {
        assert_eq!(
            validate(&json!({"zoom": 25})),
            Err(ValidationError::InvalidZoom { given: json!(25) })
        );
        assert_eq!(validate(&json!({"zoom": 20})).unwrap().zoom(), Some(20.0));
        assert_eq!(validate_zoom(&json!(0)), Ok(0.0));
        assert_eq!(validate_zoom(&json!(4.5)), Ok(4.5));
        assert!(validate_zoom(&json!(-0.1)).is_err());
        assert!(validate_zoom(&json!("4")).is_err());
    }

    #[test]
    fn center_round_trips_in_range() {
        for (lng, lat) in [
            (-180.0, -90.0),
            (180.0, 90.0),
            (0.0, 0.0),
            (-98.5795, 39.8283),
            (151.2093, -33.8688),
        ] {
            let c = validate_center(&json!([lng, lat])).unwrap();
            assert_eq!(c, LngLat::new(lng, lat));
            assert_eq!(c.lng.to_bits(), f64::to_bits(lng));
            assert_eq!(c.lat.to_bits(), f64::to_bits(lat));
        }
    }

    #[test]
    fn center_errors_name_the_problem() {
        let reason = |v| match validate_center(&v) {
            Err(ValidationError::InvalidCenter { reason }) => reason,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(reason(json!([200, 0])), CenterError::LngOutOfRange(200.0));
        assert_eq!(reason(json!([0, -91])), CenterError::LatOutOfRange(-91.0));
        assert_eq!(reason(json!([1, 2, 3])), CenterError::WrongArity(3));
        assert_eq!(reason(json!([1])), CenterError::WrongArity(1));
        assert_eq!(
            reason(json!(["x", 2])),
            CenterError::NonNumeric { index: 0 }
        );
        assert_eq!(reason(json!("0,0")), CenterError::NotAList);
    }

    #[test]
    fn basemap_and_view_mode() {
        assert_eq!(validate_basemap(&json!("satellite")), Ok(Basemap::Satellite));
        match validate_basemap(&json!("invalid_basemap")) {
            Err(ValidationError::InvalidBasemap { given, allowed }) => {
                assert_eq!(given, "invalid_basemap");
                assert_eq!(allowed.len(), 12);
                assert!(allowed.contains(&"topo-vector"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(validate_view_mode(&json!("3d")), Ok(ViewMode::ThreeD));
        assert_eq!(
            validate_view_mode(&json!("4d")),
            Err(ValidationError::InvalidViewMode {
                given: "4d".to_string()
            })
        );
    }

    #[test]
    fn empty_object_gives_defaults() {
        let c = validate(&json!({})).unwrap();
        assert_eq!(c.width(), Dimension::Percent(100.0));
        assert_eq!(c.height(), Dimension::Pixels(400));
        assert_eq!(c.basemap(), Basemap::TopoVector);
        assert_eq!(c.view_mode(), ViewMode::TwoD);
        assert!(c.interaction().selection);
        assert!(c.interaction().hover);
        assert!(c.auto_fit());
    }

    #[test]
    fn nulls_mean_absent_and_unknown_keys_are_ignored() {
        let a = validate(&json!({"center": null, "zoom": null, "layers": null, "key": "map1"})).unwrap();
        assert_eq!(a, validate(&json!({})).unwrap());
    }

    #[test]
    fn full_config() {
        let c = validate(&json!({
            "width": "80%",
            "height": 600,
            "basemap": "dark-gray-vector",
            "center": [-98.5795, 39.8283],
            "zoom": 4,
            "view_mode": "3d",
            "enable_hover": false,
            "geojson": {
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [-74.006, 40.7128]},
                    "properties": {"name": "New York"}
                }]
            },
            "layers": [
                {"kind": "feature", "id": "states", "url": "https://example.com/FeatureServer/0"}
            ]
        }))
        .unwrap();
        assert_eq!(c.width(), Dimension::Percent(80.0));
        assert_eq!(c.height(), Dimension::Pixels(600));
        assert_eq!(c.center(), Some(LngLat::new(-98.5795, 39.8283)));
        assert_eq!(c.zoom(), Some(4.0));
        assert!(!c.auto_fit());
        assert!(!c.interaction().hover);
        let kinds: Vec<LayerKind> = c.layers().iter().map(|l| l.kind()).collect();
        assert_eq!(kinds, vec![LayerKind::Geojson, LayerKind::Feature]);
        assert_eq!(c.layers()[0].inline_feature_count(), 1);
    }

    #[test]
    fn rejects_non_objects_and_bad_flags() {
        assert!(matches!(
            validate(&json!([1, 2])),
            Err(ValidationError::InvalidConfig { .. })
        ));
        assert_eq!(
            validate(&json!({"enable_selection": "yes"})),
            Err(ValidationError::InvalidInteraction {
                field: "enable_selection"
            })
        );
        assert!(matches!(
            validate(&json!({"height": 50})),
            Err(ValidationError::InvalidDimension { field: "height", .. })
        ));
        assert!(matches!(
            validate(&json!({"geojson": "not geojson"})),
            Err(ValidationError::InvalidGeoJson { .. })
        ));
    }

    #[test]
    fn feature_layer_source_rules() {
        assert_eq!(
            validate(&json!({"layers": [{"kind": "feature", "url": "https://a.example/0", "portal_item_id": "abc"}]})),
            Err(ValidationError::InvalidLayer {
                index: 0,
                reason: LayerError::AmbiguousSource
            })
        );
        assert_eq!(
            validate(&json!({"layers": [{"kind": "feature", "title": "x"}]})),
            Err(ValidationError::InvalidLayer {
                index: 0,
                reason: LayerError::MissingSource
            })
        );
        assert!(matches!(
            validate(&json!({"layers": [{"kind": "feature", "url": "not a url"}]})),
            Err(ValidationError::InvalidLayer {
                index: 0,
                reason: LayerError::InvalidUrl { .. }
            })
        ));
    }

    #[test]
    fn validation_is_deterministic() {
        let raw = json!({"basemap": "nope", "zoom": 99});
        assert_eq!(validate(&raw), validate(&raw));
    }
}
