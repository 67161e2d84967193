use std::collections::BTreeSet;

use layers::error::LayerError;
use layers::geojson::FeatureCollection;
use layers::labels::LabelRules;
use layers::layer::{
    FeatureLayerSpec, GeoJsonLayerSpec, GraphicsLayerSpec, LayerCommon, LayerKind, LayerSpec,
};
use layers::source::{Auth, FeatureSource};
use layers::symbology::Renderer;
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// Explicit id given to the layer built from the top-level `geojson` argument.
pub const TOP_LEVEL_GEOJSON_ID: &str = "geojson";

/// Validates a `layers` list into canonical specs, in list order.
pub fn validate_layers(raw: &Value) -> Result<Vec<LayerSpec>, ValidationError> {
    let entries = raw
        .as_array()
        .ok_or(ValidationError::InvalidLayerList { field: "layers" })?;
    let specs = parse_entries(entries, 0)?;
    check_unique_keys(&specs, 0)?;
    Ok(specs)
}

/// Rewrites a legacy `feature_layers` list into `layers` entries.
///
/// Lossless: every field is copied and only `kind: "feature"` is injected.
/// Entries that already name a different kind are rejected; non-object
/// entries pass through so the regular validation reports them.
pub fn translate_feature_layers(raw: &Value) -> Result<Vec<Value>, ValidationError> {
    let entries = raw
        .as_array()
        .ok_or(ValidationError::InvalidLayerList {
            field: "feature_layers",
        })?;
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let Some(obj) = entry.as_object() else {
                return Ok(entry.clone());
            };
            for field in ["kind", "type"] {
                match obj.get(field) {
                    None | Some(Value::Null) => {}
                    Some(Value::String(k)) if k == LayerKind::Feature.as_str() => {}
                    Some(other) => {
                        return Err(ValidationError::InvalidLayer {
                            index,
                            reason: LayerError::ConflictingKind {
                                kind: LayerKind::Feature.to_string(),
                                type_: json_text(other),
                            },
                        });
                    }
                }
            }
            let mut out = obj.clone();
            out.insert(
                "kind".to_string(),
                Value::String(LayerKind::Feature.to_string()),
            );
            Ok(Value::Object(out))
        })
        .collect()
}

/// Builds the canonical layer list from all three inputs: the top-level
/// geojson first, then `layers`, then translated `feature_layers`.
///
/// Error indices refer to positions in that combined list.
pub fn canonical_layers(
    geojson: Option<&Value>,
    layers: Option<&Value>,
    feature_layers: Option<&Value>,
) -> Result<Vec<LayerSpec>, ValidationError> {
    let mut specs = Vec::new();
    if let Some(raw) = geojson {
        let data = FeatureCollection::from_value(raw)
            .map_err(|reason| ValidationError::InvalidGeoJson { reason })?;
        specs.push(LayerSpec::Geojson(GeoJsonLayerSpec {
            common: LayerCommon {
                id: Some(TOP_LEVEL_GEOJSON_ID.to_string()),
                ..LayerCommon::default()
            },
            data,
        }));
    }
    if let Some(raw) = layers {
        let entries = raw
            .as_array()
            .ok_or(ValidationError::InvalidLayerList { field: "layers" })?;
        let parsed = parse_entries(entries, specs.len())?;
        specs.extend(parsed);
    }
    if let Some(raw) = feature_layers {
        let offset = specs.len();
        let translated = translate_feature_layers(raw).map_err(|e| match e {
            ValidationError::InvalidLayer { index, reason } => ValidationError::InvalidLayer {
                index: index + offset,
                reason,
            },
            other => other,
        })?;
        let parsed = parse_entries(&translated, offset)?;
        specs.extend(parsed);
    }
    check_unique_keys(&specs, 0)?;
    Ok(specs)
}

fn parse_entries(entries: &[Value], offset: usize) -> Result<Vec<LayerSpec>, ValidationError> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            parse_layer(entry).map_err(|reason| ValidationError::InvalidLayer {
                index: offset + i,
                reason,
            })
        })
        .collect()
}

fn check_unique_keys(specs: &[LayerSpec], offset: usize) -> Result<(), ValidationError> {
    let mut seen = BTreeSet::new();
    for (i, spec) in specs.iter().enumerate() {
        let key = spec.key();
        if !seen.insert(key.clone()) {
            return Err(ValidationError::InvalidLayer {
                index: offset + i,
                reason: LayerError::DuplicateKey(key),
            });
        }
    }
    Ok(())
}

/// Parses one raw layer entry.
pub fn parse_layer(raw: &Value) -> Result<LayerSpec, LayerError> {
    let obj = raw.as_object().ok_or(LayerError::NotAnObject)?;
    let kind = layer_kind(obj)?;
    let common = LayerCommon {
        id: opt_str(obj, "id")?.map(str::to_string),
        title: opt_str(obj, "title")?.map(str::to_string),
        visible: opt_bool(obj, "visible")?.unwrap_or(true),
    };
    if common.id.as_deref().is_some_and(|id| id.trim().is_empty()) {
        return Err(LayerError::InvalidField {
            field: "id",
            expected: "a non-empty string",
        });
    }

    match kind {
        LayerKind::Feature => {
            let source = match (opt_str(obj, "url")?, opt_str(obj, "portal_item_id")?) {
                (Some(_), Some(_)) => return Err(LayerError::AmbiguousSource),
                (None, None) => return Err(LayerError::MissingSource),
                (Some(url), None) => FeatureSource::parse_url(url)?,
                (None, Some(item)) => FeatureSource::parse_portal_item(item)?,
            };
            let auth = Auth::from_parts(opt_str(obj, "api_key")?, opt_str(obj, "oauth_token")?)?;
            let renderer = present(obj, "renderer")
                .map(Renderer::from_value)
                .transpose()?;
            let labels = match (present(obj, "label_info"), present(obj, "labels")) {
                (Some(_), Some(_)) => {
                    return Err(LayerError::InvalidField {
                        field: "label_info",
                        expected: "given once (not together with `labels`)",
                    });
                }
                (Some(v), None) | (None, Some(v)) => Some(LabelRules::from_value(v)?),
                (None, None) => None,
            };
            Ok(LayerSpec::Feature(FeatureLayerSpec {
                common,
                source,
                auth,
                renderer,
                labels,
            }))
        }
        LayerKind::Geojson => {
            let data = present(obj, "data").ok_or(LayerError::MissingData)?;
            Ok(LayerSpec::Geojson(GeoJsonLayerSpec {
                common,
                data: FeatureCollection::from_value(data)?,
            }))
        }
        LayerKind::Graphics => {
            let graphics = match present(obj, "graphics") {
                None => FeatureCollection::empty(),
                Some(Value::Array(items)) => FeatureCollection::try_from_features(items)?,
                Some(_) => {
                    return Err(LayerError::InvalidField {
                        field: "graphics",
                        expected: "a list of features",
                    });
                }
            };
            Ok(LayerSpec::Graphics(GraphicsLayerSpec { common, graphics }))
        }
    }
}

fn layer_kind(obj: &Map<String, Value>) -> Result<LayerKind, LayerError> {
    let kind = opt_str(obj, "kind").map_err(|_| LayerError::InvalidField {
        field: "kind",
        expected: "a string",
    })?;
    let type_ = opt_str(obj, "type").map_err(|_| LayerError::InvalidField {
        field: "type",
        expected: "a string",
    })?;
    let name = match (kind, type_) {
        (Some(k), Some(t)) if k != t => {
            return Err(LayerError::ConflictingKind {
                kind: k.to_string(),
                type_: t.to_string(),
            });
        }
        (Some(k), _) | (None, Some(k)) => k,
        (None, None) => return Err(LayerError::MissingKind),
    };
    LayerKind::from_str_opt(name).ok_or_else(|| LayerError::UnknownKind(name.to_string()))
}

/// The value at `field`, treating JSON null as absent.
fn present<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

fn opt_str<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Result<Option<&'a str>, LayerError> {
    match present(obj, field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(LayerError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}

fn opt_bool(obj: &Map<String, Value>, field: &'static str) -> Result<Option<bool>, LayerError> {
    match present(obj, field) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(LayerError::InvalidField {
            field,
            expected: "true or false",
        }),
    }
}

fn json_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
