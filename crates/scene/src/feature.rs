use foundation::ids::{FeatureKey, LayerKey};
use layers::geojson::content_hash;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A feature hit by an interaction, in engine-independent form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRef {
    pub layer: LayerKey,
    pub key: FeatureKey,
    pub attributes: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Value>,
}

impl FeatureRef {
    /// Keyed by `object_id` when the engine reports one, else by a digest
    /// of attributes and geometry.
    pub fn new(
        layer: LayerKey,
        object_id: Option<String>,
        attributes: Map<String, Value>,
        geometry: Option<Value>,
    ) -> Self {
        let key = match object_id {
            Some(id) => FeatureKey::new(&layer, id),
            None => {
                let mut digest_input = Map::new();
                digest_input.insert("a".to_string(), Value::Object(attributes.clone()));
                digest_input.insert("g".to_string(), geometry.clone().unwrap_or(Value::Null));
                FeatureKey::new(&layer, content_hash(&Value::Object(digest_input)))
            }
        };
        Self {
            layer,
            key,
            attributes,
            geometry,
        }
    }
}
