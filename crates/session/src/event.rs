use catalog::Basemap;
use foundation::geo::{LngLat, ScreenPoint};
use foundation::ids::LayerKey;
use scene::feature::FeatureRef;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute names engines use for the object id, checked in order when
/// the hit carries no explicit one.
pub const OBJECT_ID_FIELDS: [&str; 4] = ["OBJECTID", "ObjectID", "FID", "id"];

/// Normalized interaction event, in the shape the host script reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InteractionEvent {
    MapClicked {
        coords: LngLat,
        #[serde(rename = "screenPoint")]
        screen_point: ScreenPoint,
        #[serde(rename = "hitFeature")]
        hit_feature: Option<FeatureRef>,
    },
    FeatureHovered { feature: FeatureRef },
    /// Always the full selection, never a delta.
    FeatureSelected {
        selected: Vec<FeatureRef>,
        #[serde(rename = "selectionCount")]
        selection_count: usize,
    },
    MapLoaded {
        #[serde(rename = "basemapId")]
        basemap_id: Basemap,
        center: LngLat,
        zoom: f64,
        #[serde(rename = "featureCount")]
        feature_count: usize,
        #[serde(rename = "layerCount")]
        layer_count: usize,
    },
}

impl InteractionEvent {
    pub fn selected(selected: Vec<FeatureRef>) -> Self {
        InteractionEvent::FeatureSelected {
            selection_count: selected.len(),
            selected,
        }
    }
}

/// Everything a session reports to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// One layer failed to load; the rest of the map is unaffected.
    LayerLoadFailed { key: LayerKey, reason: String },
    /// The view could not be created. The session is unmounted again.
    ViewCreationFailed { reason: String },
    #[serde(untagged)]
    Interaction(InteractionEvent),
}

impl From<InteractionEvent> for SessionEvent {
    fn from(e: InteractionEvent) -> Self {
        SessionEvent::Interaction(e)
    }
}

impl SessionEvent {
    pub fn as_interaction(&self) -> Option<&InteractionEvent> {
        match self {
            SessionEvent::Interaction(e) => Some(e),
            _ => None,
        }
    }
}

/// Pointer event as reported by the browser engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RawEngineEvent {
    Click {
        #[serde(rename = "mapPoint")]
        map_point: LngLat,
        #[serde(rename = "screenPoint")]
        screen_point: ScreenPoint,
        #[serde(default)]
        hit: Option<RawHit>,
    },
    PointerMove {
        #[serde(default)]
        hit: Option<RawHit>,
    },
    PointerLeave,
}

/// Topmost feature under the pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHit {
    #[serde(rename = "layerId")]
    pub layer: LayerKey,
    #[serde(rename = "objectId", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<Value>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Value>,
}

impl RawHit {
    /// Explicit object id, else the first id-like attribute.
    pub fn object_id(&self) -> Option<String> {
        self.object_id
            .as_ref()
            .and_then(id_text)
            .or_else(|| {
                OBJECT_ID_FIELDS
                    .iter()
                    .find_map(|f| self.attributes.get(*f).and_then(id_text))
            })
    }

    pub fn into_feature(self) -> FeatureRef {
        let object_id = self.object_id();
        FeatureRef::new(self.layer, object_id, self.attributes, self.geometry)
    }
}

fn id_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
