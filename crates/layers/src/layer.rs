use foundation::bounds::LngLatBounds;
use foundation::ids::LayerKey;
use serde::{Deserialize, Serialize};

use crate::geojson::FeatureCollection;
use crate::labels::LabelRules;
use crate::source::{Auth, FeatureSource};
use crate::symbology::Renderer;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Feature,
    Geojson,
    Graphics,
}

impl LayerKind {
    pub const ALL: [LayerKind; 3] = [LayerKind::Feature, LayerKind::Geojson, LayerKind::Graphics];

    pub const fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Feature => "feature",
            LayerKind::Geojson => "geojson",
            LayerKind::Graphics => "graphics",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields every layer kind carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerCommon {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub visible: bool,
}

impl Default for LayerCommon {
    fn default() -> Self {
        Self {
            id: None,
            title: None,
            visible: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureLayerSpec {
    #[serde(flatten)]
    pub common: LayerCommon,
    pub source: FeatureSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renderer: Option<Renderer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<LabelRules>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonLayerSpec {
    #[serde(flatten)]
    pub common: LayerCommon,
    pub data: FeatureCollection,
}

/// Client-side graphics drawn directly on the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphicsLayerSpec {
    #[serde(flatten)]
    pub common: LayerCommon,
    pub graphics: FeatureCollection,
}

/// Canonical layer description, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayerSpec {
    Feature(FeatureLayerSpec),
    Geojson(GeoJsonLayerSpec),
    Graphics(GraphicsLayerSpec),
}

impl LayerSpec {
    pub fn kind(&self) -> LayerKind {
        match self {
            LayerSpec::Feature(_) => LayerKind::Feature,
            LayerSpec::Geojson(_) => LayerKind::Geojson,
            LayerSpec::Graphics(_) => LayerKind::Graphics,
        }
    }

    pub fn common(&self) -> &LayerCommon {
        match self {
            LayerSpec::Feature(l) => &l.common,
            LayerSpec::Geojson(l) => &l.common,
            LayerSpec::Graphics(l) => &l.common,
        }
    }

    /// Identity used for diffing: the explicit id when given, else derived
    /// from kind and source.
    pub fn key(&self) -> LayerKey {
        if let Some(id) = &self.common().id {
            return LayerKey::new(id.clone());
        }
        match self {
            LayerSpec::Feature(l) => LayerKey::new(format!("feature:{}", l.source.key_fragment())),
            LayerSpec::Geojson(l) => LayerKey::new(format!("geojson:{}", l.data.content_hash())),
            LayerSpec::Graphics(l) => {
                LayerKey::new(format!("graphics:{}", l.graphics.content_hash()))
            }
        }
    }

    /// True when the features live on a remote service and only the engine
    /// knows their extent.
    pub fn is_remote(&self) -> bool {
        matches!(self, LayerSpec::Feature(_))
    }

    /// Extent of features embedded in the layer itself.
    pub fn inline_bounds(&self) -> Option<LngLatBounds> {
        match self {
            LayerSpec::Feature(_) => None,
            LayerSpec::Geojson(l) => l.data.bounds(),
            LayerSpec::Graphics(l) => l.graphics.bounds(),
        }
    }

    pub fn inline_feature_count(&self) -> usize {
        match self {
            LayerSpec::Feature(_) => 0,
            LayerSpec::Geojson(l) => l.data.feature_count(),
            LayerSpec::Graphics(l) => l.graphics.feature_count(),
        }
    }

    /// Whether the embedded content (rather than presentation) differs.
    pub fn content_differs(&self, other: &LayerSpec) -> bool {
        match (self, other) {
            (LayerSpec::Feature(a), LayerSpec::Feature(b)) => a.source != b.source,
            (LayerSpec::Geojson(a), LayerSpec::Geojson(b)) => a.data != b.data,
            (LayerSpec::Graphics(a), LayerSpec::Graphics(b)) => a.graphics != b.graphics,
            _ => true,
        }
    }
}
