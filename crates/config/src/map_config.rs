use catalog::{Basemap, ViewMode};
use foundation::geo::LngLat;
use foundation::ids::LayerKey;
use layers::layer::LayerSpec;
use serde::Serialize;

use crate::dimension::Dimension;

/// Which pointer interactions the engine should report.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Interaction {
    pub selection: bool,
    pub hover: bool,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            selection: true,
            hover: true,
        }
    }
}

/// Canonical, validated map configuration.
///
/// Only [`crate::validate`] builds one; there are no setters. A changed
/// configuration is a new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapConfig {
    pub(crate) width: Dimension,
    pub(crate) height: Dimension,
    pub(crate) basemap: Basemap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) center: Option<LngLat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) zoom: Option<f64>,
    pub(crate) view_mode: ViewMode,
    pub(crate) layers: Vec<LayerSpec>,
    pub(crate) interaction: Interaction,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: Dimension::DEFAULT_WIDTH,
            height: Dimension::DEFAULT_HEIGHT,
            basemap: Basemap::default(),
            center: None,
            zoom: None,
            view_mode: ViewMode::default(),
            layers: Vec::new(),
            interaction: Interaction::default(),
        }
    }
}

impl MapConfig {
    pub fn width(&self) -> Dimension {
        self.width
    }

    pub fn height(&self) -> Dimension {
        self.height
    }

    pub fn basemap(&self) -> Basemap {
        self.basemap
    }

    pub fn center(&self) -> Option<LngLat> {
        self.center
    }

    pub fn zoom(&self) -> Option<f64> {
        self.zoom
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Layers in canonical order.
    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    /// No explicit camera: the view should frame the layer content.
    pub fn auto_fit(&self) -> bool {
        self.center.is_none() && self.zoom.is_none()
    }

    pub fn layer_keys(&self) -> Vec<LayerKey> {
        self.layers.iter().map(LayerSpec::key).collect()
    }
}
