use catalog::{Basemap, ViewMode};
use config::dimension::Dimension;
use config::map_config::{Interaction, MapConfig};
use foundation::bounds::LngLatBounds;
use foundation::geo::LngLat;
use foundation::ids::{CommandId, LayerKey, SessionId};
use layers::layer::LayerSpec;
use serde::{Deserialize, Serialize};

use crate::backend::RenderBackend;

/// One instruction for the rendering engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    CreateView {
        config: MapConfig,
        backend: RenderBackend,
    },
    /// Initial load of one layer, issued right after `CreateView`.
    LoadLayer { spec: LayerSpec },
    AddLayer { spec: LayerSpec },
    RemoveLayer { key: LayerKey },
    UpdateLayer { key: LayerKey, spec: LayerSpec },
    SwapBasemap { old: Basemap, new: Basemap },
    SetView {
        #[serde(skip_serializing_if = "Option::is_none")]
        center: Option<LngLat>,
        #[serde(skip_serializing_if = "Option::is_none")]
        zoom: Option<f64>,
    },
    /// Frame the union of `bounds` and the extents of the `remote` layers,
    /// which only the engine knows.
    FitToContent {
        bounds: Option<LngLatBounds>,
        remote: Vec<LayerKey>,
    },
    Resize { width: Dimension, height: Dimension },
    /// Replace the view, keeping the map and its layers.
    RecreateView { view_mode: ViewMode },
    SetInteraction { selection: bool, hover: bool },
    DestroyView,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateView { .. } => "create_view",
            Command::LoadLayer { .. } => "load_layer",
            Command::AddLayer { .. } => "add_layer",
            Command::RemoveLayer { .. } => "remove_layer",
            Command::UpdateLayer { .. } => "update_layer",
            Command::SwapBasemap { .. } => "swap_basemap",
            Command::SetView { .. } => "set_view",
            Command::FitToContent { .. } => "fit_to_content",
            Command::Resize { .. } => "resize",
            Command::RecreateView { .. } => "recreate_view",
            Command::SetInteraction { .. } => "set_interaction",
            Command::DestroyView => "destroy_view",
        }
    }

    /// Layer the command operates on, if any.
    pub fn layer_key(&self) -> Option<LayerKey> {
        match self {
            Command::LoadLayer { spec } | Command::AddLayer { spec } => Some(spec.key()),
            Command::RemoveLayer { key } | Command::UpdateLayer { key, .. } => Some(key.clone()),
            _ => None,
        }
    }

    pub(crate) fn set_interaction(i: Interaction) -> Self {
        Command::SetInteraction {
            selection: i.selection,
            hover: i.hover,
        }
    }
}

/// A command addressed to one session, acknowledged later by `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub session: SessionId,
    pub id: CommandId,
    pub command: Command,
}

/// Engine report for one envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Ack {
    /// The view exists; `center`/`zoom` are where the engine put the camera.
    ViewReady { center: LngLat, zoom: f64 },
    ViewFailed { reason: String },
    LayerReady {
        #[serde(default)]
        feature_count: Option<usize>,
    },
    LayerFailed { reason: String },
    Done,
}

impl Ack {
    pub fn name(&self) -> &'static str {
        match self {
            Ack::ViewReady { .. } => "view_ready",
            Ack::ViewFailed { .. } => "view_failed",
            Ack::LayerReady { .. } => "layer_ready",
            Ack::LayerFailed { .. } => "layer_failed",
            Ack::Done => "done",
        }
    }
}
