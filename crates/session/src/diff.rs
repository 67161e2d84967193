//! Pure configuration diff.
//!
//! Command order within one diff:
//! 1. `RemoveLayer` for every old key that is gone or changed kind, in old
//!    list order, so peak resource use stays bounded;
//! 2. view changes: `RecreateView`, `Resize`, `SwapBasemap`, `SetInteraction`;
//! 3. `UpdateLayer` for kept keys whose definition changed, in new list order;
//! 4. `AddLayer` for new keys, in new list order;
//! 5. camera: `SetView` or `FitToContent`.

use std::collections::BTreeMap;

use config::map_config::MapConfig;
use foundation::bounds::union_all;
use foundation::ids::LayerKey;
use layers::layer::LayerSpec;
use tracing::debug;

use crate::command::Command;

/// Commands that take the engine from `old` to `new`. Empty when equal.
pub fn plan(old: &MapConfig, new: &MapConfig) -> Vec<Command> {
    let old_layers = by_key(old.layers());
    let new_layers = by_key(new.layers());
    let mut out = Vec::new();
    let mut content_changed = false;

    for spec in old.layers() {
        let key = spec.key();
        let keep = new_layers
            .get(&key)
            .is_some_and(|next| next.kind() == spec.kind());
        if !keep {
            debug!(key = %key, "layer removed");
            content_changed = true;
            out.push(Command::RemoveLayer { key });
        }
    }

    if old.view_mode() != new.view_mode() {
        out.push(Command::RecreateView {
            view_mode: new.view_mode(),
        });
    }
    if old.width() != new.width() || old.height() != new.height() {
        out.push(Command::Resize {
            width: new.width(),
            height: new.height(),
        });
    }
    if old.basemap() != new.basemap() {
        out.push(Command::SwapBasemap {
            old: old.basemap(),
            new: new.basemap(),
        });
    }
    if old.interaction() != new.interaction() {
        out.push(Command::set_interaction(new.interaction()));
    }

    let mut adds = Vec::new();
    for spec in new.layers() {
        let key = spec.key();
        match old_layers.get(&key) {
            Some(prev) if prev.kind() == spec.kind() => {
                if *prev != spec {
                    content_changed |= prev.content_differs(spec);
                    debug!(key = %key, "layer updated in place");
                    out.push(Command::UpdateLayer {
                        key,
                        spec: spec.clone(),
                    });
                }
            }
            _ => {
                debug!(key = %key, "layer added");
                content_changed = true;
                adds.push(Command::AddLayer { spec: spec.clone() });
            }
        }
    }
    out.extend(adds);

    if new.auto_fit() {
        let fit = fit_to_content(new);
        let has_content = matches!(
            &fit,
            Command::FitToContent { bounds, remote } if bounds.is_some() || !remote.is_empty()
        );
        if !old.auto_fit() || (content_changed && has_content) {
            out.push(fit);
        }
    } else if old.center() != new.center() || old.zoom() != new.zoom() {
        out.push(Command::SetView {
            center: new.center(),
            zoom: new.zoom(),
        });
    }
    out
}

/// Frames every layer: inline content by its bounds, remote layers by key.
pub fn fit_to_content(config: &MapConfig) -> Command {
    let bounds = union_all(config.layers().iter().map(LayerSpec::inline_bounds));
    let remote = config
        .layers()
        .iter()
        .filter(|l| l.is_remote())
        .map(LayerSpec::key)
        .collect();
    Command::FitToContent { bounds, remote }
}

fn by_key(layers: &[LayerSpec]) -> BTreeMap<LayerKey, &LayerSpec> {
    layers.iter().map(|l| (l.key(), l)).collect()
}
