use std::collections::BTreeMap;

use foundation::ids::{FeatureKey, LayerKey};

use crate::feature::FeatureRef;

/// Deterministic selection set keyed by [`FeatureKey`].
///
/// Ordering contract:
/// - Iteration yields features in ascending key order.
///
/// Toggle law: `toggle(toggle(S, X), X) == S`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSet {
    features: BTreeMap<FeatureKey, FeatureRef>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.features.is_empty();
        self.features.clear();
        changed
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Inserts `feature` into the set.
    ///
    /// Returns `true` if the set changed.
    pub fn insert(&mut self, feature: FeatureRef) -> bool {
        if self.features.contains_key(&feature.key) {
            return false;
        }
        self.features.insert(feature.key.clone(), feature);
        true
    }

    /// Removes the feature with `key`.
    ///
    /// Returns `true` if the set changed.
    pub fn remove(&mut self, key: &FeatureKey) -> bool {
        self.features.remove(key).is_some()
    }

    /// Adds the feature if absent, removes it if present.
    ///
    /// Returns `true` if the feature is selected afterwards.
    pub fn toggle(&mut self, feature: FeatureRef) -> bool {
        if self.remove(&feature.key) {
            return false;
        }
        self.insert(feature);
        true
    }

    /// Drops every selected feature belonging to `layer`.
    ///
    /// Returns `true` if the set changed.
    pub fn remove_layer(&mut self, layer: &LayerKey) -> bool {
        let before = self.features.len();
        self.features.retain(|_, f| &f.layer != layer);
        self.features.len() != before
    }

    /// Snapshot of the full set, in key order.
    pub fn to_vec(&self) -> Vec<FeatureRef> {
        self.features.values().cloned().collect()
    }
}
