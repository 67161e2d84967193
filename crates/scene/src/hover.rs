use foundation::ids::FeatureKey;
use foundation::time::Time;
use runtime::tick::Tick;

/// Default minimum spacing between hover emissions.
pub const DEFAULT_HOVER_DEBOUNCE_S: f64 = 0.100;

/// Rate limiter for hover events.
///
/// Rules, checked in order:
/// - staying on (or re-entering without leaving) the last emitted feature
///   never re-emits;
/// - at most one emission per tick;
/// - at least `window_s` seconds between two emissions.
///
/// A suppressed offer does not become the current feature, so the next
/// pointer move over it after the window emits normally.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverGate {
    window_s: f64,
    current: Option<FeatureKey>,
    last_emit: Option<(u64, Time)>,
}

impl HoverGate {
    pub fn new(window_s: f64) -> Self {
        Self {
            window_s: window_s.max(0.0),
            current: None,
            last_emit: None,
        }
    }

    /// Returns `true` if a hover event for `feature` should be emitted now.
    pub fn offer(&mut self, tick: Tick, feature: &FeatureKey) -> bool {
        if self.current.as_ref() == Some(feature) {
            return false;
        }
        if let Some((index, at)) = self.last_emit {
            if index == tick.index || tick.time.since(at) < self.window_s {
                return false;
            }
        }
        self.current = Some(feature.clone());
        self.last_emit = Some((tick.index, tick.time));
        true
    }

    /// Pointer left all features.
    pub fn leave(&mut self) {
        self.current = None;
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.last_emit = None;
    }
}
