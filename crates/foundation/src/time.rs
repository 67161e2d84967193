use serde::{Deserialize, Serialize};

/// Monotonic timestamp in seconds since an arbitrary origin.
///
/// Only differences are meaningful. Callers feed these in explicitly so
/// debounce windows and deadlines stay deterministic under test.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn from_millis(ms: u64) -> Self {
        Time(ms as f64 / 1000.0)
    }

    pub fn seconds(&self) -> f64 {
        self.0
    }

    pub fn add_secs(self, secs: f64) -> Self {
        Time(self.0 + secs)
    }

    /// Seconds elapsed since `earlier`, clamped at zero.
    pub fn since(self, earlier: Time) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }
}
