use foundation::time::Time;

/// Bounded wait expressed against the monotonic timebase.
///
/// Used where an external acknowledgement may never arrive and the caller
/// must force-proceed after a fixed interval.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Deadline {
    at: Time,
}

impl Deadline {
    pub fn after(now: Time, wait_s: f64) -> Self {
        Self {
            at: now.add_secs(wait_s.max(0.0)),
        }
    }

    pub fn is_expired(&self, now: Time) -> bool {
        now >= self.at
    }
}
