use std::time::Instant;

use foundation::time::Time;

/// One pass of the host's event loop.
///
/// Hover emission is rate-limited per tick, and teardown deadlines are
/// checked once per tick. Ticks carry a monotonic [`Time`] so they can be
/// recorded and replayed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tick {
    /// 0-based tick index.
    pub index: u64,
    pub time: Time,
}

impl Tick {
    pub fn new(index: u64, time: Time) -> Self {
        Self { index, time }
    }

    pub fn next(self, time: Time) -> Self {
        Self::new(self.index + 1, time)
    }
}

/// Produces monotonic [`Time`] values relative to its creation.
#[derive(Debug, Copy, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now(&self) -> Time {
        Time(self.origin.elapsed().as_secs_f64())
    }
}
