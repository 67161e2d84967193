use crate::tick::Tick;

/// An event stamped with the tick it was emitted on.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<E> {
    pub tick_index: u64,
    pub event: E,
}

/// Outbox for events produced while handling host calls.
///
/// The host sees exactly one "current" value (the latest emitted event);
/// consumers that want the full stream drain it.
#[derive(Debug)]
pub struct EventBus<E> {
    events: Vec<Stamped<E>>,
    current: Option<E>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            current: None,
        }
    }
}

impl<E: Clone> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, tick: Tick, event: E) {
        self.current = Some(event.clone());
        self.events.push(Stamped {
            tick_index: tick.index,
            event,
        });
    }

    /// The single visible value; survives `drain`.
    pub fn current(&self) -> Option<&E> {
        self.current.as_ref()
    }

    pub fn drain(&mut self) -> Vec<Stamped<E>> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;
    use crate::tick::Tick;
    use foundation::time::Time;

    #[test]
    fn records_events_with_tick_index() {
        let mut bus = EventBus::new();
        bus.emit(Tick::new(2, Time(0.1)), "hello");
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].tick_index, 2);
    }

    #[test]
    fn drain_clears_events_but_keeps_current() {
        let mut bus = EventBus::new();
        bus.emit(Tick::new(0, Time(0.0)), "a");
        bus.emit(Tick::new(0, Time(0.0)), "b");
        let drained = bus.drain();
        assert_eq!(drained.len(), 2);
        assert!(bus.drain().is_empty());
        assert_eq!(bus.current(), Some(&"b"));
    }
}
