use std::collections::BTreeMap;

use config::error::ValidationError;
use config::validate::validate;
use foundation::ids::{CommandId, SessionId};
use foundation::time::Time;
use layers::geojson::content_hash;
use runtime::event_bus::{EventBus, Stamped};
use runtime::tick::Tick;
use serde_json::Value;
use tracing::{debug, info};

use crate::backend::RenderBackend;
use crate::command::{Ack, Envelope};
use crate::error::AckError;
use crate::event::{RawEngineEvent, SessionEvent};
use crate::session::{Session, Step};
use crate::settings::SessionConfig;

/// One mount point in the host page.
///
/// Holds the active session plus any released sessions still waiting for
/// removal acks. Every call takes the caller's monotonic time; calls with
/// the same time fall in the same tick.
///
/// A mount key names a slot, not a session: mounting the same key again
/// after a release creates a new incarnation whose id carries a `/n`
/// suffix, so acks for a draining predecessor never reach its successor.
#[derive(Debug)]
pub struct MapHost {
    backend: RenderBackend,
    settings: SessionConfig,
    active: Option<Session>,
    active_key: Option<SessionId>,
    incarnations: BTreeMap<SessionId, u64>,
    draining: Vec<Session>,
    events: EventBus<SessionEvent>,
    tick: Option<Tick>,
}

impl MapHost {
    pub fn new(backend: RenderBackend, settings: SessionConfig) -> Self {
        Self {
            backend,
            settings,
            active: None,
            active_key: None,
            incarnations: BTreeMap::new(),
            draining: Vec::new(),
            events: EventBus::new(),
            tick: None,
        }
    }

    /// Validates `raw` and reconciles it into the session for `key`.
    ///
    /// Without a key the session id is derived from the configuration
    /// itself, so identical arguments reuse the session and changed ones
    /// remount. A different key than last time releases the old session
    /// first. Invalid input changes nothing and dispatches nothing.
    pub fn mount_or_update(
        &mut self,
        key: Option<&str>,
        raw: &Value,
        now: Time,
    ) -> Result<Vec<Envelope>, ValidationError> {
        let config = validate(raw)?;
        let tick = self.advance(now);
        let key = match key {
            Some(k) => SessionId::new(k),
            None => SessionId::new(format!("auto:{}", content_hash(raw))),
        };

        let mut commands = Vec::new();
        if self.active_key.as_ref().is_some_and(|k| k != &key) {
            commands.extend(self.release_active(tick));
        }
        let mut session = match self.active.take() {
            Some(session) => session,
            None => {
                let id = self.incarnation(&key);
                info!(session = %id, "new session");
                Session::new(id, self.backend.clone(), self.settings)
            }
        };
        let step = session.reconcile(config, tick);
        self.active = Some(session);
        self.active_key = Some(key);
        commands.extend(self.absorb(step, tick));
        Ok(commands)
    }

    /// Routes an engine acknowledgement to its session.
    pub fn acknowledge(
        &mut self,
        session: &SessionId,
        id: CommandId,
        ack: Ack,
        now: Time,
    ) -> Result<Vec<Envelope>, AckError> {
        let tick = self.advance(now);
        let target = self
            .active
            .iter_mut()
            .chain(self.draining.iter_mut())
            .find(|s| s.id() == session)
            .ok_or_else(|| AckError::UnknownSession(session.clone()))?;
        let step = target.acknowledge(id, ack, tick)?;
        let commands = self.absorb(step, tick);
        self.prune();
        Ok(commands)
    }

    /// Normalizes a pointer event for the active session. Events for any
    /// other session are dropped.
    pub fn handle_engine_event(&mut self, session: &SessionId, raw: RawEngineEvent, now: Time) {
        let tick = self.advance(now);
        let step = match self.active.as_mut() {
            Some(active) if active.id() == session => active.handle_event(raw, tick),
            _ => {
                debug!(session = %session, "dropping engine event for inactive session");
                return;
            }
        };
        self.absorb(step, tick);
    }

    /// Releases the active session. Its teardown continues in the background
    /// until acknowledged or timed out.
    pub fn release(&mut self, now: Time) -> Vec<Envelope> {
        let tick = self.advance(now);
        self.release_active(tick)
    }

    /// Forces teardown of sessions whose wait has expired.
    pub fn tick(&mut self, now: Time) -> Vec<Envelope> {
        let tick = self.advance(now);
        let mut commands = Vec::new();
        for session in self.draining.iter_mut() {
            commands.extend(session.tick(tick).commands);
        }
        self.prune();
        commands
    }

    /// The single value the host page currently shows.
    pub fn current_event(&self) -> Option<&SessionEvent> {
        self.events.current()
    }

    pub fn drain_events(&mut self) -> Vec<Stamped<SessionEvent>> {
        self.events.drain()
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.active.as_ref()
    }

    /// Released sessions whose view is not destroyed yet.
    pub fn draining(&self) -> usize {
        self.draining.len()
    }

    fn release_active(&mut self, tick: Tick) -> Vec<Envelope> {
        self.active_key = None;
        let Some(mut session) = self.active.take() else {
            return Vec::new();
        };
        let step = session.release(tick);
        let commands = self.absorb(step, tick);
        if !session.is_torn_down() {
            self.draining.push(session);
        }
        commands
    }

    /// Session id for the next session mounted under `key`, distinct from
    /// every session still draining.
    fn incarnation(&mut self, key: &SessionId) -> SessionId {
        let count = self.incarnations.entry(key.clone()).or_insert(0);
        loop {
            let id = match *count {
                0 => key.clone(),
                n => SessionId::new(format!("{}/{n}", key.as_str())),
            };
            *count += 1;
            if !self.draining.iter().any(|s| s.id() == &id) {
                return id;
            }
        }
    }

    fn absorb(&mut self, step: Step, tick: Tick) -> Vec<Envelope> {
        for event in step.events {
            self.events.emit(tick, event);
        }
        step.commands
    }

    fn prune(&mut self) {
        self.draining.retain(|s| !s.is_torn_down());
    }

    fn advance(&mut self, now: Time) -> Tick {
        let tick = match self.tick {
            Some(last) if now <= last.time => last,
            Some(last) => last.next(now),
            None => Tick::new(0, now),
        };
        self.tick = Some(tick);
        tick
    }
}

#[cfg(test)]
mod tests {
    use super::MapHost;
    use crate::backend::RenderBackend;
    use crate::command::{Ack, Command, Envelope};
    use crate::event::{InteractionEvent, RawEngineEvent, SessionEvent};
    use crate::settings::SessionConfig;
    use config::error::ValidationError;
    use foundation::geo::LngLat;
    use foundation::ids::{LayerKey, SessionId};
    use foundation::time::Time;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn host() -> MapHost {
        MapHost::new(RenderBackend::default(), SessionConfig::default())
    }

    fn names(cmds: &[Envelope]) -> Vec<&'static str> {
        cmds.iter().map(|e| e.command.name()).collect()
    }

    fn feature(id: &str) -> Value {
        json!({"kind": "feature", "id": id, "url": format!("https://example.com/{id}/FeatureServer/0")})
    }

    fn ready() -> Ack {
        Ack::ViewReady {
            center: LngLat::new(0.0, 0.0),
            zoom: 2.0,
        }
    }

    #[test]
    fn invalid_config_dispatches_nothing() {
        let mut h = host();
        let err = h
            .mount_or_update(Some("m"), &json!({"zoom": 25}), Time(0.0))
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidZoom { given: json!(25) });
        assert!(h.active_session().is_none());
    }

    #[test]
    fn mount_then_map_loaded_is_current() {
        let mut h = host();
        let cmds = h
            .mount_or_update(
                Some("m"),
                &json!({"basemap": "topo-vector", "zoom": 4}),
                Time(0.0),
            )
            .unwrap();
        assert_eq!(names(&cmds), vec!["create_view"]);
        h.acknowledge(&SessionId::new("m"), cmds[0].id, ready(), Time(0.1))
            .unwrap();
        assert!(matches!(
            h.current_event(),
            Some(SessionEvent::Interaction(InteractionEvent::MapLoaded {
                layer_count: 0,
                zoom,
                ..
            })) if *zoom == 4.0
        ));
        assert_eq!(h.drain_events().len(), 1);
        assert!(h.current_event().is_some());
    }

    #[test]
    fn key_change_tears_down_old_session_first() {
        let mut h = host();
        let first = h
            .mount_or_update(Some("a"), &json!({"zoom": 1, "layers": [feature("L1")]}), Time(0.0))
            .unwrap();
        for e in &first {
            let ack = match e.command {
                Command::CreateView { .. } => ready(),
                _ => Ack::LayerReady { feature_count: None },
            };
            h.acknowledge(&SessionId::new("a"), e.id, ack, Time(0.1))
                .unwrap();
        }

        let cmds = h
            .mount_or_update(Some("b"), &json!({"zoom": 1}), Time(1.0))
            .unwrap();
        assert_eq!(names(&cmds), vec!["remove_layer", "create_view"]);
        assert_eq!(cmds[0].session, SessionId::new("a"));
        assert_eq!(cmds[1].session, SessionId::new("b"));
        assert_eq!(h.draining(), 1);

        let done = h
            .acknowledge(&SessionId::new("a"), cmds[0].id, Ack::Done, Time(1.1))
            .unwrap();
        assert_eq!(names(&done), vec!["destroy_view"]);
        assert_eq!(h.draining(), 0);
        assert_eq!(h.active_session().unwrap().id(), &SessionId::new("b"));
    }

    #[test]
    fn keyless_mount_follows_arguments() {
        let mut h = host();
        let raw = json!({"zoom": 3});
        let first = h.mount_or_update(None, &raw, Time(0.0)).unwrap();
        assert_eq!(names(&first), vec!["create_view"]);
        assert!(h.mount_or_update(None, &raw, Time(0.5)).unwrap().is_empty());

        let changed = h
            .mount_or_update(None, &json!({"zoom": 5}), Time(1.0))
            .unwrap();
        // Old view had nothing to remove but its create is unacknowledged.
        assert_eq!(names(&changed), vec!["create_view"]);
        assert_eq!(h.draining(), 1);
    }

    #[test]
    fn returning_to_earlier_arguments_gets_a_fresh_session_id() {
        let mut h = host();
        let a = json!({"zoom": 2, "layers": [feature("L1")]});
        let first = h.mount_or_update(None, &a, Time(0.0)).unwrap();
        let old_id = first[0].session.clone();
        h.acknowledge(&old_id, first[0].id, ready(), Time(0.1)).unwrap();
        h.acknowledge(&old_id, first[1].id, Ack::LayerReady { feature_count: None }, Time(0.2))
            .unwrap();

        let to_b = h.mount_or_update(None, &json!({"zoom": 7}), Time(1.0)).unwrap();
        assert_eq!(names(&to_b), vec!["remove_layer", "create_view"]);
        let removal = to_b[0].clone();
        assert_eq!(removal.session, old_id);

        let back = h.mount_or_update(None, &a, Time(1.5)).unwrap();
        assert_eq!(names(&back), vec!["create_view", "load_layer"]);
        let new_id = back[0].session.clone();
        assert_eq!(new_id, SessionId::new(format!("{}/1", old_id.as_str())));
        assert_eq!(h.draining(), 2);

        let done = h
            .acknowledge(&removal.session, removal.id, Ack::Done, Time(1.6))
            .unwrap();
        assert_eq!(names(&done), vec!["destroy_view"]);
        assert_eq!(done[0].session, old_id);
        assert_eq!(h.draining(), 1);
        let active = h.active_session().unwrap();
        assert_eq!(active.id(), &new_id);
        assert_eq!(active.outstanding(), 2);
    }

    #[test]
    fn same_key_after_release_is_a_new_incarnation() {
        let mut h = host();
        let first = h
            .mount_or_update(Some("m"), &json!({"layers": [feature("L1")]}), Time(0.0))
            .unwrap();
        assert_eq!(first[0].session, SessionId::new("m"));
        h.release(Time(1.0));
        let again = h
            .mount_or_update(Some("m"), &json!({"layers": [feature("L1")]}), Time(2.0))
            .unwrap();
        assert_eq!(names(&again), vec!["create_view", "load_layer"]);
        assert_eq!(again[0].session, SessionId::new("m/1"));
        assert_eq!(h.draining(), 1);

        // An explicit key that looks like an incarnation id stays distinct.
        let other = h
            .mount_or_update(Some("m/2"), &json!({"zoom": 1}), Time(3.0))
            .unwrap();
        assert_eq!(names(&other), vec!["remove_layer", "create_view"]);
        h.release(Time(4.0));
        let third = h
            .mount_or_update(Some("m"), &json!({"zoom": 1}), Time(5.0))
            .unwrap();
        assert_eq!(third[0].session, SessionId::new("m/3"));
    }

    #[test]
    fn tick_forces_stuck_teardown() {
        let mut h = host();
        h.mount_or_update(Some("m"), &json!({"layers": [feature("L1")]}), Time(0.0))
            .unwrap();
        let release = h.release(Time(1.0));
        assert_eq!(names(&release), vec!["remove_layer"]);
        assert!(h.tick(Time(5.9)).is_empty());
        assert_eq!(names(&h.tick(Time(6.0))), vec!["destroy_view"]);
        assert_eq!(h.draining(), 0);
        assert!(h.release(Time(7.0)).is_empty());
    }

    #[test]
    fn events_for_other_sessions_are_dropped() {
        let mut h = host();
        h.mount_or_update(Some("m"), &json!({"zoom": 1}), Time(0.0))
            .unwrap();
        h.handle_engine_event(
            &SessionId::new("other"),
            RawEngineEvent::PointerLeave,
            Time(0.1),
        );
        h.handle_engine_event(
            &SessionId::new("m"),
            RawEngineEvent::Click {
                map_point: LngLat::new(3.0, 4.0),
                screen_point: foundation::geo::ScreenPoint::new(1, 1),
                hit: None,
            },
            Time(0.2),
        );
        let events = h.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tick_index, 2);
        assert!(
            h.acknowledge(&SessionId::new("other"), foundation::ids::CommandId(0), Ack::Done, Time(0.3))
                .is_err()
        );
    }

    #[test]
    fn layer_failure_reaches_caller_as_event() {
        let mut h = host();
        let id = SessionId::new("m");
        let cmds = h
            .mount_or_update(Some("m"), &json!({"zoom": 1, "layers": [feature("bad")]}), Time(0.0))
            .unwrap();
        h.acknowledge(&id, cmds[0].id, ready(), Time(0.1)).unwrap();
        h.acknowledge(
            &id,
            cmds[1].id,
            Ack::LayerFailed {
                reason: "token expired".to_string(),
            },
            Time(0.2),
        )
        .unwrap();
        let events: Vec<SessionEvent> = h.drain_events().into_iter().map(|s| s.event).collect();
        assert_eq!(
            events[0],
            SessionEvent::LayerLoadFailed {
                key: LayerKey::new("bad"),
                reason: "token expired".to_string()
            }
        );
        assert!(matches!(
            events[1].as_interaction(),
            Some(InteractionEvent::MapLoaded { layer_count: 0, .. })
        ));
    }

    #[test]
    fn independent_hosts_reconcile_concurrently() {
        fn is_send<T: Send>() {}
        is_send::<MapHost>();

        let scripts: Vec<(&str, Vec<Value>)> = vec![
            (
                "left",
                vec![
                    json!({"zoom": 2, "layers": [feature("A"), feature("B")]}),
                    json!({"zoom": 2, "layers": [feature("B"), feature("C")]}),
                ],
            ),
            (
                "right",
                vec![
                    json!({"basemap": "osm", "center": [10.0, 50.0], "zoom": 6}),
                    json!({"basemap": "satellite", "center": [10.0, 50.0], "zoom": 6}),
                ],
            ),
        ];
        let results: Vec<Vec<&'static str>> = std::thread::scope(|scope| {
            let handles: Vec<_> = scripts
                .iter()
                .map(|(key, configs)| {
                    scope.spawn(move || {
                        let mut h = host();
                        let mut out = Vec::new();
                        for (i, raw) in configs.iter().enumerate() {
                            let cmds = h.mount_or_update(Some(*key), raw, Time(i as f64)).unwrap();
                            out.extend(names(&cmds));
                        }
                        out
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(
            results[0],
            vec![
                "create_view",
                "load_layer",
                "load_layer",
                "remove_layer",
                "add_layer"
            ]
        );
        assert_eq!(results[1], vec!["create_view", "swap_basemap"]);
    }
}
