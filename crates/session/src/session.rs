use std::collections::BTreeSet;

use config::map_config::MapConfig;
use foundation::geo::LngLat;
use foundation::ids::{CommandId, LayerKey, SessionId};
use runtime::deadline::Deadline;
use runtime::pending::PendingOps;
use runtime::tick::Tick;
use scene::hover::HoverGate;
use scene::selection::SelectionSet;
use tracing::{debug, info, warn};

use crate::backend::RenderBackend;
use crate::command::{Ack, Command, Envelope};
use crate::diff::plan;
use crate::error::{AckError, TeardownError};
use crate::event::{InteractionEvent, RawEngineEvent, SessionEvent};
use crate::settings::SessionConfig;

/// Lifecycle of one session.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SessionState {
    /// No view exists (never mounted, or view creation failed).
    Unmounted,
    Mounted,
    /// Layer removals are out; `DestroyView` follows once they are
    /// acknowledged or the deadline passes.
    TearingDown { deadline: Deadline, started: Tick },
    TornDown,
}

/// What one call produced: commands for the engine, events for the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    pub commands: Vec<Envelope>,
    pub events: Vec<SessionEvent>,
}

impl Step {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.events.is_empty()
    }
}

/// An engine operation awaiting acknowledgement.
#[derive(Debug, Clone, PartialEq)]
enum Op {
    CreateView,
    RecreateView,
    Load { key: LayerKey, inline_count: usize },
    Update { key: LayerKey },
    Remove { key: LayerKey },
    Other(&'static str),
}

impl Op {
    fn for_command(command: &Command) -> Self {
        match command {
            Command::CreateView { .. } => Op::CreateView,
            Command::RecreateView { .. } => Op::RecreateView,
            Command::LoadLayer { spec } | Command::AddLayer { spec } => Op::Load {
                key: spec.key(),
                inline_count: spec.inline_feature_count(),
            },
            Command::UpdateLayer { key, .. } => Op::Update { key: key.clone() },
            Command::RemoveLayer { key } => Op::Remove { key: key.clone() },
            other => Op::Other(other.name()),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Op::CreateView => "create_view",
            Op::RecreateView => "recreate_view",
            Op::Load { .. } => "load_layer",
            Op::Update { .. } => "update_layer",
            Op::Remove { .. } => "remove_layer",
            Op::Other(name) => *name,
        }
    }

    /// Adds and updates aimed at `key`; removals are never canceled.
    fn targets(&self, key: &LayerKey) -> bool {
        match self {
            Op::Load { key: k, .. } | Op::Update { key: k } => k == key,
            _ => false,
        }
    }

    fn accepts(&self, ack: &Ack) -> bool {
        match self {
            Op::CreateView => matches!(ack, Ack::ViewReady { .. } | Ack::ViewFailed { .. }),
            Op::RecreateView => {
                matches!(ack, Ack::ViewReady { .. } | Ack::ViewFailed { .. } | Ack::Done)
            }
            Op::Load { .. } => matches!(ack, Ack::LayerReady { .. } | Ack::LayerFailed { .. }),
            Op::Update { .. } => {
                matches!(ack, Ack::LayerReady { .. } | Ack::LayerFailed { .. } | Ack::Done)
            }
            Op::Remove { .. } | Op::Other(_) => matches!(ack, Ack::Done),
        }
    }
}

/// Progress toward the one `MapLoaded` event of a mount.
#[derive(Debug, Clone, Default)]
struct MountProgress {
    camera: Option<(LngLat, f64)>,
    waiting: BTreeSet<CommandId>,
    feature_count: usize,
    layer_count: usize,
}

/// One mounted map.
///
/// Holds the applied configuration, the selection, and the commands still
/// awaiting acknowledgement. No event history is kept.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    backend: RenderBackend,
    settings: SessionConfig,
    state: SessionState,
    applied: Option<MapConfig>,
    selection: SelectionSet,
    hover: HoverGate,
    pending: PendingOps<Op>,
    progress: Option<MountProgress>,
}

impl Session {
    pub fn new(id: SessionId, backend: RenderBackend, settings: SessionConfig) -> Self {
        Self {
            id,
            backend,
            hover: HoverGate::new(settings.hover_debounce_s),
            settings,
            state: SessionState::Unmounted,
            applied: None,
            selection: SelectionSet::new(),
            pending: PendingOps::new(),
            progress: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_torn_down(&self) -> bool {
        self.state == SessionState::TornDown
    }

    pub fn config(&self) -> Option<&MapConfig> {
        self.applied.as_ref()
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn backend(&self) -> &RenderBackend {
        &self.backend
    }

    /// Commands dispatched but not yet acknowledged, canceled ones excluded.
    pub fn outstanding(&self) -> usize {
        self.pending.live().count()
    }

    /// Applies `next`: mounts on first call, diffs afterwards.
    pub fn reconcile(&mut self, next: MapConfig, tick: Tick) -> Step {
        let mut step = Step::default();
        match self.state {
            SessionState::Unmounted => self.mount(next, &mut step),
            SessionState::Mounted => self.update(next, &mut step),
            SessionState::TearingDown { .. } | SessionState::TornDown => {
                debug!(session = %self.id, "reconcile after release ignored");
            }
        }
        self.maybe_loaded(tick, &mut step);
        step
    }

    fn mount(&mut self, next: MapConfig, step: &mut Step) {
        info!(session = %self.id, layers = next.layers().len(), "mounting map view");
        let mut progress = MountProgress::default();
        self.dispatch(
            Command::CreateView {
                config: next.clone(),
                backend: self.backend.clone(),
            },
            step,
        );
        for spec in next.layers() {
            let id = self.dispatch(Command::LoadLayer { spec: spec.clone() }, step);
            progress.waiting.insert(id);
        }
        self.progress = Some(progress);
        self.applied = Some(next);
        self.state = SessionState::Mounted;
    }

    fn update(&mut self, next: MapConfig, step: &mut Step) {
        let Some(old) = self.applied.take() else {
            self.mount(next, step);
            return;
        };
        let commands = plan(&old, &next);
        let mut selection_changed = false;
        for command in commands {
            if let Command::RemoveLayer { key } = &command {
                self.cancel_layer_ops(key);
                selection_changed |= self.selection.remove_layer(key);
            }
            self.dispatch(command, step);
        }

        let (was, now) = (old.interaction(), next.interaction());
        if was.selection && !now.selection {
            self.selection.clear();
            selection_changed = true;
        }
        if !now.hover {
            self.hover.reset();
        }
        if selection_changed {
            step.events
                .push(InteractionEvent::selected(self.selection.to_vec()).into());
        }
        self.applied = Some(next);
    }

    /// Cancels in-flight adds and updates for a layer that is being removed.
    /// Their late acks are ignored; the removal follows them on the wire.
    fn cancel_layer_ops(&mut self, key: &LayerKey) {
        let canceled = self.pending.cancel_where(|op| op.targets(key));
        if canceled.is_empty() {
            return;
        }
        debug!(session = %self.id, key = %key, count = canceled.len(), "canceled in-flight layer ops");
        if let Some(progress) = self.progress.as_mut() {
            for id in &canceled {
                progress.waiting.remove(id);
            }
        }
    }

    fn dispatch(&mut self, command: Command, step: &mut Step) -> CommandId {
        let id = match command {
            Command::DestroyView => self.pending.next_id(),
            ref other => self.pending.submit(Op::for_command(other)),
        };
        debug!(
            session = %self.id,
            %id,
            command = command.name(),
            layer = ?command.layer_key(),
            "dispatch"
        );
        step.commands.push(Envelope {
            session: self.id.clone(),
            id,
            command,
        });
        id
    }

    /// Applies an engine acknowledgement for command `id`.
    pub fn acknowledge(&mut self, id: CommandId, ack: Ack, tick: Tick) -> Result<Step, AckError> {
        let mut step = Step::default();
        let Some(op) = self.pending.get(id) else {
            if matches!(self.state, SessionState::TearingDown { .. }) {
                let err = TeardownError::UnknownAck(id);
                warn!(session = %self.id, error = %err, "teardown");
                return Ok(step);
            }
            return Err(AckError::UnknownCommand {
                session: self.id.clone(),
                id,
            });
        };
        if !op.accepts(&ack) {
            return Err(AckError::UnexpectedAck {
                id,
                command: op.name(),
                ack: ack.name(),
            });
        }
        let Some(settled) = self.pending.settle(id) else {
            return Err(AckError::UnknownCommand {
                session: self.id.clone(),
                id,
            });
        };
        if settled.canceled {
            debug!(session = %self.id, %id, "ignoring ack for canceled command");
            return Ok(step);
        }

        match self.state {
            SessionState::Mounted => self.apply_ack(id, settled.payload, ack, &mut step),
            SessionState::TearingDown { .. } => match (settled.payload, ack) {
                (Op::CreateView, Ack::ViewFailed { reason }) => {
                    self.abandon_teardown(reason, &mut step);
                }
                (_, ack) => {
                    debug!(session = %self.id, %id, ack = ack.name(), "ack during teardown");
                    self.maybe_destroy(&mut step);
                }
            },
            SessionState::Unmounted | SessionState::TornDown => {}
        }
        self.maybe_loaded(tick, &mut step);
        Ok(step)
    }

    fn apply_ack(&mut self, id: CommandId, op: Op, ack: Ack, step: &mut Step) {
        match (op, ack) {
            (Op::CreateView, Ack::ViewReady { center, zoom }) => {
                if let (Some(progress), Some(config)) = (self.progress.as_mut(), &self.applied) {
                    progress.camera = Some((
                        config.center().unwrap_or(center),
                        config.zoom().unwrap_or(zoom),
                    ));
                }
            }
            (Op::CreateView | Op::RecreateView, Ack::ViewFailed { reason }) => {
                self.view_failed(reason, step);
            }
            (Op::Load { key, inline_count }, Ack::LayerReady { feature_count }) => {
                debug!(session = %self.id, key = %key, "layer ready");
                if let Some(progress) = self.progress.as_mut() {
                    if progress.waiting.remove(&id) {
                        progress.layer_count += 1;
                        progress.feature_count += feature_count.unwrap_or(inline_count);
                    }
                }
            }
            (Op::Load { key, .. } | Op::Update { key }, Ack::LayerFailed { reason }) => {
                warn!(session = %self.id, key = %key, %reason, "layer failed to load");
                if let Some(progress) = self.progress.as_mut() {
                    progress.waiting.remove(&id);
                }
                step.events
                    .push(SessionEvent::LayerLoadFailed { key, reason });
            }
            _ => {}
        }
    }

    fn view_failed(&mut self, reason: String, step: &mut Step) {
        warn!(session = %self.id, %reason, "view creation failed");
        self.pending.cancel_all();
        self.applied = None;
        self.progress = None;
        self.selection.clear();
        self.hover.reset();
        self.state = SessionState::Unmounted;
        step.events.push(SessionEvent::ViewCreationFailed { reason });
    }

    /// The view never came up, so there is nothing to destroy.
    fn abandon_teardown(&mut self, reason: String, step: &mut Step) {
        warn!(session = %self.id, %reason, "view creation failed during teardown");
        self.pending.clear();
        self.applied = None;
        self.state = SessionState::TornDown;
        step.events.push(SessionEvent::ViewCreationFailed { reason });
    }

    fn maybe_loaded(&mut self, tick: Tick, step: &mut Step) {
        let ready = self
            .progress
            .as_ref()
            .is_some_and(|p| p.camera.is_some() && p.waiting.is_empty());
        if !ready {
            return;
        }
        let (Some(progress), Some(config)) = (self.progress.take(), &self.applied) else {
            return;
        };
        let Some((center, zoom)) = progress.camera else {
            return;
        };
        info!(
            session = %self.id,
            tick = tick.index,
            layers = progress.layer_count,
            "map loaded"
        );
        step.events.push(
            InteractionEvent::MapLoaded {
                basemap_id: config.basemap(),
                center,
                zoom,
                feature_count: progress.feature_count,
                layer_count: progress.layer_count,
            }
            .into(),
        );
    }

    /// Normalizes one engine pointer event.
    pub fn handle_event(&mut self, raw: RawEngineEvent, tick: Tick) -> Step {
        let mut step = Step::default();
        if self.state != SessionState::Mounted {
            debug!(session = %self.id, "dropping engine event for unmounted session");
            return step;
        }
        let interaction = self
            .applied
            .as_ref()
            .map(MapConfig::interaction)
            .unwrap_or_default();

        match raw {
            RawEngineEvent::Click {
                map_point,
                screen_point,
                hit,
            } => {
                let hit_feature = hit.map(|h| h.into_feature());
                step.events.push(
                    InteractionEvent::MapClicked {
                        coords: map_point,
                        screen_point,
                        hit_feature: hit_feature.clone(),
                    }
                    .into(),
                );
                if let (Some(feature), true) = (hit_feature, interaction.selection) {
                    let selected = self.selection.toggle(feature);
                    debug!(session = %self.id, selected, count = self.selection.len(), "selection toggled");
                    step.events
                        .push(InteractionEvent::selected(self.selection.to_vec()).into());
                }
            }
            RawEngineEvent::PointerMove { hit: Some(hit) } if interaction.hover => {
                let feature = hit.into_feature();
                if self.hover.offer(tick, &feature.key) {
                    step.events
                        .push(InteractionEvent::FeatureHovered { feature }.into());
                }
            }
            RawEngineEvent::PointerMove { .. } | RawEngineEvent::PointerLeave => {
                self.hover.leave();
            }
        }
        step
    }

    /// Starts teardown. Removes every layer, then destroys the view once
    /// nothing is outstanding. Idempotent.
    pub fn release(&mut self, tick: Tick) -> Step {
        let mut step = Step::default();
        match self.state {
            SessionState::Unmounted => {
                info!(session = %self.id, "released before mount");
                self.pending.clear();
                self.state = SessionState::TornDown;
            }
            SessionState::Mounted => {
                info!(session = %self.id, outstanding = self.outstanding(), "tearing down");
                let keys = self
                    .applied
                    .as_ref()
                    .map(MapConfig::layer_keys)
                    .unwrap_or_default();
                for key in keys {
                    self.dispatch(Command::RemoveLayer { key }, &mut step);
                }
                self.progress = None;
                self.selection.clear();
                self.hover.reset();
                self.state = SessionState::TearingDown {
                    deadline: Deadline::after(tick.time, self.settings.teardown_wait_s),
                    started: tick,
                };
                self.maybe_destroy(&mut step);
            }
            SessionState::TearingDown { .. } | SessionState::TornDown => {
                debug!(session = %self.id, "release ignored, already released");
            }
        }
        step
    }

    /// Forces `DestroyView` once the teardown deadline has passed.
    pub fn tick(&mut self, tick: Tick) -> Step {
        let mut step = Step::default();
        if let SessionState::TearingDown { deadline, started } = self.state {
            if deadline.is_expired(tick.time) {
                let err = TeardownError::ForcedDestroy {
                    outstanding: self.outstanding(),
                    waited_s: tick.time.since(started.time),
                };
                warn!(session = %self.id, error = %err, "teardown");
                self.destroy(&mut step);
            }
        }
        step
    }

    fn maybe_destroy(&mut self, step: &mut Step) {
        if self.outstanding() == 0 {
            self.destroy(step);
        }
    }

    fn destroy(&mut self, step: &mut Step) {
        if self.state == SessionState::TornDown {
            return;
        }
        self.dispatch(Command::DestroyView, step);
        self.pending.clear();
        self.applied = None;
        self.state = SessionState::TornDown;
        info!(session = %self.id, "view destroyed");
    }
}
