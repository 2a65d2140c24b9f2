//! The session engine.
//!
//! Owns one session at a time and drives it against the story graph:
//! delivers node messages with pacing, offers choices, resolves the taken
//! choice, starts decay at the telemetry milestone and stops it at an
//! ending. Every public operation returns a [`Flow`] saying whether it ran
//! to completion or was pre-empted by a command that arrived while the
//! engine was pausing between messages.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use meridian_core::clock::Clock;
use meridian_core::command::Command;
use meridian_core::error::DomainError;
use meridian_core::repository::SnapshotRepository;
use meridian_core::rng::DeterministicRng;
use meridian_story::{Choice, ChoiceKind, Ending, StoryGraph, Terminal};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::config::EngineConfig;
use super::handle::SessionHandle;
use super::lock;
use super::presenter::{Presenter, Sender, SessionSummary};
use super::timers::{DecayTimers, TickContext};
use crate::domain::commands::{CommandKind, SessionCommand};
use crate::domain::resolver::{self, ActionDirective};
use crate::domain::resources::{ResourceLevels, ResourceModel};
use crate::domain::rewind::{RewindEntry, RewindManager};
use crate::domain::save_code::{self, SaveCode};
use crate::domain::snapshot::SessionSnapshot;
use crate::domain::state::{SessionPhase, SessionState};

/// Random source shared with the decay timers.
pub type SharedRng = Arc<Mutex<dyn DeterministicRng>>;

const INBOX_CAPACITY: usize = 32;

const TELEMETRY_NOTICE: &str = "TELEMETRY LINK ESTABLISHED. MONITORING LIFE SIGNS.";
const SIGNAL_CORRUPTED_NOTICE: &str = "SIGNAL CORRUPTED. REACQUIRING FROM ORIGIN...";
const INVALID_CODE_NOTICE: &str = "INVALID CODE. CHECK THE DIGITS AND TRY AGAIN.";
const CODE_ACCEPTED_NOTICE: &str = "SAVE CODE ACCEPTED. RE-ESTABLISHING LINK...";
const RESUMED_NOTICE: &str = "LINK RESTORED. RESUMING TRANSMISSION...";

/// How an engine operation finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Ran to completion; the engine is waiting for the next command.
    Settled,
    /// A command arrived during a pause and abandoned the operation. It has
    /// not been handled yet.
    Preempted(SessionCommand),
    /// The engine has shut down.
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryMode {
    /// Entered by a choice or a start.
    Fresh,
    /// Re-entered by a rewind. Effects apply again.
    Replay,
    /// Re-entered from a save code or snapshot. Effects are already in the
    /// restored levels.
    Resume,
}

/// `Err` carries the command that pre-empted delivery.
type Delivery = Result<(), SessionCommand>;

/// Drives a narrative session.
pub struct SessionEngine {
    story: Arc<StoryGraph>,
    presenter: Arc<dyn Presenter>,
    snapshots: Arc<dyn SnapshotRepository>,
    clock: Arc<dyn Clock>,
    rng: SharedRng,
    config: EngineConfig,
    state: Arc<Mutex<SessionState>>,
    rewind: RewindManager,
    timers: Option<DecayTimers>,
    node_entry_mark: usize,
    inbox: mpsc::Receiver<SessionCommand>,
    inbox_closed: bool,
}

impl SessionEngine {
    /// Creates an engine and the handle that feeds its command inbox. The
    /// session is `NotStarted` until [`Self::start_session`],
    /// [`Self::resume_or_start`] or [`Self::run`] is called.
    #[must_use]
    pub fn new(
        story: Arc<StoryGraph>,
        presenter: Arc<dyn Presenter>,
        snapshots: Arc<dyn SnapshotRepository>,
        clock: Arc<dyn Clock>,
        rng: SharedRng,
        config: EngineConfig,
    ) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let state = SessionState::new(
            Uuid::now_v7(),
            story.start_id(),
            clock.now(),
            config.start_fast,
        );
        let engine = Self {
            story,
            presenter,
            snapshots,
            clock,
            rng,
            config,
            state: Arc::new(Mutex::new(state)),
            rewind: RewindManager::new(),
            timers: None,
            node_entry_mark: 0,
            inbox,
            inbox_closed: false,
        };
        (engine, SessionHandle::new(sender))
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.with_state(|s| s.phase.clone())
    }

    /// Current resource levels.
    #[must_use]
    pub fn resources(&self) -> ResourceLevels {
        self.with_state(|s| s.resources.snapshot())
    }

    /// Number of decisions that can be rewound.
    #[must_use]
    pub fn rewind_depth(&self) -> usize {
        self.rewind.depth()
    }

    /// Whether pacing pauses are collapsed.
    #[must_use]
    pub fn is_fast_mode(&self) -> bool {
        self.with_state(|s| s.fast_mode)
    }

    /// Whether decay timers are running.
    #[must_use]
    pub fn decay_running(&self) -> bool {
        self.timers.is_some()
    }

    /// Lossless copy of the session.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.with_state(|s| SessionSnapshot::capture(s, &self.rewind))
    }

    /// Resumes from the stored snapshot, or starts a new session when there
    /// is none or it cannot be trusted.
    pub async fn resume_or_start(&mut self) -> Flow {
        match self.load_snapshot().await {
            Some(snapshot) => self.resume(snapshot).await,
            None => self.start_session().await,
        }
    }

    /// Starts a new session at the start node.
    pub async fn start_session(&mut self) -> Flow {
        let fast_mode = self.config.start_fast;
        self.begin(fast_mode).await
    }

    /// Processes commands until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        let mut flow = self.resume_or_start().await;
        loop {
            let command = match flow {
                Flow::Shutdown => break,
                Flow::Preempted(command) => command,
                Flow::Settled => match self.inbox.recv().await {
                    Some(command) => command,
                    None => {
                        self.shutdown().await;
                        break;
                    }
                },
            };
            flow = self.dispatch(command).await;
        }
    }

    /// Handles one command.
    #[instrument(
        skip(self, command),
        fields(correlation_id = %command.correlation_id, command = command.command_type())
    )]
    pub async fn dispatch(&mut self, command: SessionCommand) -> Flow {
        match command.kind {
            CommandKind::SelectChoice { index } => self.select_choice(index).await,
            CommandKind::Rewind => self.rewind().await,
            CommandKind::Restart => self.restart().await,
            CommandKind::ToggleFastMode => {
                self.toggle_fast_mode().await;
                Flow::Settled
            }
            CommandKind::RequestSaveCode => {
                self.produce_save_code().await;
                Flow::Settled
            }
            CommandKind::LoadSaveCode { code } => self.load_save_code(&code).await,
            CommandKind::Shutdown => {
                self.shutdown().await;
                Flow::Shutdown
            }
        }
    }

    /// Takes the choice at `index`. At an ending, index 0 produces a save
    /// code and index 1 restarts. Out-of-range indices and choices without
    /// a target are logged and ignored.
    pub async fn select_choice(&mut self, index: usize) -> Flow {
        match self.phase() {
            SessionPhase::AwaitingChoice { node_id } => {
                let result = self.take_choice(&node_id, index).await;
                settle(result)
            }
            SessionPhase::Ending { .. } => match ending_choices().get(index).map(|c| c.kind) {
                Some(ChoiceKind::SaveCompletion) => {
                    self.produce_save_code().await;
                    Flow::Settled
                }
                Some(ChoiceKind::Restart) => self.restart().await,
                _ => {
                    warn!(index, "no such ending option");
                    Flow::Settled
                }
            },
            phase => {
                warn!(index, ?phase, "no choice is on offer");
                Flow::Settled
            }
        }
    }

    /// Undoes the latest decision and re-enters the node it was taken on.
    /// The node's effects apply again. A no-op when nothing was decided.
    pub async fn rewind(&mut self) -> Flow {
        if matches!(
            self.phase(),
            SessionPhase::NotStarted | SessionPhase::Restarting
        ) {
            return Flow::Settled;
        }
        let Some(entry) = self.rewind.pop() else {
            debug!("nothing to rewind");
            return Flow::Settled;
        };
        self.with_state(|s| {
            s.choices_made = s.choices_made.saturating_sub(1);
            s.transcript_len = entry.transcript_mark;
        });
        info!(
            node = %entry.node_id,
            depth = self.rewind.depth(),
            "rewound to last choice"
        );
        self.presenter.retract_messages(entry.transcript_mark).await;
        let result = self.enter_node(&entry.node_id, EntryMode::Replay).await;
        settle(result)
    }

    /// Abandons the session and starts a new one with fast mode off.
    pub async fn restart(&mut self) -> Flow {
        self.with_state(|s| s.phase = SessionPhase::Restarting);
        info!("session restarting");
        if let Err(e) = self.snapshots.clear_snapshot().await {
            warn!(error = %e, "failed to clear session snapshot");
        }
        self.begin(false).await
    }

    /// Flips fast mode and returns the new setting.
    pub async fn toggle_fast_mode(&self) -> bool {
        let enabled = self.with_state(|s| {
            s.fast_mode = !s.fast_mode;
            s.fast_mode
        });
        info!(enabled, "fast mode toggled");
        let notice = if enabled {
            "FAST MODE ENABLED"
        } else {
            "FAST MODE DISABLED"
        };
        self.say(Sender::System, notice).await;
        enabled
    }

    /// Encodes the current position and shows the code.
    pub async fn produce_save_code(&self) -> SaveCode {
        let code = self.with_state(|s| {
            SaveCode::encode(
                &s.current_node,
                self.rewind.entries(),
                &s.resources.snapshot(),
            )
        });
        info!(code = %code, "save code produced");
        self.presenter.display_save_code(&code).await;
        code
    }

    /// Jumps to the position in a save code. An invalid code leaves the
    /// session untouched apart from a notice on the transcript.
    pub async fn load_save_code(&mut self, input: &str) -> Flow {
        let decoded = match save_code::decode(input) {
            Ok(decoded) => decoded,
            Err(e) => {
                self.reject_code(&e).await;
                return Flow::Settled;
            }
        };
        let node_id = if self.story.contains(decoded.node_id) {
            decoded.node_id.to_owned()
        } else {
            error!(
                error = %DomainError::UnknownNode(decoded.node_id.to_owned()),
                "save code names a node missing from the story; falling back to start"
            );
            self.story.start_id().to_owned()
        };

        self.stop_decay().await;
        self.rewind.clear();
        let session_id = Uuid::now_v7();
        let mut fresh =
            SessionState::new(session_id, &node_id, self.clock.now(), self.is_fast_mode());
        fresh.resources = ResourceModel::from_levels(decoded.resources);
        fresh.choices_made = decoded.choices_made;
        fresh.decay_started = true;
        let levels = fresh.resources.snapshot();
        self.replace_state(fresh);

        self.presenter.clear().await;
        info!(%session_id, node = %node_id, "save code loaded");
        self.say(Sender::System, CODE_ACCEPTED_NOTICE).await;
        self.presenter.display_status(&levels).await;
        self.launch_decay().await;
        let result = self.enter_node(&node_id, EntryMode::Resume).await;
        settle(result)
    }

    /// Stops decay and writes a final snapshot.
    pub async fn shutdown(&mut self) {
        self.stop_decay().await;
        if self.phase() != SessionPhase::NotStarted {
            self.persist().await;
        }
        info!("session engine shut down");
    }

    async fn reject_code(&self, error: &DomainError) {
        warn!(error = %error, "save code rejected");
        self.say(Sender::System, INVALID_CODE_NOTICE).await;
    }

    async fn begin(&mut self, fast_mode: bool) -> Flow {
        self.stop_decay().await;
        self.rewind.clear();
        let session_id = Uuid::now_v7();
        self.replace_state(SessionState::new(
            session_id,
            self.story.start_id(),
            self.clock.now(),
            fast_mode,
        ));
        self.presenter.clear().await;
        info!(%session_id, fast_mode, "session started");
        let result = self.open_link().await;
        settle(result)
    }

    async fn open_link(&mut self) -> Delivery {
        let story = Arc::clone(&self.story);
        let gap = self.config.pacing.prelude_gap;
        for line in story.prelude() {
            self.pause(gap).await?;
            self.say(Sender::System, line).await;
        }
        self.enter_node(story.start_id(), EntryMode::Fresh).await
    }

    async fn resume(&mut self, snapshot: SessionSnapshot) -> Flow {
        let (state, rewind) = snapshot.restore();
        if !self.story.contains(&state.current_node) {
            error!(
                error = %DomainError::UnknownNode(state.current_node.clone()),
                "snapshot names a node missing from the story; starting over"
            );
            return self.start_session().await;
        }

        self.stop_decay().await;
        let session_id = state.session_id;
        let node_id = state.current_node.clone();
        let live = state.decay_live();
        let levels = state.resources.snapshot();
        let mode = if state.effects_pending {
            EntryMode::Fresh
        } else {
            EntryMode::Resume
        };
        self.replace_state(state);
        self.rewind = rewind;

        self.presenter.clear().await;
        info!(
            %session_id,
            node = %node_id,
            depth = self.rewind.depth(),
            "session resumed from snapshot"
        );
        self.say(Sender::System, RESUMED_NOTICE).await;
        if live {
            self.presenter.display_status(&levels).await;
            self.launch_decay().await;
        }
        let result = self.enter_node(&node_id, mode).await;
        settle(result)
    }

    async fn load_snapshot(&self) -> Option<SessionSnapshot> {
        match self.snapshots.load_snapshot().await {
            Ok(Some(stored)) => match SessionSnapshot::from_stored(&stored) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!(error = %e, "discarding unreadable session snapshot");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "session snapshot unavailable");
                None
            }
        }
    }

    async fn enter_node(&mut self, node_id: &str, mode: EntryMode) -> Delivery {
        let story = Arc::clone(&self.story);
        let node = match story.lookup(node_id) {
            Ok(node) => node,
            Err(e) => {
                error!(
                    error = %e,
                    fallback = story.start_id(),
                    "unknown story node; falling back to start"
                );
                self.say(Sender::System, SIGNAL_CORRUPTED_NOTICE).await;
                story.start_node()
            }
        };
        let pacing = self.config.pacing;

        self.node_entry_mark = self.with_state(|s| {
            s.phase = SessionPhase::Active {
                node_id: node.id.clone(),
            };
            s.current_node.clone_from(&node.id);
            s.effects_pending = false;
            s.transcript_len
        });
        info!(node = %node.id, ?mode, "entering story node");

        if let Some(contact) = &node.contact {
            if let Some(name) = &contact.name {
                self.presenter.display_contact(name).await;
            }
            if let Some(signal) = contact.signal {
                self.presenter.display_connection(signal).await;
            }
        }
        if mode != EntryMode::Resume
            && let Some(effect) = &node.effects
        {
            let (levels, live) = self.with_state(|s| {
                s.resources.apply_effect(effect);
                (s.resources.snapshot(), s.decay_started)
            });
            if live {
                self.presenter.display_status(&levels).await;
            }
        }

        for (i, message) in node.messages.iter().enumerate() {
            if i > 0 {
                self.pause(pacing.message_gap).await?;
            }
            self.pause(pacing.typing(message)).await?;
            self.say(Sender::Character, message).await;
            if self.config.is_telemetry(message) {
                self.establish_telemetry().await;
            }
        }

        match node.terminal() {
            Terminal::Ending(ending) => {
                self.pause(pacing.ending_lead).await?;
                self.conclude(&node.id, ending.clone()).await;
            }
            Terminal::Choices(choices) => {
                self.pause(pacing.choice_lead).await?;
                self.with_state(|s| {
                    s.phase = SessionPhase::AwaitingChoice {
                        node_id: node.id.clone(),
                    };
                });
                self.presenter.display_choices(choices).await;
            }
            Terminal::DeadEnd => {
                error!(
                    error = %DomainError::DeadEndNode(node.id.clone()),
                    "story node has no exits; ending the session"
                );
                self.pause(pacing.ending_lead).await?;
                self.conclude(&node.id, Ending::implicit()).await;
            }
        }

        if self.config.autosave {
            self.persist().await;
        }
        Ok(())
    }

    async fn take_choice(&mut self, node_id: &str, index: usize) -> Delivery {
        let story = Arc::clone(&self.story);
        let node = match story.lookup(node_id) {
            Ok(node) => node,
            Err(e) => {
                error!(error = %e, "offered node is missing; falling back to start");
                return self.enter_node(story.start_id(), EntryMode::Fresh).await;
            }
        };
        let Some(choice) = node.choices.get(index) else {
            warn!(
                node = node_id,
                index,
                offered = node.choices.len(),
                "choice index out of range"
            );
            return Ok(());
        };
        let Some(next) = choice.next.as_deref() else {
            warn!(node = node_id, index, "choice has no next node; staying put");
            return Ok(());
        };

        self.rewind.push(RewindEntry {
            node_id: node_id.to_owned(),
            choice: choice.clone(),
            choice_index: index,
            recorded_at: self.clock.now(),
            transcript_mark: self.node_entry_mark,
        });
        self.with_state(|s| {
            s.choices_made += 1;
            s.phase = SessionPhase::Active {
                node_id: next.to_owned(),
            };
            s.current_node = next.to_owned();
            s.effects_pending = true;
        });
        info!(
            node = node_id,
            index,
            kind = choice.kind.as_str(),
            next,
            depth = self.rewind.depth(),
            "choice selected"
        );

        self.say(Sender::Player, &choice.text).await;
        let resolution = resolver::resolve(choice, self.config.pacing.default_hold);
        let (levels, live) = self.with_state(|s| {
            s.resources.apply_delta(&resolution.delta.as_patch());
            (s.resources.snapshot(), s.decay_started)
        });
        if live {
            self.presenter.display_status(&levels).await;
        }
        match resolution.directive {
            Some(ActionDirective::Hold { message, duration }) => {
                self.say(Sender::System, &message).await;
                self.pause(duration).await?;
            }
            Some(ActionDirective::Signal(status)) => {
                self.presenter.display_connection(status).await;
            }
            Some(ActionDirective::Notice(text)) => self.say(Sender::System, &text).await,
            None => {}
        }

        self.pause(self.config.pacing.after_choice).await?;
        self.enter_node(next, EntryMode::Fresh).await
    }

    async fn establish_telemetry(&mut self) {
        let (first, levels) = self.with_state(|s| {
            let first = !s.decay_started && !s.decay_halted;
            if first {
                s.decay_started = true;
            }
            (first, s.resources.snapshot())
        });
        if !first {
            return;
        }
        info!("telemetry established; resource decay started");
        self.launch_decay().await;
        self.say(Sender::System, TELEMETRY_NOTICE).await;
        self.presenter.display_status(&levels).await;
    }

    async fn conclude(&mut self, node_id: &str, ending: Ending) {
        self.stop_decay().await;
        let now = self.clock.now();
        let summary = self.with_state(|s| {
            s.decay_halted = true;
            s.phase = SessionPhase::Ending {
                node_id: node_id.to_owned(),
                ending: ending.clone(),
            };
            SessionSummary {
                choices_made: s.choices_made,
                survival: now - s.started_at,
            }
        });
        info!(
            node = node_id,
            title = ending.title(),
            choices_made = summary.choices_made,
            survival = %summary.survival_label(),
            "session reached an ending"
        );
        self.presenter.display_session_end(&ending, &summary).await;
        self.presenter.display_choices(&ending_choices()).await;
    }

    /// Waits out a pacing pause while servicing the inbox. Fast-mode toggles,
    /// save-code requests, rewinds with nothing to undo and unreadable codes
    /// are handled in place; a choice is ignored because none is on offer;
    /// anything else abandons the pause.
    async fn pause(&mut self, pause: Duration) -> Delivery {
        let pacing = self.config.pacing;
        let sleep = tokio::time::sleep(pacing.effective(pause, self.is_fast_mode()));
        tokio::pin!(sleep);
        loop {
            if self.inbox_closed {
                sleep.as_mut().await;
                return Ok(());
            }
            tokio::select! {
                () = &mut sleep => return Ok(()),
                received = self.inbox.recv() => {
                    let Some(command) = received else {
                        debug!("command inbox closed");
                        self.inbox_closed = true;
                        continue;
                    };
                    match &command.kind {
                        CommandKind::ToggleFastMode => {
                            if self.toggle_fast_mode().await {
                                sleep
                                    .as_mut()
                                    .reset(Instant::now() + pacing.effective(pause, true));
                            }
                        }
                        CommandKind::RequestSaveCode => {
                            self.produce_save_code().await;
                        }
                        CommandKind::SelectChoice { index } => {
                            warn!(
                                correlation_id = %command.correlation_id,
                                index = *index,
                                "choice ignored while the contact is transmitting"
                            );
                        }
                        CommandKind::Rewind if self.rewind.is_empty() => {
                            debug!(
                                correlation_id = %command.correlation_id,
                                "nothing to rewind"
                            );
                        }
                        CommandKind::LoadSaveCode { code } => {
                            if let Err(e) = save_code::decode(code) {
                                self.reject_code(&e).await;
                            } else {
                                debug!(
                                    correlation_id = %command.correlation_id,
                                    "delivery pre-empted by save code"
                                );
                                return Err(command);
                            }
                        }
                        _ => {
                            debug!(
                                correlation_id = %command.correlation_id,
                                command = command.command_type(),
                                "delivery pre-empted"
                            );
                            return Err(command);
                        }
                    }
                }
            }
        }
    }

    async fn say(&self, sender: Sender, text: &str) {
        self.with_state(|s| s.transcript_len += 1);
        self.presenter.display_message(text, sender).await;
    }

    async fn persist(&self) {
        let snapshot = self.snapshot();
        let stored = match snapshot.to_stored(self.clock.now()) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "failed to encode session snapshot");
                return;
            }
        };
        match self.snapshots.save_snapshot(&stored).await {
            Ok(()) => debug!(node = %snapshot.current_node, "session snapshot written"),
            Err(e) => warn!(error = %e, "failed to write session snapshot"),
        }
    }

    async fn launch_decay(&mut self) {
        self.stop_decay().await;
        self.timers = Some(DecayTimers::launch(TickContext {
            state: Arc::clone(&self.state),
            rng: Arc::clone(&self.rng),
            presenter: Arc::clone(&self.presenter),
            schedule: self.config.decay,
            unit: self.config.tick_unit,
        }));
    }

    async fn stop_decay(&mut self) {
        if let Some(timers) = self.timers.take() {
            timers.cancel(&self.state).await;
        }
    }

    fn replace_state(&self, fresh: SessionState) {
        self.with_state(|s| {
            let epoch = s.decay_epoch;
            *s = fresh;
            s.decay_epoch = epoch;
        });
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut lock(&self.state))
    }
}

/// Meta-choices offered at an ending.
fn ending_choices() -> Vec<Choice> {
    vec![
        Choice::new("Produce save code", ChoiceKind::SaveCompletion, None),
        Choice::new("Restart transmission", ChoiceKind::Restart, None),
    ]
}

fn settle(result: Delivery) -> Flow {
    match result {
        Ok(()) => Flow::Settled,
        Err(command) => Flow::Preempted(command),
    }
}
