//! Workflow controller.
//!
//! Owns the shared session entities — transcript, proposal record,
//! workflow state, presentation focus — and executes the catalog scripts
//! against them, one at a time.
//!
//! # Execution model
//!
//! A single cooperative timeline: at most one script is in flight, and each
//! step suspends for its delay before its effects become observable. The
//! controller holds no lock while suspended; it reacquires the session lock
//! to apply a step's message/revision/state/focus effects as one atomic
//! unit, so readers never observe a half-applied step.
//!
//! Triggering an entry point while a script is in flight is rejected —
//! there is no queueing or rollback. Steps are scripted data with no
//! real-world side effects, so a driven script always runs to completion.
//! If a caller drops the trigger future mid-script (e.g. aborts a spawned
//! task), the steps already applied stand and the in-flight flag is
//! released by a drop guard, so the session stays usable.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use dealflow_core::{
    EngineEvent, EntryPoint, EventBus, Message, MessageLog, MessagePayload, Proposal, Role, View,
    WorkflowState,
};

use crate::catalog;
use crate::error::{EngineError, Result};
use crate::script::StepEffect;
use crate::suggest::{self, Suggestion};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Controller configuration.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Multiplier applied to every step delay. `1.0` keeps the scripted
    /// timing, `0.0` makes every step fire immediately (used by the demo
    /// binary's `--instant` flag). Negative values are clamped to zero.
    pub pace: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { pace: 1.0 }
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Everything a session owns, guarded by one lock.
struct Session {
    state: WorkflowState,
    focus: View,
    log: MessageLog,
    proposal: Proposal,
}

impl Session {
    /// A fresh session: empty transcript seeded with the agent greeting,
    /// initial proposal terms, `idle` state, inbox focus.
    fn seeded() -> Self {
        let mut log = MessageLog::new();
        log.append(Role::Agent, catalog::GREETING, MessagePayload::Plain);
        Self {
            state: WorkflowState::Idle,
            focus: View::Inbox,
            log,
            proposal: Proposal::initial(),
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// The finite-state controller that runs the catalog scripts.
///
/// Cheaply cloneable (`Arc`-backed) and `Send + Sync`; clones share the
/// same session. The controller is the only writer of the session
/// entities — presentation and the suggestion gate only read.
#[derive(Clone)]
pub struct WorkflowController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    session_id: Uuid,
    session: Mutex<Session>,
    /// Entry point whose script is currently executing, if any. This flag
    /// is the single-flight guard. It lives outside the session lock so
    /// [`FlightGuard`] can clear it from a synchronous `Drop`.
    in_flight: StdMutex<Option<EntryPoint>>,
    bus: EventBus,
    config: EngineConfig,
}

/// Clears the in-flight flag when the script driver goes out of scope,
/// whether the script ran to completion or its future was dropped
/// mid-script. Without this, an aborted trigger task would leave the
/// session rejecting every further trigger and reset.
struct FlightGuard {
    inner: Arc<ControllerInner>,
    completed: bool,
}

impl FlightGuard {
    /// Mark the script as having run all its steps, then release the flag.
    fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        if let Some(entry) = lock_flag(&self.inner.in_flight).take() {
            if !self.completed {
                tracing::warn!(
                    session_id = %self.inner.session_id,
                    entry = %entry,
                    "script driver dropped mid-flight; session released"
                );
            }
        }
    }
}

/// Lock the in-flight flag, recovering from poisoning. The flag is plain
/// data; a panic in a previous holder cannot leave it inconsistent.
fn lock_flag(
    flag: &StdMutex<Option<EntryPoint>>,
) -> std::sync::MutexGuard<'_, Option<EntryPoint>> {
    flag.lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl WorkflowController {
    /// Create a controller over a freshly seeded session.
    pub fn new(bus: EventBus, config: EngineConfig) -> Self {
        let session_id = Uuid::now_v7();
        tracing::info!(session_id = %session_id, pace = config.pace, "session created");
        Self {
            inner: Arc::new(ControllerInner {
                session_id,
                session: Mutex::new(Session::seeded()),
                in_flight: StdMutex::new(None),
                bus,
                config,
            }),
        }
    }

    /// Unique identifier for this session.
    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    // -- Triggering ----------------------------------------------------------

    /// Start the script bound to `entry` and drive it to completion.
    ///
    /// The returned future resolves when the script's final step has been
    /// applied. Callers that want fire-and-forget semantics can spawn it;
    /// if the future is dropped mid-script, the steps already applied
    /// stand (there is no rollback) and the in-flight flag is released.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ScriptInFlight`] if another script is
    /// executing, or [`EngineError::InvalidTransition`] if the entry
    /// point's precondition does not hold. Both rejections leave the
    /// transcript, the proposal, and the workflow state untouched.
    pub async fn trigger(&self, entry: EntryPoint) -> Result<()> {
        let script = {
            let session = self.inner.session.lock().await;
            let mut in_flight = lock_flag(&self.inner.in_flight);
            if let Some(running) = *in_flight {
                tracing::warn!(entry = %entry, running = %running, "trigger rejected: busy");
                return Err(EngineError::ScriptInFlight { running });
            }
            if !entry.is_valid(session.state, &session.proposal) {
                tracing::warn!(
                    entry = %entry,
                    state = %session.state,
                    "trigger rejected: precondition failed"
                );
                return Err(EngineError::InvalidTransition {
                    entry,
                    state: session.state,
                });
            }
            *in_flight = Some(entry);
            catalog::script_for(entry)
        };
        let guard = FlightGuard {
            inner: Arc::clone(&self.inner),
            completed: false,
        };

        tracing::info!(
            session_id = %self.inner.session_id,
            script = script.name,
            steps = script.steps.len(),
            "script started"
        );
        self.inner.bus.publish(EngineEvent::ScriptStarted {
            entry,
            timestamp: Utc::now(),
        });

        for (index, step) in script.steps.iter().enumerate() {
            let delay = paced(step.delay, self.inner.config.pace);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            tracing::debug!(script = script.name, step = index, "applying step");
            self.apply_step(&step.effect).await;
        }

        guard.complete();
        tracing::info!(session_id = %self.inner.session_id, script = script.name, "script completed");
        self.inner.bus.publish(EngineEvent::ScriptCompleted {
            entry,
            timestamp: Utc::now(),
        });

        Ok(())
    }

    /// Apply one step's effects under the session lock, publishing an event
    /// per effect. The lock scope is what makes the step atomic to readers.
    async fn apply_step(&self, effect: &StepEffect) {
        let mut session = self.inner.session.lock().await;

        if let Some(draft) = &effect.message {
            let message =
                session
                    .log
                    .append(draft.role, draft.content.clone(), draft.payload.clone());
            self.inner
                .bus
                .publish(EngineEvent::MessageAppended { message });
        }

        if let Some(new_discount) = effect.revision {
            // Revision values are range-checked when the catalog scripts are
            // built, so a failure here is an engine bug, not a user error.
            session
                .proposal
                .apply_revision(new_discount)
                .expect("catalog revision values are validated at script construction");
            self.inner.bus.publish(EngineEvent::ProposalRevised {
                proposal: session.proposal.clone(),
            });
        }

        if let Some(to) = effect.state {
            let from = session.state;
            if from != to {
                session.state = to;
                tracing::debug!(%from, %to, "state changed");
                self.inner.bus.publish(EngineEvent::StateChanged {
                    from,
                    to,
                    timestamp: Utc::now(),
                });
            }
        }

        if let Some(view) = effect.focus {
            if session.focus != view {
                session.focus = view;
                self.inner
                    .bus
                    .publish(EngineEvent::FocusChanged { view });
            }
        }
    }

    // -- Read accessors ------------------------------------------------------

    /// Current workflow state.
    pub async fn state(&self) -> WorkflowState {
        self.inner.session.lock().await.state
    }

    /// Current presentation focus.
    pub async fn focus(&self) -> View {
        self.inner.session.lock().await.focus
    }

    /// Full ordered transcript.
    pub async fn transcript(&self) -> Vec<Message> {
        self.inner.session.lock().await.log.snapshot()
    }

    /// Current proposal record.
    pub async fn proposal(&self) -> Proposal {
        self.inner.session.lock().await.proposal.clone()
    }

    /// Suggestions to offer the operator right now.
    ///
    /// Recomputed from the live state and proposal on every call — never
    /// cached. Empty while a script is in flight: chips are follow-ups to
    /// a settled state, not mid-script interjections.
    pub async fn suggestions(&self) -> Vec<Suggestion> {
        let session = self.inner.session.lock().await;
        if lock_flag(&self.inner.in_flight).is_some() {
            return Vec::new();
        }
        suggest::suggestions(session.state, &session.proposal)
    }

    /// Entry points whose preconditions hold right now. Empty while a
    /// script is in flight.
    pub async fn available_entry_points(&self) -> Vec<EntryPoint> {
        let session = self.inner.session.lock().await;
        if lock_flag(&self.inner.in_flight).is_some() {
            return Vec::new();
        }
        EntryPoint::ALL
            .into_iter()
            .filter(|entry| entry.is_valid(session.state, &session.proposal))
            .collect()
    }

    // -- Session lifecycle ---------------------------------------------------

    /// Reset the session to its seeded initial values.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ScriptInFlight`] if a script is executing;
    /// there is no mid-script cancellation.
    pub async fn reset(&self) -> Result<()> {
        let mut session = self.inner.session.lock().await;
        if let Some(running) = *lock_flag(&self.inner.in_flight) {
            return Err(EngineError::ScriptInFlight { running });
        }
        *session = Session::seeded();
        tracing::info!(session_id = %self.inner.session_id, "session reset");
        self.inner.bus.publish(EngineEvent::SessionReset {
            timestamp: Utc::now(),
        });
        Ok(())
    }
}

/// Scale a scripted delay by the configured pace.
fn paced(delay: Duration, pace: f32) -> Duration {
    delay.mul_f32(pace.max(0.0))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> WorkflowController {
        WorkflowController::new(EventBus::new(256), EngineConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn session_starts_seeded() {
        let ctl = controller();
        assert_eq!(ctl.state().await, WorkflowState::Idle);
        assert_eq!(ctl.focus().await, View::Inbox);

        let transcript = ctl.transcript().await;
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].role, Role::Agent);
        assert!(transcript[0].content.contains("monitoring your inbox"));

        assert_eq!(ctl.proposal().await, Proposal::initial());
        assert_eq!(ctl.available_entry_points().await, vec![EntryPoint::Analyze]);
    }

    #[tokio::test(start_paused = true)]
    async fn full_run_ends_in_review_with_revised_terms() {
        let ctl = controller();

        ctl.trigger(EntryPoint::Analyze).await.expect("analyze");
        assert_eq!(ctl.state().await, WorkflowState::Analyzing);
        assert_eq!(ctl.transcript().await.len(), 1 + 4);

        ctl.trigger(EntryPoint::OpenDraft).await.expect("open draft");
        assert_eq!(ctl.state().await, WorkflowState::Review);
        assert_eq!(ctl.focus().await, View::Document);
        assert_eq!(ctl.transcript().await.len(), 1 + 4 + 3);

        ctl.trigger(EntryPoint::ReviseTerms).await.expect("revise");
        assert_eq!(ctl.state().await, WorkflowState::Review);
        assert_eq!(ctl.transcript().await.len(), 1 + 4 + 3 + 3);

        let proposal = ctl.proposal().await;
        assert_eq!(proposal.discount_percent, 10.0);
        assert_eq!(proposal.total, 13_500.0);

        // The revision chip is gone once the discount moves off its seed.
        assert!(ctl.suggestions().await.is_empty());
        assert!(ctl.available_entry_points().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn transcript_is_the_concatenation_of_script_messages() {
        let ctl = controller();
        ctl.trigger(EntryPoint::Analyze).await.expect("analyze");
        ctl.trigger(EntryPoint::OpenDraft).await.expect("open draft");
        ctl.trigger(EntryPoint::ReviseTerms).await.expect("revise");

        let transcript = ctl.transcript().await;
        let mut expected = vec![catalog::GREETING.to_string()];
        for entry in EntryPoint::ALL {
            for step in catalog::script_for(entry).steps {
                if let Some(draft) = step.effect.message {
                    expected.push(draft.content);
                }
            }
        }

        let actual: Vec<String> = transcript.iter().map(|m| m.content.clone()).collect();
        assert_eq!(actual, expected);
        // Sequence numbers are gapless and ordered.
        for (index, message) in transcript.iter().enumerate() {
            assert_eq!(message.seq, index as u64);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_trigger_has_no_side_effects() {
        let ctl = controller();
        let before_transcript = ctl.transcript().await;
        let before_proposal = ctl.proposal().await;

        let err = ctl
            .trigger(EntryPoint::OpenDraft)
            .await
            .expect_err("open draft from idle must be rejected");
        assert!(matches!(err, EngineError::InvalidTransition { .. }));

        assert_eq!(ctl.state().await, WorkflowState::Idle);
        assert_eq!(ctl.transcript().await, before_transcript);
        assert_eq!(ctl.proposal().await, before_proposal);
    }

    #[tokio::test(start_paused = true)]
    async fn revise_terms_rejected_before_draft_is_open() {
        let ctl = controller();
        ctl.trigger(EntryPoint::Analyze).await.expect("analyze");

        // State is still `analyzing`; the revision chip must not fire.
        let err = ctl
            .trigger(EntryPoint::ReviseTerms)
            .await
            .expect_err("revise before review must be rejected");
        assert!(matches!(
            err,
            EngineError::InvalidTransition {
                entry: EntryPoint::ReviseTerms,
                state: WorkflowState::Analyzing,
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn second_trigger_while_in_flight_is_rejected() {
        let ctl = controller();

        let runner = {
            let ctl = ctl.clone();
            tokio::spawn(async move { ctl.trigger(EntryPoint::Analyze).await })
        };
        // Let the spawned script claim the in-flight flag and reach its
        // first sleep.
        tokio::task::yield_now().await;

        let err = ctl
            .trigger(EntryPoint::Analyze)
            .await
            .expect_err("concurrent trigger must be rejected");
        assert!(matches!(err, EngineError::ScriptInFlight { .. }));

        let err = ctl.reset().await.expect_err("reset mid-flight is rejected");
        assert!(matches!(err, EngineError::ScriptInFlight { .. }));

        runner
            .await
            .expect("script task")
            .expect("script completes");
        assert_eq!(ctl.state().await, WorkflowState::Analyzing);
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_script_releases_the_session() {
        let ctl = controller();

        let runner = {
            let ctl = ctl.clone();
            tokio::spawn(async move { ctl.trigger(EntryPoint::Analyze).await })
        };
        // Let the script claim the in-flight flag and park at its first
        // delay, then drop it mid-script.
        tokio::task::yield_now().await;
        runner.abort();
        let join = runner.await;
        assert!(join.expect_err("task was aborted").is_cancelled());

        // Applied steps stand, but the flag is released: the session can
        // be reset and re-triggered instead of rejecting everything.
        ctl.reset().await.expect("reset after cancellation");
        assert_eq!(ctl.state().await, WorkflowState::Idle);
        assert_eq!(ctl.transcript().await.len(), 1);

        ctl.trigger(EntryPoint::Analyze).await.expect("fresh trigger");
        assert_eq!(ctl.state().await, WorkflowState::Analyzing);
    }

    #[tokio::test(start_paused = true)]
    async fn events_mirror_effects_in_order() {
        let bus = EventBus::new(256);
        let mut rx = bus.subscribe();
        let ctl = WorkflowController::new(bus, EngineConfig::default());

        ctl.trigger(EntryPoint::Analyze).await.expect("analyze");

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(match event.as_ref() {
                EngineEvent::ScriptStarted { .. } => "started",
                EngineEvent::MessageAppended { .. } => "message",
                EngineEvent::StateChanged { .. } => "state",
                EngineEvent::ScriptCompleted { .. } => "completed",
                other => panic!("unexpected event for analyze: {other:?}"),
            });
        }
        assert_eq!(
            kinds,
            vec![
                "started", "message", "state", "message", "message", "message", "completed"
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reset_restores_seeded_session() {
        let ctl = controller();
        ctl.trigger(EntryPoint::Analyze).await.expect("analyze");
        ctl.trigger(EntryPoint::OpenDraft).await.expect("open draft");
        assert_eq!(ctl.state().await, WorkflowState::Review);

        ctl.reset().await.expect("reset");
        assert_eq!(ctl.state().await, WorkflowState::Idle);
        assert_eq!(ctl.focus().await, View::Inbox);
        assert_eq!(ctl.transcript().await.len(), 1);
        assert_eq!(ctl.proposal().await, Proposal::initial());
        assert_eq!(ctl.available_entry_points().await, vec![EntryPoint::Analyze]);
    }

    #[tokio::test]
    async fn zero_pace_runs_instantly() {
        let ctl = WorkflowController::new(EventBus::new(256), EngineConfig { pace: 0.0 });
        // Real (unpaused) clock: only an instant run can finish quickly.
        ctl.trigger(EntryPoint::Analyze).await.expect("analyze");
        ctl.trigger(EntryPoint::OpenDraft).await.expect("open draft");
        ctl.trigger(EntryPoint::ReviseTerms).await.expect("revise");
        assert_eq!(ctl.transcript().await.len(), 11);
    }
}
