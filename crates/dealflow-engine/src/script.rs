//! Declarative script definitions.
//!
//! A script is a fixed, ordered sequence of timed steps bound to one
//! triggerable entry point. Each [`ScriptStep`] names a delay and the
//! effects to apply once it elapses: at most one message append, at most
//! one proposal revision, an optional state change, and an optional focus
//! change. One driver loop in the controller executes them in order, which
//! keeps step ordering and side effects independently testable — there is
//! no nesting of timers inside callbacks.

use std::time::Duration;

use dealflow_core::{EntryPoint, MessagePayload, Role, View, WorkflowState};

// ---------------------------------------------------------------------------
// Step effects
// ---------------------------------------------------------------------------

/// A message a step wants appended, before the log assigns its sequence
/// number and timestamp.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    /// Who the message is attributed to.
    pub role: Role,
    /// Display text.
    pub content: String,
    /// Kind-specific structured payload.
    pub payload: MessagePayload,
}

/// Everything a single step applies once its delay elapses.
///
/// All populated fields are applied together, atomically, under the
/// session lock — no observer sees a half-applied step.
#[derive(Debug, Clone, Default)]
pub struct StepEffect {
    /// Message to append to the transcript, if any.
    pub message: Option<MessageDraft>,
    /// New discount percentage for the proposal record, if this step
    /// revises terms. Discount and total change together.
    pub revision: Option<f64>,
    /// Workflow state to settle into after this step, if it changes.
    pub state: Option<WorkflowState>,
    /// Presentation surface to bring front-most, if it changes.
    pub focus: Option<View>,
}

/// One delay plus the effects it gates.
#[derive(Debug, Clone)]
pub struct ScriptStep {
    /// How long to suspend before this step's effects become observable.
    pub delay: Duration,
    /// The effects to apply.
    pub effect: StepEffect,
}

impl ScriptStep {
    /// Create a step with the given delay and no effects yet.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            effect: StepEffect::default(),
        }
    }

    /// Append a message when this step fires.
    pub fn message(
        mut self,
        role: Role,
        content: impl Into<String>,
        payload: MessagePayload,
    ) -> Self {
        self.effect.message = Some(MessageDraft {
            role,
            content: content.into(),
            payload,
        });
        self
    }

    /// Revise the proposal discount when this step fires.
    pub fn revise_discount(mut self, new_discount: f64) -> Self {
        self.effect.revision = Some(new_discount);
        self
    }

    /// Move the workflow to `state` when this step fires.
    pub fn set_state(mut self, state: WorkflowState) -> Self {
        self.effect.state = Some(state);
        self
    }

    /// Bring `view` front-most when this step fires.
    pub fn focus(mut self, view: View) -> Self {
        self.effect.focus = Some(view);
        self
    }
}

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

/// A fixed, ordered sequence of timed steps bound to one entry point.
#[derive(Debug, Clone)]
pub struct Script {
    /// The entry point that starts this script.
    pub entry: EntryPoint,
    /// Short machine-readable name used in logs.
    pub name: &'static str,
    /// Steps in execution order.
    pub steps: Vec<ScriptStep>,
}

impl Script {
    /// Build a script, checking its internal invariants.
    ///
    /// # Panics
    ///
    /// Scripts are compiled-in data, so a malformed one is a programming
    /// error and fails fast: panics if the script is empty, declares more
    /// than one proposal revision, or carries a revision value outside the
    /// valid discount range.
    pub fn new(entry: EntryPoint, name: &'static str, steps: Vec<ScriptStep>) -> Self {
        assert!(!steps.is_empty(), "script `{name}` has no steps");

        let revisions: Vec<f64> = steps
            .iter()
            .filter_map(|step| step.effect.revision)
            .collect();
        assert!(
            revisions.len() <= 1,
            "script `{name}` declares {} proposal revisions; at most one is allowed",
            revisions.len()
        );
        for value in revisions {
            assert!(
                value.is_finite() && (0.0..100.0).contains(&value),
                "script `{name}` revises the discount to the invalid value {value}"
            );
        }

        Self { entry, name, steps }
    }

    /// Number of messages this script appends over its lifetime.
    pub fn message_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.effect.message.is_some())
            .count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
