//! Change-notification bus.
//!
//! Presentation never polls: the workflow controller publishes an
//! [`EngineEvent`] after every append, revision, state change, or focus
//! change, and renderers re-draw from the read accessors when one arrives.
//! The bus is a lightweight publish/subscribe mechanism built on top of
//! [`tokio::sync::broadcast`].
//!
//! Events are wrapped in [`Arc`] so that broadcasting to multiple
//! subscribers does not require cloning the payload.
//!
//! # Usage
//!
//! ```rust,no_run
//! # use dealflow_core::bus::{EventBus, EngineEvent};
//! # use dealflow_core::state::WorkflowState;
//! # async fn example() {
//! let bus = EventBus::new(256);
//! let mut rx = bus.subscribe();
//!
//! bus.publish(EngineEvent::StateChanged {
//!     from: WorkflowState::Idle,
//!     to: WorkflowState::Analyzing,
//!     timestamp: chrono::Utc::now(),
//! });
//!
//! let event = rx.recv().await.unwrap();
//! # }
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::message::Message;
use crate::proposal::Proposal;
use crate::state::{EntryPoint, View, WorkflowState};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// An event that flows through the bus.
///
/// Every variant carries the full payload observers need to re-render
/// without a follow-up read, keeping each step's effects observable as one
/// atomic unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EngineEvent {
    /// A message was appended to the transcript.
    MessageAppended {
        /// The entry exactly as stored in the log.
        message: Message,
    },

    /// The proposal record was revised (discount and total together).
    ProposalRevised {
        /// The record after the revision.
        proposal: Proposal,
    },

    /// The workflow moved to a new state.
    StateChanged {
        /// State before the transition.
        from: WorkflowState,
        /// State after the transition.
        to: WorkflowState,
        /// When the transition occurred.
        timestamp: DateTime<Utc>,
    },

    /// Presentation focus moved to a different surface.
    FocusChanged {
        /// The surface that should now be front-most.
        view: View,
    },

    /// A script began executing.
    ScriptStarted {
        /// The entry point that was triggered.
        entry: EntryPoint,
        /// When execution began.
        timestamp: DateTime<Utc>,
    },

    /// A script ran all of its steps to completion.
    ScriptCompleted {
        /// The entry point whose script finished.
        entry: EntryPoint,
        /// When execution finished.
        timestamp: DateTime<Utc>,
    },

    /// The session was reset to its seeded initial values.
    SessionReset {
        /// When the reset occurred.
        timestamp: DateTime<Utc>,
    },
}

// ---------------------------------------------------------------------------
// Event bus
// ---------------------------------------------------------------------------

/// Publish/subscribe event bus backed by [`tokio::sync::broadcast`].
///
/// The bus is cheaply cloneable (`Arc`-backed) and `Send + Sync`.
/// Subscribers receive [`Arc<EngineEvent>`] references, avoiding
/// per-subscriber cloning of the event payload.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

struct EventBusInner {
    sender: broadcast::Sender<Arc<EngineEvent>>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity.
    ///
    /// If a subscriber falls behind by more than `capacity` events, it will
    /// receive a [`broadcast::error::RecvError::Lagged`] error indicating
    /// how many events were missed.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(EventBusInner { sender }),
        }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of receivers that will observe this event. An
    /// event published with no active subscribers is silently dropped —
    /// the engine does not require anyone to be watching.
    pub fn publish(&self, event: EngineEvent) -> usize {
        let event = Arc::new(event);
        match self.inner.sender.send(event) {
            Ok(n) => {
                tracing::trace!(receivers = n, "event published");
                n
            }
            Err(_) => {
                tracing::trace!("event published but no active receivers");
                0
            }
        }
    }

    /// Create a new subscriber that will receive all future events.
    ///
    /// Events published *before* this call are **not** replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<EngineEvent>> {
        self.inner.sender.subscribe()
    }

    /// Return the current number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.sender.receiver_count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
