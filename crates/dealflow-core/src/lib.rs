//! Dealflow core data model.
//!
//! This crate provides the three shared entities of a demo session plus the
//! change-notification bus that ties them to presentation:
//!
//! - **[`message`]** -- Append-only, ordered transcript of structured
//!   [`message::Message`] entries (plain text, reasoning traces, action
//!   cards).
//! - **[`proposal`]** -- The mutable commercial record under negotiation
//!   (discount, unit price, computed total).
//! - **[`state`]** -- Workflow state, presentation focus, and the triggerable
//!   entry points with their state preconditions.
//! - **[`bus`]** -- Publish/subscribe event bus backed by
//!   [`tokio::sync::broadcast`] so presentation can re-render after every
//!   append, revision, or state change.
//! - **[`error`]** -- Core error types via [`thiserror`].
//!
//! All public types are `Send + Sync` and designed for use within a
//! multi-threaded tokio runtime. The single designated writer for all of
//! them is the workflow controller in `dealflow-engine`.

pub mod bus;
pub mod error;
pub mod message;
pub mod proposal;
pub mod state;

// Re-export the most commonly used types at the crate root for convenience.
pub use bus::{EngineEvent, EventBus};
pub use error::{CoreError, Result};
pub use message::{Message, MessageLog, MessagePayload, Role};
pub use proposal::{Proposal, INITIAL_DISCOUNT_PERCENT, SEAT_COUNT, UNIT_PRICE};
pub use state::{EntryPoint, View, WorkflowState};
