//! Scripted workflow engine for the dealflow demo.
//!
//! This crate provides:
//!
//! - **Declarative scripts**: Ordered sequences of timed steps via
//!   [`script::Script`] — each step is one delay plus the message append,
//!   proposal revision, state change, and focus change it applies.
//! - **Script catalog**: The three built-in demo scripts (analyze, open
//!   draft, revise terms) with their fixed content, via [`catalog`].
//! - **Workflow controller**: Single-flight script execution over the
//!   shared session entities via [`controller::WorkflowController`].
//! - **Suggestion gate**: Pure follow-up-action computation via
//!   [`suggest::suggestions`].

pub mod catalog;
pub mod controller;
pub mod error;
pub mod script;
pub mod suggest;

pub use controller::{EngineConfig, WorkflowController};
pub use error::{EngineError, Result};
pub use script::{MessageDraft, Script, ScriptStep, StepEffect};
pub use suggest::{suggestions, Suggestion};

// Re-export the core data model so binary crates only need one dependency
// for the common path.
pub use dealflow_core as core;
pub use dealflow_core::{
    EngineEvent, EntryPoint, EventBus, Message, MessagePayload, Proposal, Role, View,
    WorkflowState, INITIAL_DISCOUNT_PERCENT, SEAT_COUNT,
};
