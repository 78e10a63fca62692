//! Engine error types.
//!
//! Rejected triggers are the only caller-visible failure mode: scripts are
//! fixed data with no external side effects, so once started they always
//! run to completion. Both rejection variants guarantee zero observable
//! state change.

use dealflow_core::{EntryPoint, WorkflowState};

/// Unified error type for the workflow engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The entry point's state precondition does not hold.
    #[error("entry point `{entry}` is not valid in state `{state}`")]
    InvalidTransition {
        /// The entry point that was triggered.
        entry: EntryPoint,
        /// The workflow state at the time of the trigger.
        state: WorkflowState,
    },

    /// A script is already executing; only one may be in flight at a time.
    #[error("script `{running}` is already in flight")]
    ScriptInFlight {
        /// The entry point whose script is currently running.
        running: EntryPoint,
    },
}

/// Convenience alias used throughout the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;
