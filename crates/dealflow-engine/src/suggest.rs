//! Suggestion gate.
//!
//! A pure function of the current workflow state and proposal record that
//! decides which follow-up chips to surface to the operator. Nothing here
//! is cached or stateful; the controller recomputes on every read.

use serde::{Deserialize, Serialize};

use dealflow_core::{EntryPoint, Proposal, WorkflowState};

/// A conditionally offered follow-up action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Chip label.
    pub label: String,
    /// One-line explanation of what accepting the suggestion does.
    pub description: String,
    /// The entry point this chip triggers, if it is actionable.
    pub action: Option<EntryPoint>,
    /// Whether the chip can be activated. Inert chips are shown greyed out
    /// as a signal of what the agent *could* escalate to.
    pub enabled: bool,
}

/// Compute the suggestions to offer for the given state and data.
///
/// One rule today: while the draft is under review and the discount still
/// sits at its seeded value, offer the auto-approve revision chip plus an
/// inert "Request VP Approval" placeholder. Everywhere else — any other
/// state, or once the discount has been revised — the list is empty.
pub fn suggestions(state: WorkflowState, proposal: &Proposal) -> Vec<Suggestion> {
    if state != WorkflowState::Review || !proposal.is_initial_discount() {
        return Vec::new();
    }

    vec![
        Suggestion {
            label: "Reduce discount to 10% (Auto-Approve)".into(),
            description: "Lower the discount to stay within Account Executive limits."
                .into(),
            action: Some(EntryPoint::ReviseTerms),
            enabled: true,
        },
        Suggestion {
            label: "Request VP Approval".into(),
            description: "Route the 15% discount to the VP approval queue.".into(),
            action: None,
            enabled: false,
        },
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
