//! Workflow state, presentation focus, and triggerable entry points.
//!
//! The workflow controller owns exactly one [`WorkflowState`] at a time and
//! advances it as scripts run. [`EntryPoint`] enumerates the operator
//! actions that can start a script, each with a precondition on the current
//! state (and, for revisions, on the current proposal data).

use serde::{Deserialize, Serialize};

use crate::proposal::Proposal;

// ---------------------------------------------------------------------------
// Workflow state
// ---------------------------------------------------------------------------

/// Where the session currently is in the agent workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// Nothing in progress; the agent is monitoring the inbox.
    Idle,
    /// The agent is reasoning or querying systems.
    Analyzing,
    /// The agent is producing the proposal document.
    Drafting,
    /// The draft is open and awaiting operator review.
    Review,
    /// The workflow has finished. Declared for parity with the full state
    /// space; no built-in script currently reaches it.
    Complete,
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Analyzing => write!(f, "analyzing"),
            Self::Drafting => write!(f, "drafting"),
            Self::Review => write!(f, "review"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Which surface presentation should be showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// The email that started the workflow.
    Inbox,
    /// The proposal document under review.
    Document,
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inbox => write!(f, "inbox"),
            Self::Document => write!(f, "document"),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Operator-triggerable actions, each bound to one script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPoint {
    /// "Analyze this email" — kicks off intent analysis and drafting.
    Analyze,
    /// The action-card button — opens the prepared draft for review.
    OpenDraft,
    /// The suggestion chip — lowers the discount to skip VP approval.
    ReviseTerms,
}

impl EntryPoint {
    /// All entry points, in presentation order.
    pub const ALL: [EntryPoint; 3] = [Self::Analyze, Self::OpenDraft, Self::ReviseTerms];

    /// Whether this entry point may fire given the current state and data.
    ///
    /// `OpenDraft` is only offered while the Analyze script's action card is
    /// outstanding (state `Analyzing`). `ReviseTerms` additionally requires
    /// that the discount has not already been revised.
    pub fn is_valid(self, state: WorkflowState, proposal: &Proposal) -> bool {
        match self {
            Self::Analyze => state == WorkflowState::Idle,
            Self::OpenDraft => state == WorkflowState::Analyzing,
            Self::ReviseTerms => {
                state == WorkflowState::Review && proposal.is_initial_discount()
            }
        }
    }
}

impl std::fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Analyze => write!(f, "analyze"),
            Self::OpenDraft => write!(f, "open_draft"),
            Self::ReviseTerms => write!(f, "revise_terms"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_only_valid_from_idle() {
        let proposal = Proposal::initial();
        assert!(EntryPoint::Analyze.is_valid(WorkflowState::Idle, &proposal));
        for state in [
            WorkflowState::Analyzing,
            WorkflowState::Drafting,
            WorkflowState::Review,
            WorkflowState::Complete,
        ] {
            assert!(!EntryPoint::Analyze.is_valid(state, &proposal));
        }
    }

    #[test]
    fn open_draft_only_valid_while_card_outstanding() {
        let proposal = Proposal::initial();
        assert!(EntryPoint::OpenDraft.is_valid(WorkflowState::Analyzing, &proposal));
        assert!(!EntryPoint::OpenDraft.is_valid(WorkflowState::Idle, &proposal));
        assert!(!EntryPoint::OpenDraft.is_valid(WorkflowState::Review, &proposal));
    }

    #[test]
    fn revise_terms_requires_review_and_unrevised_discount() {
        let mut proposal = Proposal::initial();
        assert!(EntryPoint::ReviseTerms.is_valid(WorkflowState::Review, &proposal));
        assert!(!EntryPoint::ReviseTerms.is_valid(WorkflowState::Analyzing, &proposal));

        proposal.apply_revision(10.0).expect("valid discount");
        assert!(!EntryPoint::ReviseTerms.is_valid(WorkflowState::Review, &proposal));
    }
}
