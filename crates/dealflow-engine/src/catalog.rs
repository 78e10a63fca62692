//! The built-in script catalog.
//!
//! Three scripts drive the demo, one per [`EntryPoint`]. Their content —
//! message text, reasoning steps, delays, discounts — is fixed data; this
//! module is the single place it lives.

use std::time::Duration;

use dealflow_core::{EntryPoint, MessagePayload, Role, View, WorkflowState};

use crate::script::{Script, ScriptStep};

/// The greeting the transcript is seeded with at session start.
pub const GREETING: &str = "I am monitoring your inbox for high-value opportunities. \
     I will alert you if I detect actionable requests.";

/// The discount the revise-terms script lowers the proposal to.
pub const REVISED_DISCOUNT_PERCENT: f64 = 10.0;

/// Return the script bound to the given entry point.
pub fn script_for(entry: EntryPoint) -> Script {
    match entry {
        EntryPoint::Analyze => analyze(),
        EntryPoint::OpenDraft => open_draft(),
        EntryPoint::ReviseTerms => revise_terms(),
    }
}

/// "Analyze this email" — `idle -> analyzing`.
///
/// Walks through intent extraction and simulated system lookups, ending
/// with an action card offering to open the draft. The state rests at
/// `analyzing` until the card's action fires.
fn analyze() -> Script {
    Script::new(
        EntryPoint::Analyze,
        "analyze",
        vec![
            ScriptStep::new(Duration::ZERO)
                .set_state(WorkflowState::Analyzing)
                .message(
                    Role::User,
                    "Analyze this email and help me respond.",
                    MessagePayload::Plain,
                ),
            ScriptStep::new(Duration::from_millis(1000)).message(
                Role::Agent,
                "Analyzing intent and gathering context...",
                MessagePayload::ReasoningTrace {
                    steps: vec![
                        "Intent: Rate Request (RFP) detected".into(),
                        "Entity: Northstar Enterprises".into(),
                        "Product: AI Analytics Suite (500 Seats)".into(),
                    ],
                },
            ),
            ScriptStep::new(Duration::from_millis(2500)).message(
                Role::Agent,
                "Querying internal systems for account data...",
                MessagePayload::ReasoningTrace {
                    steps: vec![
                        "Salesforce: Found Account 'Northstar Ent' (Tier 1)".into(),
                        "SharePoint: Retrieved 'Q1_Pricing_Policy.pdf'".into(),
                        "Graph API: Checked calendar availability".into(),
                    ],
                },
            ),
            ScriptStep::new(Duration::from_millis(2000)).message(
                Role::Agent,
                "I have prepared a draft based on the 'Enterprise_SaaS_Template_v4'.",
                MessagePayload::ActionCard {
                    title: "Proposal Ready for Review".into(),
                    description: "Includes 15% discount and standard SLA terms.".into(),
                    action_label: "Open Draft in Word".into(),
                },
            ),
        ],
    )
}

/// The action card's button — `analyzing -> drafting -> review`.
///
/// Opens the prepared document, moves presentation focus to it, then flags
/// the compliance concern and the approval requirement.
fn open_draft() -> Script {
    Script::new(
        EntryPoint::OpenDraft,
        "open_draft",
        vec![
            ScriptStep::new(Duration::ZERO)
                .set_state(WorkflowState::Drafting)
                .message(Role::User, "Open the draft.", MessagePayload::Plain),
            ScriptStep::new(Duration::from_millis(800)).message(
                Role::Agent,
                "Opening Microsoft Word...",
                MessagePayload::Plain,
            ),
            ScriptStep::new(Duration::from_millis(1000))
                .set_state(WorkflowState::Review)
                .focus(View::Document),
            ScriptStep::new(Duration::from_millis(1500)).message(
                Role::Agent,
                "I've flagged one section regarding Data Sovereignty. Also, note that \
                 the 15% discount requires VP approval.",
                MessagePayload::Plain,
            ),
        ],
    )
}

/// The suggestion chip — `review -> analyzing -> review`.
///
/// Lowers the discount to a level within Account Executive limits so no
/// VP approval is needed. Discount and total change together in one step.
fn revise_terms() -> Script {
    Script::new(
        EntryPoint::ReviseTerms,
        "revise_terms",
        vec![
            ScriptStep::new(Duration::ZERO).message(
                Role::User,
                "The 15% discount is too aggressive for Q1. Let's drop it to 10% to \
                 avoid approval delays.",
                MessagePayload::Plain,
            ),
            ScriptStep::new(Duration::from_millis(800))
                .set_state(WorkflowState::Analyzing)
                .message(
                    Role::Agent,
                    "Updating proposal terms...",
                    MessagePayload::ReasoningTrace {
                        steps: vec![
                            "Policy Check: 10% discount is within Account Executive limits."
                                .into(),
                            "Action: update_table_row(id='discount', value='10%')".into(),
                            "Recalculating Totals...".into(),
                        ],
                    },
                ),
            ScriptStep::new(Duration::from_millis(2000))
                .revise_discount(REVISED_DISCOUNT_PERCENT)
                .set_state(WorkflowState::Review)
                .message(
                    Role::Agent,
                    "I've updated the discount to 10% and recalculated the total. No VP \
                     approval is required for this tier.",
                    MessagePayload::Plain,
                ),
        ],
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entry_point_has_a_script() {
        for entry in EntryPoint::ALL {
            let script = script_for(entry);
            assert_eq!(script.entry, entry);
            assert!(!script.steps.is_empty());
        }
    }

    #[test]
    fn scripts_append_expected_message_counts() {
        assert_eq!(script_for(EntryPoint::Analyze).message_count(), 4);
        assert_eq!(script_for(EntryPoint::OpenDraft).message_count(), 3);
        assert_eq!(script_for(EntryPoint::ReviseTerms).message_count(), 3);
    }

    #[test]
    fn analyze_enters_analyzing_immediately() {
        let script = script_for(EntryPoint::Analyze);
        let first = &script.steps[0];
        assert_eq!(first.delay, Duration::ZERO);
        assert_eq!(first.effect.state, Some(WorkflowState::Analyzing));
        // The script rests at analyzing — no later step moves the state on.
        assert!(script.steps[1..]
            .iter()
            .all(|step| step.effect.state.is_none()));
    }

    #[test]
    fn open_draft_moves_focus_with_the_review_transition() {
        let script = script_for(EntryPoint::OpenDraft);
        let review_step = script
            .steps
            .iter()
            .find(|step| step.effect.state == Some(WorkflowState::Review))
            .expect("a step must enter review");
        assert_eq!(review_step.effect.focus, Some(View::Document));
    }

    #[test]
    fn revise_terms_changes_discount_and_state_in_one_step() {
        let script = script_for(EntryPoint::ReviseTerms);
        let revision_step = script
            .steps
            .iter()
            .find(|step| step.effect.revision.is_some())
            .expect("a step must revise the discount");
        assert_eq!(revision_step.effect.revision, Some(10.0));
        assert_eq!(revision_step.effect.state, Some(WorkflowState::Review));
        assert!(revision_step.effect.message.is_some());
    }
}
