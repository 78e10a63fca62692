//! Terminal rendering for the demo transcript.
//!
//! The engine treats presentation as an opaque sink; this module is that
//! sink. Everything is formatted to plain strings so the layouts are
//! testable without capturing stdout.

use dealflow_engine::{
    EngineEvent, Message, MessagePayload, Proposal, Suggestion, SEAT_COUNT,
};

/// Format a bus event as a transcript line, if it has a visible rendering.
///
/// Script start/completion markers are diagnostics, not transcript content;
/// they return `None` here and surface through tracing instead.
pub fn format_event(event: &EngineEvent) -> Option<String> {
    match event {
        EngineEvent::MessageAppended { message } => Some(format_message(message)),
        EngineEvent::ProposalRevised { proposal } => Some(format!(
            "      * proposal revised: {}% discount, ${:.2}/mo",
            proposal.discount_percent, proposal.total
        )),
        EngineEvent::StateChanged { from, to, .. } => {
            Some(format!("      -- state: {from} -> {to}"))
        }
        EngineEvent::FocusChanged { view } => Some(format!("      -- focus: {view}")),
        EngineEvent::SessionReset { .. } => Some("      -- session reset".to_string()),
        EngineEvent::ScriptStarted { .. } | EngineEvent::ScriptCompleted { .. } => None,
    }
}

/// Format one transcript entry with its role prefix and payload details.
pub fn format_message(message: &Message) -> String {
    let mut out = format!("[{:>6}] {}", message.role.to_string(), message.content);
    match &message.payload {
        MessagePayload::Plain => {}
        MessagePayload::ReasoningTrace { steps } => {
            for step in steps {
                out.push_str(&format!("\n         . {step}"));
            }
        }
        MessagePayload::ActionCard {
            title,
            description,
            action_label,
        } => {
            out.push_str(&format!("\n         +- {title}"));
            out.push_str(&format!("\n         |  {description}"));
            out.push_str(&format!("\n         +- [ {action_label} ]"));
        }
    }
    out
}

/// Format a suggestion chip. Inert chips are marked rather than hidden.
pub fn format_suggestion(suggestion: &Suggestion) -> String {
    if suggestion.enabled {
        format!("  > {} -- {}", suggestion.label, suggestion.description)
    } else {
        format!("    {} (inactive)", suggestion.label)
    }
}

/// Format the proposal record as a small summary table.
pub fn format_proposal(proposal: &Proposal) -> String {
    format!(
        "Proposal -- Northstar Enterprises\n  seats:    {} x ${:.2}/mo\n  discount: {}%\n  total:    ${:.2}/mo",
        SEAT_COUNT, proposal.unit_price, proposal.discount_percent, proposal.total
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use dealflow_engine::{EntryPoint, Role};

    fn message(role: Role, content: &str, payload: MessagePayload) -> Message {
        let mut log = dealflow_engine::core::MessageLog::new();
        log.append(role, content, payload)
    }

    #[test]
    fn plain_message_carries_role_prefix() {
        let rendered = format_message(&message(Role::User, "Open the draft.", MessagePayload::Plain));
        assert_eq!(rendered, "[  user] Open the draft.");
    }

    #[test]
    fn reasoning_steps_are_indented() {
        let rendered = format_message(&message(
            Role::Agent,
            "Analyzing...",
            MessagePayload::ReasoningTrace {
                steps: vec!["Intent: RFP".into(), "Entity: Northstar".into()],
            },
        ));
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("Intent: RFP"));
        assert!(lines[2].contains("Entity: Northstar"));
    }

    #[test]
    fn action_card_shows_its_button_label() {
        let rendered = format_message(&message(
            Role::Agent,
            "Draft ready.",
            MessagePayload::ActionCard {
                title: "Proposal Ready".into(),
                description: "Terms included.".into(),
                action_label: "Open Draft in Word".into(),
            },
        ));
        assert!(rendered.contains("Proposal Ready"));
        assert!(rendered.contains("[ Open Draft in Word ]"));
    }

    #[test]
    fn inert_suggestions_are_marked() {
        let chip = Suggestion {
            label: "Request VP Approval".into(),
            description: "Escalate.".into(),
            action: None,
            enabled: false,
        };
        assert!(format_suggestion(&chip).contains("(inactive)"));

        let chip = Suggestion {
            label: "Reduce discount".into(),
            description: "Stay in limits.".into(),
            action: Some(EntryPoint::ReviseTerms),
            enabled: true,
        };
        assert!(format_suggestion(&chip).starts_with("  > "));
    }

    #[test]
    fn proposal_table_formats_currency() {
        let rendered = format_proposal(&Proposal::initial());
        assert!(rendered.contains("500 x $30.00/mo"));
        assert!(rendered.contains("discount: 15%"));
        assert!(rendered.contains("$12750.00/mo"));
    }
}
