//! Append-only message log.
//!
//! The transcript of a demo session is an ordered sequence of [`Message`]
//! entries. Entries are immutable once appended and are never removed; the
//! append order is the sole ordering guarantee presentation may rely on.
//! The log assigns each entry a strictly monotonic sequence number at
//! append time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The simulated agent.
    Agent,
    /// The human operator.
    User,
    /// The system itself (status notices, session banners).
    System,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Agent => write!(f, "agent"),
            Self::User => write!(f, "user"),
            Self::System => write!(f, "system"),
        }
    }
}

/// The structured payload of a message, tagged by kind.
///
/// Presentation matches on the variant to pick a renderer; the compiler
/// enforces exhaustiveness, so a new kind cannot silently fall through to
/// the plain-text path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MessagePayload {
    /// Plain display text, nothing beyond `content`.
    Plain,

    /// An agent reasoning trace shown as an ordered list of step
    /// descriptions (intent extraction, system lookups, policy checks).
    ReasoningTrace {
        /// Step descriptions in the order the agent "performed" them.
        steps: Vec<String>,
    },

    /// A proposed action the operator can accept (e.g. "Open Draft in
    /// Word"). The card is rendered with a title, a one-line description,
    /// and a button carrying the action label.
    ActionCard {
        /// Card headline.
        title: String,
        /// One-line summary of what accepting the action does.
        description: String,
        /// Label for the card's action button.
        action_label: String,
    },
}

/// One immutable entry in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Position in the log. Strictly monotonic from 0, assigned at append.
    pub seq: u64,
    /// Who produced this message.
    pub role: Role,
    /// Display text.
    pub content: String,
    /// Kind-specific structured payload.
    #[serde(flatten)]
    pub payload: MessagePayload,
    /// When the entry was appended.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Message log
// ---------------------------------------------------------------------------

/// Append-only, ordered collection of [`Message`] entries.
///
/// The log exposes no removal or in-place mutation API. Serialization of
/// appends is the caller's responsibility — in practice the workflow
/// controller is the only writer and holds its session lock across each
/// append.
#[derive(Debug, Default)]
pub struct MessageLog {
    entries: Vec<Message>,
}

impl MessageLog {
    /// Create a new, empty log.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a message, assigning it the next sequence number.
    ///
    /// Returns a clone of the stored entry so the caller can publish it to
    /// observers without re-reading the log.
    pub fn append(
        &mut self,
        role: Role,
        content: impl Into<String>,
        payload: MessagePayload,
    ) -> Message {
        let message = Message {
            seq: self.entries.len() as u64,
            role,
            content: content.into(),
            payload,
            created_at: Utc::now(),
        };
        tracing::debug!(seq = message.seq, role = %message.role, "message appended");
        self.entries.push(message.clone());
        message
    }

    /// Return the full ordered transcript for presentation.
    pub fn snapshot(&self) -> Vec<Message> {
        self.entries.clone()
    }

    /// Number of entries in the log.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recently appended entry, if any.
    pub fn last(&self) -> Option<&Message> {
        self.entries.last()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
