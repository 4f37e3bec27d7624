use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session identifier shared with the chat service.
pub type SessionId = String;

/// Longest title kept verbatim; anything longer is cut and gets an ellipsis.
pub const TITLE_MAX_CHARS: usize = 50;

const TITLE_ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A saved conversation as it appears in the sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: SessionId,
    pub title: String,
    pub messages: Vec<Message>,
    pub timestamp: DateTime<Utc>,
}

impl Conversation {
    /// Build a conversation record, taking the title from the first user message.
    pub fn new(id: SessionId, messages: Vec<Message>, timestamp: DateTime<Utc>) -> Self {
        let title = messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| derive_title(&m.content))
            .unwrap_or_default();

        Self {
            id,
            title,
            messages,
            timestamp,
        }
    }
}

/// Derive a sidebar title from the first user message.
pub fn derive_title(text: &str) -> String {
    match text.char_indices().nth(TITLE_MAX_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TITLE_ELLIPSIS),
        None => text.to_string(),
    }
}

/// Session id for a conversation first sent at `now`.
pub fn generate_session_id(now: DateTime<Utc>) -> SessionId {
    format!("chat-{}", now.timestamp_millis())
}
