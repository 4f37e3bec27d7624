use thiserror::Error;

/// Failure talking to the chat endpoint.
///
/// The user only ever sees the fixed apology text; the variant is kept for
/// the diagnostic log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {after_ms}ms")]
    Timeout { after_ms: u32 },

    #[error("chat service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode chat service response: {0}")]
    Decode(String),
}

impl ChatError {
    /// Whether sending the same request again could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::Network(_) | ChatError::Timeout { .. } => true,
            ChatError::Status { status, .. } => *status == 429 || *status >= 500,
            ChatError::Decode(_) => false,
        }
    }
}

/// A user action the current state cannot accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("a message is already being sent")]
    Busy,

    #[error("no conversation with id {0}")]
    ConversationNotFound(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}
