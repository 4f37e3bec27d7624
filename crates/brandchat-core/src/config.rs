//! Client configuration.
//!
//! Values come from environment-style keys. The browser build has no process
//! environment, so `brandchat-web` captures them at compile time and feeds
//! them through [`ClientConfig::from_lookup`].

/// Chat endpoint used when `BRANDCHAT_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1/chat";

/// Storage key for the serialized history collection.
pub const DEFAULT_HISTORY_KEY: &str = "chatHistory";

pub const DEFAULT_REQUEST_TIMEOUT_MS: u32 = 120_000;

pub const ENV_API_URL: &str = "BRANDCHAT_API_URL";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "BRANDCHAT_REQUEST_TIMEOUT_MS";
pub const ENV_SESSION_ID: &str = "BRANDCHAT_SESSION_ID";

/// How session identifiers are assigned to new conversations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    /// Each conversation gets `chat-<epoch millis>` on its first send.
    PerConversation,
    /// Every conversation talks to the service under the same id.
    Fixed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    /// `None` waits for the service indefinitely.
    pub request_timeout_ms: Option<u32>,
    pub session: SessionMode,
    pub history_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_ms: Some(DEFAULT_REQUEST_TIMEOUT_MS),
            session: SessionMode::PerConversation,
            history_key: DEFAULT_HISTORY_KEY.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from a key lookup, falling back to defaults for
    /// missing, blank or unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(url) = get(ENV_API_URL) {
            config.api_url = url;
        }

        if let Some(raw) = get(ENV_REQUEST_TIMEOUT_MS) {
            match raw.parse::<u32>() {
                Ok(0) => config.request_timeout_ms = None,
                Ok(ms) => config.request_timeout_ms = Some(ms),
                Err(_) => {
                    log::warn!("Ignoring invalid {}: {}", ENV_REQUEST_TIMEOUT_MS, raw);
                }
            }
        }

        if let Some(id) = get(ENV_SESSION_ID) {
            config.session = SessionMode::Fixed(id);
        }

        config
    }
}
