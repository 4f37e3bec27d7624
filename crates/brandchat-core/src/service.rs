use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Body posted to the chat endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

/// Body returned by the chat endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// The remote assistant.
///
/// Futures are not `Send`: in the browser everything runs on the one event
/// loop thread.
#[async_trait(?Send)]
pub trait ChatService {
    /// Send one message and return the assistant's reply text.
    async fn send(&self, request: &ChatRequest) -> Result<String, ChatError>;
}

/// [`ChatService`] over HTTP. On wasm32 reqwest goes through `fetch`.
pub struct HttpChatService {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpChatService {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl ChatService for HttpChatService {
    async fn send(&self, request: &ChatRequest) -> Result<String, ChatError> {
        log::debug!(
            "POST {} (session {}, {} chars)",
            self.endpoint,
            request.session_id,
            request.message.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let reply: ChatReply =
            serde_json::from_str(&body).map_err(|e| ChatError::Decode(e.to_string()))?;

        Ok(reply.response)
    }
}
