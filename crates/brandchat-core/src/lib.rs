//! Core logic for the Restaurant Branding Assistant chat client
//!
//! This crate holds everything that does not touch the DOM: the message and
//! conversation model, the history collection, the state transitions behind
//! each user action, the storage adapter, and the HTTP client for the chat
//! endpoint. The browser front end lives in `brandchat-web`.

pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod model;
pub mod service;
pub mod state;
pub mod store;

pub use config::{ClientConfig, SessionMode, DEFAULT_API_URL};
pub use controller::{ChatController, Clock, SystemClock};
pub use error::{ChatError, StateError, StoreError};
pub use history::History;
pub use model::{derive_title, Conversation, Message, Role, SessionId};
pub use service::{ChatReply, ChatRequest, ChatService, HttpChatService};
pub use state::{ChatState, Completion, PendingSend, FALLBACK_REPLY};
pub use store::{HistoryStore, MemoryStorage, StorageBackend};
