//! Shared fixtures for brandchat-core integration tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use async_trait::async_trait;
use brandchat_core::store::HistoryStore;
use brandchat_core::{
    ChatController, ChatError, ChatRequest, ChatService, Clock, MemoryStorage, SessionMode,
};
use chrono::{DateTime, Utc};

pub const HISTORY_KEY: &str = "chatHistory";

/// Chat service that answers from a script and records every request.
#[derive(Default)]
pub struct ScriptedService {
    replies: RefCell<VecDeque<Result<String, ChatError>>>,
    requests: RefCell<Vec<ChatRequest>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(reply: &str) -> Self {
        let service = Self::new();
        service.push_reply(reply);
        service
    }

    pub fn failing(err: ChatError) -> Self {
        let service = Self::new();
        service.push_error(err);
        service
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies.borrow_mut().push_back(Ok(reply.to_string()));
    }

    pub fn push_error(&self, err: ChatError) {
        self.replies.borrow_mut().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl ChatService for ScriptedService {
    async fn send(&self, request: &ChatRequest) -> Result<String, ChatError> {
        self.requests.borrow_mut().push(request.clone());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::Network("no scripted reply".to_string())))
    }
}

/// Clock that starts at a fixed instant and moves forward one second per read.
pub struct StepClock {
    next_ms: Cell<i64>,
}

impl StepClock {
    pub fn starting_at(ms: i64) -> Self {
        Self {
            next_ms: Cell::new(ms),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let ms = self.next_ms.get();
        self.next_ms.set(ms + 1_000);
        DateTime::from_timestamp_millis(ms).expect("timestamp in range")
    }
}

pub type TestController = ChatController<MemoryStorage, StepClock>;

pub fn controller_with(storage: &MemoryStorage) -> TestController {
    controller_in_session(storage, SessionMode::PerConversation)
}

pub fn controller_in_session(storage: &MemoryStorage, session: SessionMode) -> TestController {
    ChatController::new(
        HistoryStore::new(storage.clone(), HISTORY_KEY),
        StepClock::starting_at(1_700_000_000_000),
        session,
    )
}
