use chrono::{DateTime, Utc};

use crate::config::SessionMode;
use crate::error::{ChatError, StateError};
use crate::history::History;
use crate::service::ChatService;
use crate::state::{ChatState, Completion, PendingSend};
use crate::store::{HistoryStore, StorageBackend};

/// Source of "now" for session ids and conversation timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Owns the chat state and writes the history back to storage after every
/// transition that changed it.
///
/// Sending is split into [`begin_send`](Self::begin_send) and
/// [`complete_send`](Self::complete_send) so a UI holding the controller in a
/// `RefCell` can release it while the request is in flight.
/// [`send_message`](Self::send_message) runs both halves.
pub struct ChatController<B, C = SystemClock> {
    state: ChatState,
    store: HistoryStore<B>,
    clock: C,
    session: SessionMode,
}

impl<B: StorageBackend, C: Clock> ChatController<B, C> {
    /// Create a controller, rehydrating the history from `store`.
    pub fn new(store: HistoryStore<B>, clock: C, session: SessionMode) -> Self {
        let history = match store.load() {
            Ok(history) => {
                log::info!("Loaded {} saved conversations", history.len());
                history
            }
            Err(e) => {
                log::warn!("Ignoring unreadable chat history: {}", e);
                History::new()
            }
        };

        Self {
            state: ChatState::with_history(history),
            store,
            clock,
            session,
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn begin_send(&mut self, text: &str) -> Result<PendingSend, StateError> {
        let pending = self.state.begin_send(text, &self.session, self.clock.now())?;
        log::debug!("Sending message in session {}", pending.session_id());
        Ok(pending)
    }

    pub fn complete_send(
        &mut self,
        pending: PendingSend,
        outcome: Result<String, ChatError>,
    ) -> Completion {
        let session_id = pending.session_id().to_string();
        let completion = self.state.complete_send(pending, outcome, self.clock.now());

        match &completion {
            Completion::Replied => {
                log::debug!("Reply received for session {}", session_id);
            }
            Completion::FellBack(err) => {
                log::error!(
                    "Chat request for session {} failed (retryable: {}): {}",
                    session_id,
                    err.is_retryable(),
                    err
                );
            }
            Completion::Discarded => {
                log::info!("Dropping reply for abandoned session {}", session_id);
            }
        }

        if completion.history_changed() {
            self.persist();
        }
        completion
    }

    /// Send `text` through `service` and record the outcome.
    ///
    /// Service failures become the fallback reply; only a rejected send
    /// (blank text, or another send still in flight) is an error.
    pub async fn send_message<S>(&mut self, service: &S, text: &str) -> Result<Completion, StateError>
    where
        S: ChatService + ?Sized,
    {
        let pending = self.begin_send(text)?;
        let outcome = service.send(&pending.request()).await;
        Ok(self.complete_send(pending, outcome))
    }

    pub fn start_new_chat(&mut self) {
        self.state.start_new_chat();
    }

    pub fn load_chat(&mut self, id: &str) -> Result<(), StateError> {
        self.state.load_chat(id)
    }

    pub fn delete_chat(&mut self, id: &str) -> Result<(), StateError> {
        self.state.delete_chat(id)?;
        self.persist();
        Ok(())
    }

    pub fn clear_all_history(&mut self) {
        self.state.clear_history();
        if let Err(e) = self.store.clear() {
            log::warn!("Failed to remove saved chat history: {}", e);
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(self.state.history()) {
            log::warn!("Failed to save chat history: {}", e);
        }
    }
}
