//! Pure state transitions for the chat client.
//!
//! Nothing here performs I/O. [`crate::controller::ChatController`] wraps a
//! [`ChatState`], supplies the clock, and persists the history after each
//! transition that changed it.

use chrono::{DateTime, Utc};

use crate::config::SessionMode;
use crate::error::{ChatError, StateError};
use crate::history::History;
use crate::model::{generate_session_id, Conversation, Message, SessionId};
use crate::service::ChatRequest;

/// Shown in place of a reply whenever the chat service fails.
pub const FALLBACK_REPLY: &str = "Sorry, something went wrong. Please try again.";

/// A send that has been accepted and is waiting for the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    ticket: u64,
    conversation_id: SessionId,
    session_id: SessionId,
    message: String,
}

impl PendingSend {
    /// History entry the reply belongs to.
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Session id sent to the chat service.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn request(&self) -> ChatRequest {
        ChatRequest {
            message: self.message.clone(),
            session_id: self.session_id.clone(),
        }
    }
}

/// What happened when a pending send was completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The service reply was appended.
    Replied,
    /// The service failed; the fallback reply was appended.
    FellBack(ChatError),
    /// The session changed while the request was in flight; nothing was appended.
    Discarded,
}

impl Completion {
    pub fn history_changed(&self) -> bool {
        !matches!(self, Completion::Discarded)
    }
}

/// Everything the UI renders: the active conversation, the saved history and
/// whether a send is in flight.
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    messages: Vec<Message>,
    active_id: Option<SessionId>,
    history: History,
    in_flight: Option<u64>,
    next_ticket: u64,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(history: History) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Accept a user message: append it right away and mark the state busy.
    pub fn begin_send(
        &mut self,
        text: &str,
        session: &SessionMode,
        now: DateTime<Utc>,
    ) -> Result<PendingSend, StateError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StateError::EmptyMessage);
        }
        if self.is_busy() {
            return Err(StateError::Busy);
        }

        let conversation_id = self
            .active_id
            .get_or_insert_with(|| generate_session_id(now))
            .clone();
        // A fixed session still gets one history entry per conversation
        let session_id = match session {
            SessionMode::PerConversation => conversation_id.clone(),
            SessionMode::Fixed(id) => id.clone(),
        };

        self.messages.push(Message::user(text));

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.in_flight = Some(ticket);

        Ok(PendingSend {
            ticket,
            conversation_id,
            session_id,
            message: text.to_string(),
        })
    }

    /// Apply the service outcome for `pending`.
    ///
    /// Results for a send that was abandoned by a session change are dropped.
    pub fn complete_send(
        &mut self,
        pending: PendingSend,
        outcome: Result<String, ChatError>,
        now: DateTime<Utc>,
    ) -> Completion {
        if self.in_flight != Some(pending.ticket) {
            return Completion::Discarded;
        }
        self.in_flight = None;

        let completion = match outcome {
            Ok(reply) => {
                self.messages.push(Message::assistant(reply));
                Completion::Replied
            }
            Err(err) => {
                self.messages.push(Message::assistant(FALLBACK_REPLY));
                Completion::FellBack(err)
            }
        };

        self.history.upsert(Conversation::new(
            pending.conversation_id,
            self.messages.clone(),
            now,
        ));

        completion
    }

    /// Clear the active conversation. Any send in flight is abandoned.
    pub fn start_new_chat(&mut self) {
        self.messages.clear();
        self.active_id = None;
        self.in_flight = None;
    }

    pub fn load_chat(&mut self, id: &str) -> Result<(), StateError> {
        let conversation = self
            .history
            .find(id)
            .ok_or_else(|| StateError::ConversationNotFound(id.to_string()))?;

        self.messages = conversation.messages.clone();
        self.active_id = Some(conversation.id.clone());
        self.in_flight = None;
        Ok(())
    }

    pub fn delete_chat(&mut self, id: &str) -> Result<(), StateError> {
        self.history
            .remove(id)
            .ok_or_else(|| StateError::ConversationNotFound(id.to_string()))?;

        if self.active_id.as_deref() == Some(id) {
            self.start_new_chat();
        }
        Ok(())
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.start_new_chat();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn test_begin_send_rejects_blank_text() {
        let mut state = ChatState::new();
        let err = state
            .begin_send("  \n\t ", &SessionMode::PerConversation, at(1))
            .unwrap_err();
        assert_eq!(err, StateError::EmptyMessage);
        assert!(state.messages().is_empty());
        assert!(!state.is_busy());
        assert_eq!(state.active_id(), None);
    }

    #[test]
    fn test_begin_send_appends_trimmed_user_message() {
        let mut state = ChatState::new();
        let pending = state
            .begin_send("  bakery names  ", &SessionMode::PerConversation, at(42))
            .unwrap();

        assert_eq!(state.messages(), &[Message::user("bakery names")]);
        assert!(state.is_busy());
        assert_eq!(pending.session_id(), "chat-42");
        assert_eq!(pending.message(), "bakery names");
        assert_eq!(state.active_id(), Some("chat-42"));
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_begin_send_while_busy_is_rejected() {
        let mut state = ChatState::new();
        state
            .begin_send("one", &SessionMode::PerConversation, at(1))
            .unwrap();
        let err = state
            .begin_send("two", &SessionMode::PerConversation, at(2))
            .unwrap_err();
        assert_eq!(err, StateError::Busy);
        assert_eq!(state.messages().len(), 1);
    }

    #[test]
    fn test_fixed_session_mode_uses_configured_id() {
        let mut state = ChatState::new();
        let session = SessionMode::Fixed("akash-default".into());
        let pending = state.begin_send("hi", &session, at(7)).unwrap();
        assert_eq!(pending.session_id(), "akash-default");
        assert_eq!(pending.conversation_id(), "chat-7");
        assert_eq!(state.active_id(), Some("chat-7"));
    }

    #[test]
    fn test_fixed_session_keeps_separate_history_entries() {
        let mut state = ChatState::new();
        let session = SessionMode::Fixed("akash-default".into());
        let first = state.begin_send("Dosa cart names", &session, at(1)).unwrap();
        state.complete_send(first, Ok("Dosa Dash".into()), at(2));
        state.start_new_chat();
        let second = state.begin_send("Rooftop bar logo", &session, at(3)).unwrap();
        assert_eq!(second.session_id(), "akash-default");
        state.complete_send(second, Ok("A skyline glass".into()), at(4));

        let titles: Vec<&str> = state.history().iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Rooftop bar logo", "Dosa cart names"]);
        assert_eq!(state.history().find("chat-1").unwrap().messages[1].content, "Dosa Dash");
    }

    #[test]
    fn test_complete_send_failure_appends_fallback() {
        let mut state = ChatState::new();
        let pending = state
            .begin_send("hi", &SessionMode::PerConversation, at(1))
            .unwrap();
        let completion = state.complete_send(
            pending,
            Err(ChatError::Network("refused".into())),
            at(2),
        );

        assert_eq!(completion, Completion::FellBack(ChatError::Network("refused".into())));
        assert_eq!(state.messages()[1], Message::assistant(FALLBACK_REPLY));
        assert!(!state.is_busy());
        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn test_second_send_reuses_session_and_updates_entry() {
        let mut state = ChatState::new();
        let session = SessionMode::PerConversation;
        let first = state.begin_send("one", &session, at(10)).unwrap();
        state.complete_send(first, Ok("reply one".into()), at(11));
        let second = state.begin_send("two", &session, at(20)).unwrap();
        assert_eq!(second.session_id(), "chat-10");
        state.complete_send(second, Ok("reply two".into()), at(21));

        assert_eq!(state.history().len(), 1);
        let saved = state.history().find("chat-10").unwrap();
        assert_eq!(saved.messages.len(), 4);
        assert_eq!(saved.title, "one");
        assert_eq!(saved.timestamp, at(11));
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut state = ChatState::new();
        let pending = state
            .begin_send("hi", &SessionMode::PerConversation, at(1))
            .unwrap();
        state.start_new_chat();
        assert!(!state.is_busy());

        let completion = state.complete_send(pending, Ok("late".into()), at(2));
        assert_eq!(completion, Completion::Discarded);
        assert!(state.messages().is_empty());
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_stale_completion_does_not_clear_newer_send() {
        let mut state = ChatState::new();
        let session = SessionMode::PerConversation;
        let stale = state.begin_send("first", &session, at(1)).unwrap();
        state.start_new_chat();
        let current = state.begin_send("second", &session, at(2)).unwrap();

        assert_eq!(state.complete_send(stale, Ok("late".into()), at(3)), Completion::Discarded);
        assert!(state.is_busy());
        assert_eq!(state.complete_send(current, Ok("ok".into()), at(4)), Completion::Replied);
        assert!(!state.is_busy());
    }

    #[test]
    fn test_load_unknown_chat_leaves_state_unchanged() {
        let mut state = ChatState::new();
        let session = SessionMode::PerConversation;
        let pending = state.begin_send("hi", &session, at(1)).unwrap();
        state.complete_send(pending, Ok("hello".into()), at(2));

        let err = state.load_chat("chat-missing").unwrap_err();
        assert_eq!(err, StateError::ConversationNotFound("chat-missing".into()));
        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.active_id(), Some("chat-1"));
    }

    #[test]
    fn test_delete_inactive_chat_keeps_active_conversation() {
        let mut state = ChatState::new();
        let session = SessionMode::PerConversation;
        let first = state.begin_send("first", &session, at(1)).unwrap();
        state.complete_send(first, Ok("a".into()), at(2));
        state.start_new_chat();
        let second = state.begin_send("second", &session, at(3)).unwrap();
        state.complete_send(second, Ok("b".into()), at(4));

        state.delete_chat("chat-1").unwrap();
        assert_eq!(state.active_id(), Some("chat-3"));
        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.history().len(), 1);
    }
}
