use serde::{Deserialize, Serialize};

use crate::model::Conversation;

/// Saved conversations, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    conversations: Vec<Conversation>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_conversations(conversations: Vec<Conversation>) -> Self {
        Self { conversations }
    }

    pub fn find(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Replace the conversation with the same id in place, or insert it at the front.
    pub fn upsert(&mut self, conversation: Conversation) {
        match self.conversations.iter_mut().find(|c| c.id == conversation.id) {
            Some(existing) => existing.messages = conversation.messages,
            None => self.conversations.insert(0, conversation),
        }
    }

    /// Remove by id, returning the removed conversation.
    pub fn remove(&mut self, id: &str) -> Option<Conversation> {
        let index = self.conversations.iter().position(|c| c.id == id)?;
        Some(self.conversations.remove(index))
    }

    pub fn clear(&mut self) {
        self.conversations.clear();
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conversation> {
        self.conversations.iter()
    }

    pub fn as_slice(&self) -> &[Conversation] {
        &self.conversations
    }
}
