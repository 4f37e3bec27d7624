//! History persistence.
//!
//! [`StorageBackend`] mirrors the browser's `localStorage` API so the same
//! [`HistoryStore`] logic runs against `window.localStorage` in the browser and
//! against [`MemoryStorage`] in tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::StoreError;
use crate::history::History;

/// Storage key holding the single session id of the fixed-session client.
pub const LEGACY_SESSION_KEY: &str = "sessionId";

/// A string key-value store.
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory backend. Clones share the same map, which lets a test drop one
/// store and reopen the "same" storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.items.borrow().contains_key(key)
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Reads and writes the whole history collection under one key.
pub struct HistoryStore<B> {
    backend: B,
    key: String,
}

impl<B: StorageBackend> HistoryStore<B> {
    pub fn new(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Load the saved history. A missing key is an empty history.
    pub fn load(&self) -> Result<History, StoreError> {
        match self.backend.get_item(&self.key)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(History::new()),
        }
    }

    /// Rewrite the snapshot; an empty history removes the key instead.
    pub fn save(&self, history: &History) -> Result<(), StoreError> {
        if history.is_empty() {
            return self.clear();
        }
        let json = serde_json::to_string(history)?;
        self.backend.set_item(&self.key, &json)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.backend.remove_item(&self.key)
    }
}

/// Session id for the fixed-session client: the stored one if present,
/// otherwise `default`, which is stored for next time.
pub fn resolve_fixed_session<B: StorageBackend>(
    backend: &B,
    default: &str,
) -> Result<String, StoreError> {
    if let Some(existing) = backend.get_item(LEGACY_SESSION_KEY)? {
        if !existing.trim().is_empty() {
            return Ok(existing);
        }
    }
    backend.set_item(LEGACY_SESSION_KEY, default)?;
    Ok(default.to_string())
}
