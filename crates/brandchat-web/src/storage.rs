use brandchat_core::{MemoryStorage, StorageBackend, StoreError};
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// `window.localStorage`, or an in-memory map when the browser refuses
/// storage (private windows, disabled cookies).
pub enum BrowserStorage {
    Local(Storage),
    Memory(MemoryStorage),
}

impl BrowserStorage {
    pub fn open() -> Self {
        match crate::window().and_then(|w| w.local_storage()) {
            Ok(Some(storage)) => BrowserStorage::Local(storage),
            Ok(None) | Err(_) => {
                log::warn!("localStorage unavailable; chat history will not survive a reload");
                BrowserStorage::Memory(MemoryStorage::new())
            }
        }
    }
}

fn js_error(err: JsValue) -> StoreError {
    StoreError::Backend(format!("{:?}", err))
}

impl StorageBackend for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            BrowserStorage::Local(storage) => storage.get_item(key).map_err(js_error),
            BrowserStorage::Memory(memory) => memory.get_item(key),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            BrowserStorage::Local(storage) => storage.set_item(key, value).map_err(js_error),
            BrowserStorage::Memory(memory) => memory.set_item(key, value),
        }
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        match self {
            BrowserStorage::Local(storage) => storage.remove_item(key).map_err(js_error),
            BrowserStorage::Memory(memory) => memory.remove_item(key),
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use brandchat_core::store::HistoryStore;
    use brandchat_core::{Conversation, History, Message};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const KEY: &str = "brandchatStorageTest";

    #[wasm_bindgen_test]
    fn local_storage_round_trip_and_clear() {
        let storage = BrowserStorage::open();
        assert!(matches!(storage, BrowserStorage::Local(_)));
        let store = HistoryStore::new(storage, KEY);

        let mut history = History::new();
        history.upsert(Conversation::new(
            "chat-1".into(),
            vec![Message::user("Rooftop bar names"), Message::assistant("Skyline Social")],
            chrono::Utc::now(),
        ));
        store.save(&history).unwrap();
        assert_eq!(store.load().unwrap(), history);

        store.save(&History::new()).unwrap();
        let raw = crate::window()
            .unwrap()
            .local_storage()
            .unwrap()
            .unwrap()
            .get_item(KEY)
            .unwrap();
        assert_eq!(raw, None);
    }
}
