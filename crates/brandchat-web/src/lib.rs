use brandchat_core::config::{ENV_API_URL, ENV_REQUEST_TIMEOUT_MS, ENV_SESSION_ID};
use brandchat_core::ClientConfig;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

mod chat_ui;
mod dom;
mod markdown;
mod storage;
mod transport;
mod utils;
mod view;

/// Initialize the WASM application
/// This sets up panic hooks and logging
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    log::info!("Restaurant Branding Assistant initialized");
}

/// Mount the chat client on the current page
#[wasm_bindgen]
pub fn start_chat() -> Result<(), JsValue> {
    chat_ui::ChatApp::new(build_config())?.start()
}

/// Configuration captured from the build environment, like a bundler's
/// `process.env` substitution.
fn build_config() -> ClientConfig {
    ClientConfig::from_lookup(|key| {
        let value = match key {
            ENV_API_URL => option_env!("BRANDCHAT_API_URL"),
            ENV_REQUEST_TIMEOUT_MS => option_env!("BRANDCHAT_REQUEST_TIMEOUT_MS"),
            ENV_SESSION_ID => option_env!("BRANDCHAT_SESSION_ID"),
            _ => None,
        };
        value.map(str::to_string)
    })
}

/// Get the window object
fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))
}

/// Get the document object
fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("No document object"))
}
