use std::cell::RefCell;
use std::rc::Rc;

use brandchat_core::store::{resolve_fixed_session, HistoryStore};
use brandchat_core::{ChatController, ChatService, ClientConfig, HttpChatService, SessionMode, SystemClock};
use chrono::Utc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Event, KeyboardEvent};

use crate::dom;
use crate::storage::BrowserStorage;
use crate::transport::TimeoutService;
use crate::utils;
use crate::view::{self, ViewState};

type Controller = ChatController<BrowserStorage, SystemClock>;

/// The chat page: wires DOM events to the controller and re-renders after
/// every change.
#[derive(Clone)]
pub struct ChatApp {
    document: Document,
    controller: Rc<RefCell<Controller>>,
    service: Rc<TimeoutService<HttpChatService>>,
    view: Rc<RefCell<ViewState>>,
}

impl ChatApp {
    pub fn new(config: ClientConfig) -> Result<Self, JsValue> {
        let document = crate::document()?;
        let storage = BrowserStorage::open();

        let session = match &config.session {
            SessionMode::Fixed(default) => match resolve_fixed_session(&storage, default) {
                Ok(id) => SessionMode::Fixed(id),
                Err(e) => {
                    log::warn!("Could not read stored session id: {}", e);
                    config.session.clone()
                }
            },
            SessionMode::PerConversation => SessionMode::PerConversation,
        };

        let controller = ChatController::new(
            HistoryStore::new(storage, config.history_key.clone()),
            SystemClock,
            session,
        );
        let http = HttpChatService::new(config.api_url.clone());
        log::info!(
            "Sending chat requests to {} (timeout: {:?} ms)",
            http.endpoint(),
            config.request_timeout_ms
        );
        let service = TimeoutService::new(http, config.request_timeout_ms);

        Ok(Self {
            document,
            controller: Rc::new(RefCell::new(controller)),
            service: Rc::new(service),
            view: Rc::new(RefCell::new(ViewState::default())),
        })
    }

    pub fn start(self) -> Result<(), JsValue> {
        self.setup_message_input()?;
        self.setup_example_prompts()?;
        self.setup_sidebar()?;
        self.setup_clear_confirmation()?;
        self.render()
    }

    fn setup_message_input(&self) -> Result<(), JsValue> {
        let form = dom::get_element_by_id(&self.document, "chatForm")?;
        let app = self.clone();
        dom::add_listener(&form, "submit", move |event: Event| {
            event.prevent_default();
            wasm_bindgen_futures::spawn_local(app.clone().submit());
        })?;

        let input = dom::get_textarea_by_id(&self.document, "messageInput")?;

        let app = self.clone();
        dom::add_listener(&input, "keydown", move |event: Event| {
            let Ok(key_event) = event.dyn_into::<KeyboardEvent>() else {
                return;
            };
            if key_event.key() == "Enter" && !key_event.shift_key() {
                key_event.prevent_default();
                wasm_bindgen_futures::spawn_local(app.clone().submit());
            }
        })?;

        // Auto-resize and keep the send button in sync with the text
        let app = self.clone();
        dom::add_listener(&input, "input", move |_event: Event| {
            if let Err(e) = app.sync_input() {
                log::error!("Failed to update input: {:?}", e);
            }
        })?;

        Ok(())
    }

    fn setup_example_prompts(&self) -> Result<(), JsValue> {
        let container = dom::get_element_by_id(&self.document, "messagesContainer")?;
        let app = self.clone();
        dom::add_listener(&container, "click", move |event: Event| {
            let Some(chip) = dom::closest_target(&event, "[data-prompt]") else {
                return;
            };
            let Some(prompt) = chip.get_attribute("data-prompt") else {
                return;
            };
            if let Err(e) = app.fill_input(&prompt) {
                log::error!("Failed to apply example prompt: {:?}", e);
            }
        })
    }

    fn setup_sidebar(&self) -> Result<(), JsValue> {
        let new_chat = dom::get_element_by_id(&self.document, "newChatButton")?;
        let app = self.clone();
        dom::add_listener(&new_chat, "click", move |_event: Event| {
            app.controller.borrow_mut().start_new_chat();
            app.rerender();
        })?;

        let chat_list = dom::get_element_by_id(&self.document, "chatList")?;
        let app = self.clone();
        dom::add_listener(&chat_list, "click", move |event: Event| {
            if let Some(button) = dom::closest_target(&event, "[data-action='delete']") {
                event.stop_propagation();
                if let Some(id) = button.get_attribute("data-chat-id") {
                    app.delete_chat(&id);
                }
                return;
            }
            if let Some(item) = dom::closest_target(&event, "[data-chat-id]") {
                if let Some(id) = item.get_attribute("data-chat-id") {
                    app.load_chat(&id);
                }
            }
        })?;

        for id in ["sidebarOpenButton", "sidebarCloseButton"] {
            let toggle = dom::get_element_by_id(&self.document, id)?;
            let app = self.clone();
            dom::add_listener(&toggle, "click", move |_event: Event| {
                {
                    let mut view = app.view.borrow_mut();
                    view.sidebar_open = !view.sidebar_open;
                    log::debug!("Sidebar open: {}", view.sidebar_open);
                }
                app.rerender();
            })?;
        }

        let clear_all = dom::get_element_by_id(&self.document, "clearAllButton")?;
        let app = self.clone();
        dom::add_listener(&clear_all, "click", move |_event: Event| {
            app.view.borrow_mut().confirm_clear_open = true;
            app.rerender();
        })?;

        Ok(())
    }

    fn setup_clear_confirmation(&self) -> Result<(), JsValue> {
        let modal = dom::get_element_by_id(&self.document, "clearConfirmModal")?;
        let app = self.clone();
        dom::add_listener(&modal, "click", move |event: Event| {
            // Only clicks on the overlay itself, not inside the dialog
            let on_overlay = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                .map(|el| el.id() == "clearConfirmModal")
                .unwrap_or(false);
            if on_overlay {
                app.close_clear_confirmation();
            }
        })?;

        let cancel = dom::get_element_by_id(&self.document, "cancelClearButton")?;
        let app = self.clone();
        dom::add_listener(&cancel, "click", move |_event: Event| {
            app.close_clear_confirmation();
        })?;

        let confirm = dom::get_element_by_id(&self.document, "confirmClearButton")?;
        let app = self.clone();
        dom::add_listener(&confirm, "click", move |_event: Event| {
            log::info!("Clearing all conversations");
            app.controller.borrow_mut().clear_all_history();
            app.view.borrow_mut().confirm_clear_open = false;
            app.rerender();
        })?;

        Ok(())
    }

    async fn submit(self) {
        if let Err(e) = self.try_submit().await {
            log::error!("Failed to send message: {:?}", e);
        }
    }

    async fn try_submit(&self) -> Result<(), JsValue> {
        let input = dom::get_textarea_by_id(&self.document, "messageInput")?;

        let begun = self.controller.borrow_mut().begin_send(&input.value());
        let pending = match begun {
            Ok(pending) => pending,
            Err(e) => {
                log::debug!("Message not sent: {}", e);
                return Ok(());
            }
        };

        input.set_value("");
        dom::reset_height(&input);
        // The pending send must still complete, or busy never clears
        self.rerender();

        let outcome = self.service.send(&pending.request()).await;
        self.controller.borrow_mut().complete_send(pending, outcome);
        self.render()
    }

    fn load_chat(&self, id: &str) {
        let loaded = self.controller.borrow_mut().load_chat(id);
        match loaded {
            Ok(()) => self.rerender(),
            Err(e) => log::warn!("Cannot open conversation: {}", e),
        }
    }

    fn delete_chat(&self, id: &str) {
        let deleted = self.controller.borrow_mut().delete_chat(id);
        match deleted {
            Ok(()) => self.rerender(),
            Err(e) => log::warn!("Cannot delete conversation: {}", e),
        }
    }

    fn close_clear_confirmation(&self) {
        self.view.borrow_mut().confirm_clear_open = false;
        self.rerender();
    }

    fn fill_input(&self, text: &str) -> Result<(), JsValue> {
        let input = dom::get_textarea_by_id(&self.document, "messageInput")?;
        input.set_value(text);
        input.focus()?;
        self.sync_input()
    }

    fn sync_input(&self) -> Result<(), JsValue> {
        let input = dom::get_textarea_by_id(&self.document, "messageInput")?;
        dom::fit_height(&input);

        let busy = self.controller.borrow().state().is_busy();
        let send = dom::get_button_by_id(&self.document, "sendButton")?;
        send.set_disabled(busy || input.value().trim().is_empty());
        Ok(())
    }

    /// Render from an event callback, where there is no caller to return to.
    fn rerender(&self) {
        if let Err(e) = self.render() {
            log::error!("Failed to render: {:?}", e);
        }
    }

    fn render(&self) -> Result<(), JsValue> {
        let controller = self.controller.borrow();
        let state = controller.state();
        let view = self.view.borrow();

        let hour = js_sys::Date::new_0().get_hours();
        let container = dom::get_element_by_id(&self.document, "messagesContainer")?;
        container.set_inner_html(&view::render_thread(
            state.messages(),
            state.is_busy(),
            utils::greeting(hour),
        ));
        dom::scroll_to_bottom(&container);

        let input = dom::get_textarea_by_id(&self.document, "messageInput")?;
        input.set_disabled(state.is_busy());
        let send = dom::get_button_by_id(&self.document, "sendButton")?;
        send.set_disabled(state.is_busy() || input.value().trim().is_empty());

        let chat_list = dom::get_element_by_id(&self.document, "chatList")?;
        chat_list.set_inner_html(&view::render_history_list(
            state.history(),
            state.active_id(),
            Utc::now(),
        ));

        let clear_all = dom::get_html_element_by_id(&self.document, "clearAllButton")?;
        dom::set_visible(&clear_all, !state.history().is_empty());

        let sidebar = dom::get_element_by_id(&self.document, "sidebar")?;
        sidebar.set_class_name(if view.sidebar_open {
            "sidebar open"
        } else {
            "sidebar closed"
        });
        let chat_area = dom::get_element_by_id(&self.document, "chatArea")?;
        chat_area.set_class_name(if view.sidebar_open {
            "chat-area with-sidebar"
        } else {
            "chat-area full-width"
        });
        let open_button = dom::get_html_element_by_id(&self.document, "sidebarOpenButton")?;
        dom::set_visible(&open_button, !view.sidebar_open);

        let modal = dom::get_html_element_by_id(&self.document, "clearConfirmModal")?;
        dom::set_visible(&modal, view.confirm_clear_open);

        Ok(())
    }
}
