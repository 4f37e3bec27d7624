//! HTML for the message thread and the sidebar.
//!
//! Everything here is a pure function of the controller state so it can be
//! tested without a browser; `chat_ui` pushes the strings into the DOM.

use brandchat_core::{History, Message, Role};
use chrono::{DateTime, Utc};

use crate::markdown;
use crate::utils::{escape_html, format_relative_date};

pub const THINKING_TEXT: &str = "Thinking about your restaurant concept...";

const ASSISTANT_AVATAR: &str = "☀️";
const USER_AVATAR: &str = "U";

/// Prompt chips on the welcome screen: (icon, text placed in the input)
pub const EXAMPLE_PROMPTS: [(&str, &str); 5] = [
    ("📝", "Code"),
    ("✍️", "Write"),
    ("📊", "Strategize"),
    ("🎓", "Learn"),
    ("☕", "Life stuff"),
];

/// Purely local UI toggles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub sidebar_open: bool,
    pub confirm_clear_open: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            confirm_clear_open: false,
        }
    }
}

/// The message thread, or the welcome screen for an empty conversation
pub fn render_thread(messages: &[Message], busy: bool, greeting: &str) -> String {
    if messages.is_empty() && !busy {
        return render_welcome(greeting);
    }

    let mut html = String::from(r#"<div class="messages">"#);
    for message in messages {
        html.push_str(&render_message(message));
    }
    if busy {
        html.push_str(&format!(
            r#"<div class="message-wrapper assistant"><div class="message-content"><div class="message-avatar">{}</div><div class="message-text"><div class="typing-indicator">{}</div></div></div></div>"#,
            ASSISTANT_AVATAR, THINKING_TEXT
        ));
    }
    html.push_str("</div>");
    html
}

fn render_message(message: &Message) -> String {
    let avatar = match message.role {
        Role::User => USER_AVATAR,
        Role::Assistant => ASSISTANT_AVATAR,
    };
    format!(
        r#"<div class="message-wrapper {}"><div class="message-content"><div class="message-avatar">{}</div><div class="message-text markdown">{}</div></div></div>"#,
        message.role.as_str(),
        avatar,
        markdown::render_markdown(&message.content)
    )
}

fn render_welcome(greeting: &str) -> String {
    let prompts: String = EXAMPLE_PROMPTS
        .iter()
        .map(|(icon, text)| {
            format!(
                r#"<button type="button" class="example-prompt" data-prompt="{text}"><span>{icon}</span><span>{text}</span></button>"#,
                text = escape_html(text),
                icon = icon
            )
        })
        .collect();

    format!(
        r#"<div class="welcome-screen"><div class="welcome-icon">{}</div><h2>{}</h2><div class="example-prompts">{}</div></div>"#,
        ASSISTANT_AVATAR,
        escape_html(greeting),
        prompts
    )
}

/// Sidebar list of saved conversations
pub fn render_history_list(history: &History, active_id: Option<&str>, now: DateTime<Utc>) -> String {
    if history.is_empty() {
        return String::new();
    }

    let mut html = String::from(r#"<div class="chat-group"><div class="group-title">Recents</div>"#);
    for conversation in history.iter() {
        let active = if active_id == Some(conversation.id.as_str()) {
            " active"
        } else {
            ""
        };
        let id = escape_html(&conversation.id);
        html.push_str(&format!(
            r#"<div class="chat-item{active}" data-chat-id="{id}"><div class="chat-title">{title}</div><div class="chat-date">{date}</div><button type="button" class="delete-chat-btn" data-action="delete" data-chat-id="{id}" title="Delete conversation">✕</button></div>"#,
            active = active,
            id = id,
            title = escape_html(&conversation.title),
            date = format_relative_date(conversation.timestamp, now),
        ));
    }
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandchat_core::Conversation;
    use pretty_assertions::assert_eq;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn test_empty_thread_shows_welcome() {
        let html = render_thread(&[], false, "Good evening");
        assert!(html.contains("welcome-screen"));
        assert!(html.contains("<h2>Good evening</h2>"));
        assert_eq!(html.matches("data-prompt=").count(), EXAMPLE_PROMPTS.len());
        assert!(html.contains(r#"data-prompt="Life stuff""#));
    }

    #[test]
    fn test_thread_renders_markdown_per_role() {
        let messages = vec![
            Message::user("Names please"),
            Message::assistant("Try **Saffron Terrace**."),
        ];
        let html = render_thread(&messages, false, "Good evening");
        assert!(!html.contains("welcome-screen"));
        assert!(html.contains(r#"<div class="message-wrapper user">"#));
        assert!(html.contains(r#"<div class="message-wrapper assistant">"#));
        assert!(html.contains("<strong>Saffron Terrace</strong>"));
        assert!(!html.contains(THINKING_TEXT));
    }

    #[test]
    fn test_busy_thread_shows_thinking() {
        let messages = vec![Message::user("Names please")];
        let html = render_thread(&messages, true, "Good evening");
        assert!(html.contains(THINKING_TEXT));
    }

    #[test]
    fn test_history_list_marks_active_and_escapes() {
        let mut history = History::new();
        history.upsert(Conversation::new(
            "chat-1".into(),
            vec![Message::user("<b>Fusion</b> names")],
            at(0),
        ));
        history.upsert(Conversation::new(
            "chat-2".into(),
            vec![Message::user("Menu fonts")],
            at(0),
        ));

        let html = render_history_list(&history, Some("chat-1"), at(60_000));
        assert!(html.contains("Recents"));
        assert!(html.contains(r#"<div class="chat-item active" data-chat-id="chat-1">"#));
        assert!(html.contains(r#"<div class="chat-item" data-chat-id="chat-2">"#));
        assert!(html.contains("&lt;b&gt;Fusion&lt;/b&gt; names"));
        assert!(html.contains("Today"));
        assert!(html.find("chat-2").unwrap() < html.find("chat-1").unwrap());
    }

    #[test]
    fn test_empty_history_renders_nothing() {
        assert_eq!(render_history_list(&History::new(), None, at(0)), "");
    }
}
