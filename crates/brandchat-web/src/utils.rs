use chrono::{DateTime, Utc};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Escape HTML to prevent XSS
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Sidebar label for when a conversation was started
pub fn format_relative_date(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - timestamp).num_milliseconds().abs() / MS_PER_DAY;
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{} days ago", days),
        _ => timestamp.format("%-m/%-d/%Y").to_string(),
    }
}

/// Welcome-screen greeting for a local hour of day (0-23)
pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    }
}
