//! Fixed texts sent to users outside of model replies.

use std::fmt::Display;

use agriaid_types::config::SessionConfig;

const ELLIPSIS: &str = "...";
const ERROR_DETAIL_CHARS: usize = 50;

/// Prepended to the first reply of a new session.
pub fn welcome_notice(config: &SessionConfig) -> String {
    format!(
        "Welcome to AgriAid! 🌱\nSession: {}h, Max {} messages.\n",
        config.session_duration_hours, config.max_messages_per_session
    )
}

/// Generic failure reply, at most `max_len` characters.
pub fn error_reply(err: &dyn Display, max_len: usize) -> String {
    let detail: String = err.to_string().chars().take(ERROR_DETAIL_CHARS).collect();
    truncate_reply(
        &format!("Sorry, I encountered an error. Please try again. Error: {detail}"),
        max_len,
    )
}

/// Cut `text` to `max_len` characters, ending in `...` when shortened.
pub fn truncate_reply(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    if max_len <= ELLIPSIS.len() {
        return text.chars().take(max_len).collect();
    }
    let mut out: String = text.chars().take(max_len - ELLIPSIS.len()).collect();
    out.push_str(ELLIPSIS);
    out
}
