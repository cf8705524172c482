//! Bounded history fed to the model.

use agriaid_types::llm::{Message, MessageRole};
use agriaid_types::session::{Speaker, TranscriptEntry};

/// Keeps the last `len` transcript entries.
///
/// The length is the session message cap, so a session never has more
/// history than it has turns.
#[derive(Debug, Clone, Copy)]
pub struct ConversationWindow {
    len: usize,
}

impl ConversationWindow {
    pub fn new(len: usize) -> Self {
        Self { len }
    }

    /// Convert the tail of `history` into model messages, then append
    /// `current` unless it is already the final user message.
    pub fn build(&self, history: &[TranscriptEntry], current: &str) -> Vec<Message> {
        let skip = history.len().saturating_sub(self.len);
        let mut messages: Vec<Message> = history[skip..]
            .iter()
            .map(|entry| match entry.role {
                Speaker::Human => Message::user(entry.content.clone()),
                Speaker::Assistant => Message::assistant(entry.content.clone()),
            })
            .collect();

        let already_tail = messages
            .last()
            .is_some_and(|m| m.role == MessageRole::User && m.content == current);
        if !already_tail {
            messages.push(Message::user(current));
        }
        messages
    }
}
