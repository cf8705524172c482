//! Session and transcript types.
//!
//! A [`Session`] is the bounded conversation between one phone number and the
//! assistant. It is serialized as JSON into the TTL cache on every turn.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who wrote a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Human,
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::Human => write!(f, "human"),
            Speaker::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for Speaker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Speaker::Human),
            "assistant" => Ok(Speaker::Assistant),
            other => Err(format!("invalid speaker: '{other}'")),
        }
    }
}

/// One entry of a session transcript. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Speaker,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A conversation session stored in the TTL cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: Uuid,
    pub user_identifier: String,
    pub messages: Vec<TranscriptEntry>,
    pub message_count: u32,
    pub session_start: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub is_active: bool,
}

impl Session {
    /// Create an empty, active session for `user` starting at `now`.
    pub fn new(user: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            session_id: Uuid::now_v7(),
            user_identifier: user.into(),
            messages: Vec::new(),
            message_count: 0,
            session_start: now,
            last_activity: now,
            is_active: true,
        }
    }

    /// Append a transcript entry. Does not touch counters.
    pub fn push(&mut self, role: Speaker, content: impl Into<String>, now: DateTime<Utc>) {
        self.messages.push(TranscriptEntry {
            role,
            content: content.into(),
            timestamp: now,
        });
    }

    /// Time elapsed since the session started.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        now - self.session_start
    }

    /// Time elapsed since the last recorded activity.
    pub fn idle(&self, now: DateTime<Utc>) -> Duration {
        now - self.last_activity
    }
}

/// Outcome of a session-start check. `reason` is user-facing and empty when allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub reason: String,
}

impl RateLimitDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: String::new(),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_active_and_empty() {
        let now = Utc::now();
        let session = Session::new("+254700000001", now);
        assert!(session.is_active);
        assert_eq!(session.message_count, 0);
        assert!(session.messages.is_empty());
        assert_eq!(session.session_start, now);
        assert_eq!(session.last_activity, now);
    }

    #[test]
    fn push_preserves_order() {
        let now = Utc::now();
        let mut session = Session::new("+254700000001", now);
        session.push(Speaker::Human, "maize pests?", now);
        session.push(Speaker::Assistant, "Try neem extract.", now);
        assert_eq!(session.messages[0].role, Speaker::Human);
        assert_eq!(session.messages[1].content, "Try neem extract.");
        assert_eq!(session.message_count, 0);
    }

    #[test]
    fn speaker_serializes_lowercase() {
        let json = serde_json::to_string(&Speaker::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        assert_eq!("Human".parse::<Speaker>().unwrap(), Speaker::Human);
        assert!("ai".parse::<Speaker>().is_err());
    }

    #[test]
    fn elapsed_and_idle() {
        let start = Utc::now();
        let mut session = Session::new("u", start);
        session.last_activity = start + Duration::minutes(10);
        let now = start + Duration::minutes(25);
        assert_eq!(session.elapsed(now), Duration::minutes(25));
        assert_eq!(session.idle(now), Duration::minutes(15));
    }

    #[test]
    fn rate_limit_decision_constructors() {
        assert!(RateLimitDecision::allow().allowed);
        let denied = RateLimitDecision::deny("come back tomorrow");
        assert!(!denied.allowed);
        assert_eq!(denied.reason, "come back tomorrow");
    }
}
