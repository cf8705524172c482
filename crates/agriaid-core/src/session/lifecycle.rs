//! Session state machine: `None -> Active -> Ended`.
//!
//! The end check runs before a new message is accepted, so the turn that
//! discovers a boundary never reaches the model.

use std::fmt;

use chrono::{DateTime, Utc};

use agriaid_types::config::SessionConfig;
use agriaid_types::session::{Session, Speaker};

const SESSION_END_TEXT: &str =
    "Session ended. Thank you for using AgriAid! Start a new session anytime. 🌾";

/// Why a session was closed.
#[derive(Debug, Clone, PartialEq)]
pub enum EndReason {
    MessageLimit { max: u32 },
    TimeExpired { hours: f64 },
}

impl EndReason {
    /// The text sent back to the user when the session closes.
    pub fn notice(&self) -> String {
        match self {
            EndReason::MessageLimit { max } => {
                format!("Message limit ({max}) reached. {SESSION_END_TEXT}")
            }
            EndReason::TimeExpired { hours } => {
                format!("Session time ({hours}h) expired. {SESSION_END_TEXT}")
            }
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::MessageLimit { .. } => write!(f, "message_limit"),
            EndReason::TimeExpired { .. } => write!(f, "time_expired"),
        }
    }
}

/// What to do with an inbound message, given what the store returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// No active session: a new one may start, subject to rate limits.
    Start,
    /// The active session accepts the message.
    Continue(Session),
    /// The active session crossed a boundary and must close this turn.
    End(Session, EndReason),
}

/// Applies [`SessionConfig`] limits to sessions.
#[derive(Debug, Clone, Copy)]
pub struct SessionLifecycle<'a> {
    config: &'a SessionConfig,
}

impl<'a> SessionLifecycle<'a> {
    pub fn new(config: &'a SessionConfig) -> Self {
        Self { config }
    }

    /// Message cap is checked before elapsed time.
    pub fn end_reason(&self, session: &Session, now: DateTime<Utc>) -> Option<EndReason> {
        if session.message_count >= self.config.max_messages_per_session {
            return Some(EndReason::MessageLimit {
                max: self.config.max_messages_per_session,
            });
        }
        if session.elapsed(now) > self.config.session_duration() {
            return Some(EndReason::TimeExpired {
                hours: self.config.session_duration_hours,
            });
        }
        None
    }

    pub fn next(&self, existing: Option<Session>, now: DateTime<Utc>) -> Transition {
        match existing {
            None => Transition::Start,
            Some(session) if !session.is_active => Transition::Start,
            Some(session) => match self.end_reason(&session, now) {
                Some(reason) => Transition::End(session, reason),
                None => Transition::Continue(session),
            },
        }
    }

    /// Open a session whose first turn is `text`.
    pub fn start(&self, user: &str, text: &str, now: DateTime<Utc>) -> Session {
        let mut session = Session::new(user, now);
        session.message_count = 1;
        session.push(Speaker::Human, text, now);
        session
    }

    /// Accept another inbound turn into an active session.
    pub fn accept(&self, session: &mut Session, text: &str, now: DateTime<Utc>) {
        session.message_count += 1;
        session.push(Speaker::Human, text, now);
        session.last_activity = now;
    }

    pub fn end(&self, session: &mut Session) {
        session.is_active = false;
    }

    pub fn record_reply(&self, session: &mut Session, reply: &str, now: DateTime<Utc>) {
        session.push(Speaker::Assistant, reply, now);
        session.last_activity = now;
    }
}
