//! Configuration types for AgriAid.
//!
//! `ServiceConfig` mirrors the top-level `agriaid.toml`. Every field has a
//! default, so an empty file (or no file) yields a working configuration.

use std::time::Duration as StdDuration;

use serde::{Deserialize, Serialize};

/// Per-user session limits applied by the message router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Turns accepted before the session ends. Also the context window length.
    #[serde(default = "default_max_messages_per_session")]
    pub max_messages_per_session: u32,

    /// Wall-clock lifetime of a session, in hours.
    #[serde(default = "default_session_duration_hours")]
    pub session_duration_hours: f64,

    /// Sessions a user may start per calendar day.
    #[serde(default = "default_max_sessions_per_day")]
    pub max_sessions_per_day: u32,

    /// Minimum idle time before a new session may replace an active one.
    #[serde(default = "default_session_timeout_minutes")]
    pub session_timeout_minutes: f64,

    /// Upper bound for generated error replies (one SMS segment by default).
    #[serde(default = "default_max_reply_length")]
    pub max_reply_length: usize,
}

fn default_max_messages_per_session() -> u32 {
    10
}

fn default_session_duration_hours() -> f64 {
    1.0
}

fn default_max_sessions_per_day() -> u32 {
    5
}

fn default_session_timeout_minutes() -> f64 {
    30.0
}

fn default_max_reply_length() -> usize {
    160
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_messages_per_session: default_max_messages_per_session(),
            session_duration_hours: default_session_duration_hours(),
            max_sessions_per_day: default_max_sessions_per_day(),
            session_timeout_minutes: default_session_timeout_minutes(),
            max_reply_length: default_max_reply_length(),
        }
    }
}

impl SessionConfig {
    /// Session lifetime as a chrono duration (used for elapsed-time checks).
    pub fn session_duration(&self) -> chrono::Duration {
        millis_to_duration(self.session_duration_hours * 3_600_000.0)
    }

    /// Cooldown window as a chrono duration.
    pub fn session_timeout(&self) -> chrono::Duration {
        millis_to_duration(self.session_timeout_minutes * 60_000.0)
    }

    /// Cache TTL for session records. Negative or NaN hours collapse to zero.
    pub fn session_ttl(&self) -> StdDuration {
        let secs = self.session_duration_hours * 3600.0;
        if secs.is_nan() || secs <= 0.0 {
            return StdDuration::ZERO;
        }
        StdDuration::try_from_secs_f64(secs).unwrap_or(StdDuration::MAX)
    }
}

/// Negative and NaN inputs become zero; values past chrono's range saturate.
fn millis_to_duration(ms: f64) -> chrono::Duration {
    if ms.is_nan() || ms <= 0.0 {
        return chrono::Duration::zero();
    }
    chrono::Duration::try_milliseconds(ms as i64).unwrap_or(chrono::Duration::MAX)
}

/// Model and orchestration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of an OpenAI-compatible chat-completions API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Model calls allowed per inbound message before the loop gives up.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,

    /// Deadline for handling one inbound message end to end.
    #[serde(default = "default_message_deadline_secs")]
    pub message_deadline_secs: u64,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f64 {
    0.1
}

fn default_max_tool_rounds() -> u32 {
    6
}

fn default_message_deadline_secs() -> u64 {
    60
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_tool_rounds: default_max_tool_rounds(),
            message_deadline_secs: default_message_deadline_secs(),
        }
    }
}

impl AgentConfig {
    pub fn message_deadline(&self) -> StdDuration {
        StdDuration::from_secs(self.message_deadline_secs)
    }
}

/// Africa's Talking SMS gateway settings. The API key comes from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_username")]
    pub username: String,

    #[serde(default = "default_gateway_base_url")]
    pub base_url: String,

    /// Short code or alphanumeric sender ID. The gateway default is used when absent.
    #[serde(default)]
    pub sender_id: Option<String>,
}

fn default_gateway_username() -> String {
    "sandbox".to_string()
}

fn default_gateway_base_url() -> String {
    "https://api.sandbox.africastalking.com/version1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            username: default_gateway_username(),
            base_url: default_gateway_base_url(),
            sender_id: None,
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_limits_do_not_panic() {
        let config = SessionConfig {
            session_duration_hours: -1e300,
            session_timeout_minutes: 1e300,
            ..SessionConfig::default()
        };
        assert_eq!(config.session_duration(), chrono::Duration::zero());
        assert_eq!(config.session_timeout(), chrono::Duration::MAX);
        assert_eq!(config.session_ttl(), StdDuration::ZERO);
        let huge = SessionConfig {
            session_duration_hours: 1e300,
            ..SessionConfig::default()
        };
        assert_eq!(huge.session_ttl(), StdDuration::MAX);

        let config = SessionConfig {
            session_duration_hours: f64::NAN,
            session_timeout_minutes: f64::NEG_INFINITY,
            ..SessionConfig::default()
        };
        assert_eq!(config.session_duration(), chrono::Duration::zero());
        assert_eq!(config.session_timeout(), chrono::Duration::zero());
    }

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.max_messages_per_session, 10);
        assert_eq!(config.session_duration_hours, 1.0);
        assert_eq!(config.max_sessions_per_day, 5);
        assert_eq!(config.session_timeout_minutes, 30.0);
        assert_eq!(config.max_reply_length, 160);
    }

    #[test]
    fn test_service_config_deserialize_empty() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.agent.max_tool_rounds, 6);
        assert_eq!(config.agent.model, "gpt-4o");
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_service_config_partial_override() {
        let toml_str = r#"
[session]
max_messages_per_session = 30
max_sessions_per_day = 10

[agent]
max_tool_rounds = 4

[gateway]
sender_id = "AGRIAID"
"#;
        let config: ServiceConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.max_messages_per_session, 30);
        assert_eq!(config.session.max_sessions_per_day, 10);
        // Untouched fields keep their defaults
        assert_eq!(config.session.session_timeout_minutes, 30.0);
        assert_eq!(config.agent.max_tool_rounds, 4);
        assert_eq!(config.agent.message_deadline_secs, 60);
        assert_eq!(config.gateway.sender_id.as_deref(), Some("AGRIAID"));
        assert_eq!(config.gateway.username, "sandbox");
    }

    #[test]
    fn test_fractional_durations() {
        let config = SessionConfig {
            session_duration_hours: 0.5,
            session_timeout_minutes: 1.5,
            ..SessionConfig::default()
        };
        assert_eq!(config.session_duration(), chrono::Duration::minutes(30));
        assert_eq!(config.session_timeout(), chrono::Duration::seconds(90));
        assert_eq!(config.session_ttl(), StdDuration::from_secs(1800));
    }

    #[test]
    fn test_negative_duration_ttl_is_zero() {
        let config = SessionConfig {
            session_duration_hours: -1.0,
            ..SessionConfig::default()
        };
        assert_eq!(config.session_ttl(), StdDuration::ZERO);
        let huge = SessionConfig {
            session_duration_hours: 1e300,
            ..SessionConfig::default()
        };
        assert_eq!(huge.session_ttl(), StdDuration::MAX);
    }
}
