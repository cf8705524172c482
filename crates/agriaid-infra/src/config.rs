//! Service configuration loader.
//!
//! Reads `agriaid.toml` into [`ServiceConfig`], falling back to defaults when
//! the file is missing or malformed. Secrets never live in the file: they are
//! read from the environment by [`secret_from_env`].

use std::path::Path;

use secrecy::SecretString;

use agriaid_types::config::ServiceConfig;

/// Environment variable holding the chat-completions API key.
pub const LLM_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Environment variable holding the Africa's Talking API key.
pub const GATEWAY_API_KEY_VAR: &str = "AT_API_KEY";

/// Load configuration from `path`.
///
/// - Missing file: [`ServiceConfig::default()`].
/// - Unreadable or unparseable file: warning, then the default.
pub async fn load_service_config(path: &Path) -> ServiceConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return ServiceConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return ServiceConfig::default();
        }
    };

    match toml::from_str::<ServiceConfig>(&content) {
        Ok(config) => {
            tracing::debug!("Loaded config from {}", path.display());
            config
        }
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            ServiceConfig::default()
        }
    }
}

/// Read a secret from the environment. Unset and blank values are `None`.
pub fn secret_from_env(var: &str) -> Option<SecretString> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}
