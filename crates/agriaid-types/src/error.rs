use thiserror::Error;

/// Errors from the TTL cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("value at '{key}' is not an integer")]
    NotAnInteger { key: String },
}

/// Errors from reading or writing session records.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("corrupt session record at '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors from the outbound SMS gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no recipients given")]
    NoRecipients,

    #[error("gateway request failed: {0}")]
    Request(String),

    #[error("gateway rejected request: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected gateway response: {0}")]
    Deserialization(String),

    #[error("gateway API key missing")]
    MissingApiKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_wraps_cache_error_transparently() {
        let err: StoreError = CacheError::NotAnInteger {
            key: "user_sessions:+254:2026-01-01".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "value at 'user_sessions:+254:2026-01-01' is not an integer"
        );
    }

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::Rejected {
            status: 401,
            body: "bad key".into(),
        };
        assert_eq!(err.to_string(), "gateway rejected request: HTTP 401: bad key");
    }
}
