// MIT License - Copyright (c) 2026 Peter Wright
// Error types for the portal client

/// All errors that can occur while talking to the Alarm.com portal.
#[derive(Debug, thiserror::Error)]
pub enum AlarmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Login rejected: {message}")]
    BadCredentials { message: String },

    #[error("Can't find session key: {field} missing from login page")]
    SessionKeyNotFound { field: &'static str },

    #[error("Session expired")]
    SessionExpired,

    #[error("Malformed response: {details}")]
    MalformedResponse { details: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Wrong code entered")]
    WrongCode,

    #[error("No partition found on the account")]
    NoPartition,

    #[error("Unknown command: {name}")]
    InvalidCommand { name: String },

    #[error("Invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl AlarmError {
    /// Whether this error means the portal no longer recognizes our session,
    /// so a fresh login followed by one retry may succeed.
    pub fn is_session_loss(&self) -> bool {
        matches!(
            self,
            AlarmError::SessionExpired | AlarmError::MalformedResponse { .. }
        )
    }

    /// Whether this error is transient (network level).
    pub fn is_retryable(&self) -> bool {
        match self {
            AlarmError::Timeout { .. } => true,
            AlarmError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            other => other.is_session_loss(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AlarmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_loss_classification() {
        assert!(AlarmError::SessionExpired.is_session_loss());
        assert!(AlarmError::MalformedResponse { details: "no label".into() }.is_session_loss());
        assert!(!AlarmError::WrongCode.is_session_loss());
        assert!(!AlarmError::BadCredentials { message: "nope".into() }.is_session_loss());
        assert!(!AlarmError::Timeout { timeout_ms: 10 }.is_session_loss());
    }

    #[test]
    fn test_retryable() {
        assert!(AlarmError::Timeout { timeout_ms: 10_000 }.is_retryable());
        assert!(AlarmError::SessionExpired.is_retryable());
        assert!(!AlarmError::WrongCode.is_retryable());
        assert!(!AlarmError::NoPartition.is_retryable());
    }

    #[test]
    fn test_display() {
        let e = AlarmError::SessionKeyNotFound { field: "__VIEWSTATE" };
        assert_eq!(e.to_string(), "Can't find session key: __VIEWSTATE missing from login page");
        assert_eq!(
            AlarmError::Timeout { timeout_ms: 10_000 }.to_string(),
            "Request timed out after 10000ms"
        );
    }
}
