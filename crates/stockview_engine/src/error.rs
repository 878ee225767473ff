//! Error types for the list engine.

use stockview_protocol::ProtocolError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while fetching and merging pages.
///
/// Public engine operations never return these: they are rendered into
/// the `error` field of the view state instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Network or transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the request can be retried by the caller.
        retryable: bool,
    },

    /// Response did not match the expected page shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Sort token is empty or unknown.
    #[error("invalid sort token: {0:?}")]
    InvalidSortToken(String),

    /// Caller-supplied limit or offset is out of range.
    #[error("validation error: {0}")]
    Validation(String),

    /// Server answered with a non-success status.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message from the error body.
        message: String,
    },

    /// Client is not connected.
    #[error("not connected to server")]
    NotConnected,
}

impl EngineError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if re-issuing the request may succeed.
    ///
    /// The engine never retries on its own; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Transport { retryable, .. } => *retryable,
            EngineError::Server { status, .. } => *status >= 500,
            EngineError::NotConnected => true,
            _ => false,
        }
    }
}

impl From<ProtocolError> for EngineError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::InvalidSortToken(token) => EngineError::InvalidSortToken(token),
            ProtocolError::Decode(message) => EngineError::Decode(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(EngineError::transport_retryable("connection reset").is_retryable());
        assert!(!EngineError::transport_fatal("invalid certificate").is_retryable());
        assert!(EngineError::Server {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());
        assert!(!EngineError::Server {
            status: 404,
            message: "Stock not found".into()
        }
        .is_retryable());
        assert!(!EngineError::Decode("bad".into()).is_retryable());
        assert!(!EngineError::Validation("limit".into()).is_retryable());
    }

    #[test]
    fn error_display() {
        let err = EngineError::NotConnected;
        assert_eq!(err.to_string(), "not connected to server");

        let err = EngineError::Server {
            status: 500,
            message: "Failed to retrieve stocks".into(),
        };
        assert_eq!(
            err.to_string(),
            "server error (500): Failed to retrieve stocks"
        );
    }

    #[test]
    fn from_protocol_error() {
        let err: EngineError = ProtocolError::Decode("missing field".into()).into();
        assert_eq!(err, EngineError::Decode("missing field".into()));

        let err: EngineError = ProtocolError::InvalidSortToken(String::new()).into();
        assert!(matches!(err, EngineError::InvalidSortToken(_)));
    }
}
