//! Error types for protocol encoding and decoding.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised by protocol codecs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Sort token is empty or not one the backend is known to accept.
    #[error("invalid sort token: {0:?}")]
    InvalidSortToken(String),

    /// Payload did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        ProtocolError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ProtocolError::InvalidSortToken(String::new());
        assert_eq!(err.to_string(), "invalid sort token: \"\"");

        let err = ProtocolError::Decode("missing field `total`".into());
        assert!(err.to_string().contains("total"));
    }

    #[test]
    fn from_json_error() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: ProtocolError = json_err.into();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }
}
