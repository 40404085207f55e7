//! Engine error type

use thiserror::Error;

/// Errors from marshalling, unmarshalling, and streaming
#[derive(Debug, Error)]
pub enum Error {
    /// Syntax, data, or codec failure reported through serde_json
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// I/O error from a stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stream decoder has no more documents
    #[error("end of input")]
    Eof,
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if the input ran out, either cleanly or mid-document
    pub fn is_eof(&self) -> bool {
        match self {
            Error::Eof => true,
            Error::Json(err) => err.is_eof(),
            Error::Io(err) => err.kind() == std::io::ErrorKind::UnexpectedEof,
        }
    }

    /// Check if the input was not well-formed JSON
    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Json(err) if err.is_syntax())
    }

    /// Check if well-formed JSON did not fit the target type
    pub fn is_data(&self) -> bool {
        matches!(self, Error::Json(err) if err.is_data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eof_predicates() {
        assert!(Error::Eof.is_eof());

        let truncated = serde_json::from_str::<serde_json::Value>("[1,").unwrap_err();
        assert!(Error::from(truncated).is_eof());
    }

    #[test]
    fn test_syntax_and_data() {
        let syntax = Error::from(serde_json::from_str::<serde_json::Value>("[1,]").unwrap_err());
        assert!(syntax.is_syntax());
        assert!(!syntax.is_data());

        let data = Error::from(serde_json::from_str::<i64>("\"x\"").unwrap_err());
        assert!(data.is_data());
        assert!(!data.is_eof());
    }

    #[test]
    fn test_io_display() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::Other, "closed"));
        assert_eq!(err.to_string(), "I/O error: closed");
        assert!(!err.is_eof());
    }
}
