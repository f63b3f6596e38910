//! Domain error types
//!
//! This module defines the error hierarchy for docudump.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main docudump error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum DumpError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// DocuShare-related errors
    #[error("DocuShare error: {0}")]
    Source(#[from] SourceError),

    /// Collection or object does not exist or is not accessible
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl DumpError {
    /// Builds an I/O error carrying the path it happened on
    pub fn io_at(path: &std::path::Path, err: std::io::Error) -> Self {
        DumpError::Io(format!("{}: {err}", path.display()))
    }

    /// Process exit code for a fatal error of this kind
    pub fn exit_code(&self) -> i32 {
        match self {
            DumpError::Configuration(_) | DumpError::Validation(_) => 2,
            DumpError::NotFound(_) => 3,
            DumpError::Source(
                SourceError::ConnectionFailed(_)
                | SourceError::AuthenticationFailed(_)
                | SourceError::Timeout(_),
            ) => 4,
            _ => 5,
        }
    }

    /// Whether this error ends the whole export rather than one document
    ///
    /// Rejected credentials and an unreachable server affect every remaining
    /// download, so there is no point in continuing.
    pub fn aborts_export(&self) -> bool {
        matches!(
            self,
            DumpError::Source(
                SourceError::AuthenticationFailed(_) | SourceError::ConnectionFailed(_)
            )
        )
    }
}

/// DocuShare-specific errors
///
/// Errors that occur when reading from a DocuShare server or export archive.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to connect to DocuShare server
    #[error("Failed to connect to DocuShare server: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid response from server
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Version content not found
    #[error("Content not found: {0}")]
    ContentNotFound(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after: {0}")]
    RateLimitExceeded(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl SourceError {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SourceError::ConnectionFailed(_)
                | SourceError::Timeout(_)
                | SourceError::RateLimitExceeded(_)
                | SourceError::ServerError { .. }
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for DumpError {
    fn from(err: std::io::Error) -> Self {
        DumpError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for DumpError {
    fn from(err: serde_json::Error) -> Self {
        DumpError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for DumpError {
    fn from(err: toml::de::Error) -> Self {
        DumpError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_error_display() {
        let err = DumpError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_source_error_conversion() {
        let source_err = SourceError::ConnectionFailed("Network error".to_string());
        let dump_err: DumpError = source_err.into();
        assert!(matches!(dump_err, DumpError::Source(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let dump_err: DumpError = io_err.into();
        assert!(matches!(dump_err, DumpError::Io(_)));
    }

    #[test]
    fn test_io_at_includes_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = DumpError::io_at(std::path::Path::new("/tmp/out/Reports"), io_err);
        assert!(err.to_string().contains("/tmp/out/Reports"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let dump_err: DumpError = toml_err.into();
        assert!(matches!(dump_err, DumpError::Configuration(_)));
        assert!(dump_err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(DumpError::Configuration("x".into()).exit_code(), 2);
        assert_eq!(DumpError::NotFound("Collection-42".into()).exit_code(), 3);
        assert_eq!(
            DumpError::Source(SourceError::AuthenticationFailed("401".into())).exit_code(),
            4
        );
        assert_eq!(DumpError::Io("disk full".into()).exit_code(), 5);
    }

    #[test]
    fn test_only_auth_and_connection_failures_abort_export() {
        assert!(DumpError::Source(SourceError::AuthenticationFailed("401".into())).aborts_export());
        assert!(DumpError::Source(SourceError::ConnectionFailed("refused".into())).aborts_export());
        assert!(!DumpError::Source(SourceError::ContentNotFound("Version-9".into())).aborts_export());
        assert!(!DumpError::Source(SourceError::ClientError {
            status: 403,
            message: "forbidden".into()
        })
        .aborts_export());
        assert!(!DumpError::Io("unreadable archive file".into()).aborts_export());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(SourceError::Timeout("slow".into()).is_retryable());
        assert!(SourceError::ServerError {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());
        assert!(!SourceError::AuthenticationFailed("bad".into()).is_retryable());
        assert!(!SourceError::ClientError {
            status: 400,
            message: "bad request".into()
        }
        .is_retryable());
    }
}
