use thiserror::Error;

/// Error codes understood by the node protocol's `error` replies
pub mod codes {
    pub const NOT_SUPPORTED: u32 = 10;
    pub const TEMPORARILY_UNAVAILABLE: u32 = 11;
    pub const MALFORMED_REQUEST: u32 = 12;
    pub const CRASH: u32 = 13;
    pub const PRECONDITION_FAILED: u32 = 22;
}

/// Main error type for the murmur node
#[derive(Debug, Error)]
pub enum MurmurError {
    /// Request body failed structural decoding or a field had the wrong type
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// No handler is registered for this message type
    #[error("Unsupported message type: {0}")]
    NotSupported(String),

    /// A request arrived before the `init` handshake completed
    #[error("Node not initialized")]
    NotInitialized,

    /// The request is valid but conflicts with current node state
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Configuration or CLI argument errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Outbound channel or writer errors
    #[error("Transport error: {0}")]
    Transport(String),

    /// System I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Convenient type alias for Results using our error type
pub type Result<T> = std::result::Result<T, MurmurError>;

impl MurmurError {
    /// Numeric code carried by the `error` reply for this error
    pub fn code(&self) -> u32 {
        match self {
            MurmurError::MalformedRequest(_) => codes::MALFORMED_REQUEST,
            MurmurError::NotSupported(_) => codes::NOT_SUPPORTED,
            MurmurError::NotInitialized => codes::TEMPORARILY_UNAVAILABLE,
            MurmurError::PreconditionFailed(_) => codes::PRECONDITION_FAILED,
            MurmurError::Config(_)
            | MurmurError::Transport(_)
            | MurmurError::Io(_)
            | MurmurError::Serialization(_) => codes::CRASH,
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            MurmurError::MalformedRequest(_) => "malformed_request",
            MurmurError::NotSupported(_) => "not_supported",
            MurmurError::NotInitialized => "temporarily_unavailable",
            MurmurError::PreconditionFailed(_) => "precondition_failed",
            MurmurError::Config(_) => "configuration_error",
            MurmurError::Transport(_) => "transport_error",
            MurmurError::Io(_) => "io_error",
            MurmurError::Serialization(_) => "serialization_error",
        }
    }
}

// Helper macros for common error construction patterns
#[macro_export]
macro_rules! malformed_request {
    ($msg:expr) => {
        $crate::error::MurmurError::MalformedRequest($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::MurmurError::MalformedRequest(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::error::MurmurError::Config($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::MurmurError::Config(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! transport_error {
    ($msg:expr) => {
        $crate::error::MurmurError::Transport($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::MurmurError::Transport(format!($fmt, $($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MurmurError::NotSupported("cas".to_string());
        assert_eq!(err.to_string(), "Unsupported message type: cas");

        let io_err = MurmurError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "stdin closed",
        ));
        assert!(io_err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(MurmurError::NotInitialized.code(), codes::TEMPORARILY_UNAVAILABLE);
        assert_eq!(
            MurmurError::MalformedRequest("bad".into()).code(),
            codes::MALFORMED_REQUEST
        );
        assert_eq!(MurmurError::NotSupported("x".into()).code(), codes::NOT_SUPPORTED);
        assert_eq!(MurmurError::Transport("closed".into()).code(), codes::CRASH);
        assert_eq!(
            MurmurError::PreconditionFailed("re-init".into()).code(),
            codes::PRECONDITION_FAILED
        );
    }

    #[test]
    fn test_macros() {
        let err = malformed_request!("field {} is not an integer", "message");
        assert_eq!(
            err.to_string(),
            "Malformed request: field message is not an integer"
        );
        assert_eq!(err.error_type(), "malformed_request");

        let err = config_error!("outbound buffer must be positive");
        assert_eq!(
            err.to_string(),
            "Configuration error: outbound buffer must be positive"
        );
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<u64>("nope").unwrap_err();
        let err: MurmurError = json_err.into();
        assert!(matches!(err, MurmurError::Serialization(_)));
    }
}
