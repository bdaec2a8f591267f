//! Core error types for the ArmoniK SDK
//!
//! These errors are shared by the client and worker crates, which wrap them
//! into their own error enums.

/// Core error type for codec, configuration and gRPC client operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// gRPC communication error
    #[error("gRPC error: {0}")]
    Grpc(#[from] tonic::Status),

    /// Channel could not be created or connected
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Malformed task payload blob
    #[error("Invalid payload format: {0}")]
    PayloadFormat(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The control plane answered with something this SDK cannot use
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Returns true if the error means the underlying channel is unusable.
    pub fn is_transport_failure(&self) -> bool {
        match self {
            CoreError::Transport(_) => true,
            CoreError::Grpc(status) => status.code() == tonic::Code::Unavailable,
            _ => false,
        }
    }
}

/// Result type alias for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::PayloadFormat("truncated length prefix".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid payload format: truncated length prefix"
        );

        let err = CoreError::InvalidConfiguration("missing endpoint".to_string());
        assert!(err.to_string().contains("missing endpoint"));
    }

    #[test]
    fn test_unavailable_status_is_transport_failure() {
        let err = CoreError::from(tonic::Status::unavailable("connection refused"));
        assert!(err.is_transport_failure());

        let err = CoreError::from(tonic::Status::not_found("no such session"));
        assert!(!err.is_transport_failure());

        assert!(!CoreError::Other("boom".to_string()).is_transport_failure());
    }
}
