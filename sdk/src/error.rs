//! Error types for the ArmoniK client SDK

pub use armonik_sdk_core::CoreError;

/// Main error type for the ArmoniK client SDK
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// The remote task failed; the details come from the control plane
    #[error("Task {task_id} failed: {details}")]
    Task { task_id: String, details: String },

    /// gRPC communication error
    #[error("gRPC error: {0}")]
    Grpc(#[from] tonic::Status),

    /// Channel could not be created or connected
    #[error("Transport error: {0}")]
    Transport(String),

    /// Malformed task payload
    #[error("Invalid payload: {0}")]
    Payload(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The SDK and the control plane disagree on some state
    #[error("Internal error: {0}")]
    Internal(String),

    /// The session was dropped and accepts no more work
    #[error("Session {0} has been dropped")]
    SessionDropped(String),

    /// Work was spawned on a pool that is shutting down
    #[error("Spawn on stopped ThreadPool")]
    PoolStopped,

    /// A job run by the thread pool panicked
    #[error("Task panicked: {0}")]
    Panicked(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl SdkError {
    /// Whether this is the failure of a remote task, as opposed to an error
    /// of the SDK or of the transport.
    pub fn is_task_error(&self) -> bool {
        matches!(self, SdkError::Task { .. })
    }
}

/// Result type alias for ArmoniK SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

impl From<CoreError> for SdkError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Grpc(status) => SdkError::Grpc(status),
            CoreError::Transport(e) => SdkError::Transport(e.to_string()),
            CoreError::Serialization(e) => SdkError::Other(format!("Serialization error: {e}")),
            CoreError::PayloadFormat(msg) => SdkError::Payload(msg),
            CoreError::Io(e) => SdkError::Io(e),
            CoreError::InvalidConfiguration(msg) => SdkError::InvalidConfiguration(msg),
            CoreError::UnexpectedResponse(msg) => SdkError::Internal(msg),
            CoreError::Other(msg) => SdkError::Other(msg),
        }
    }
}

/// Turn a panic payload into a readable message.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_error_display() {
        let err = SdkError::Task {
            task_id: "t1".to_string(),
            details: "worker crashed".to_string(),
        };
        assert_eq!(err.to_string(), "Task t1 failed: worker crashed");
        assert!(err.is_task_error());

        assert_eq!(SdkError::PoolStopped.to_string(), "Spawn on stopped ThreadPool");
        assert!(!SdkError::PoolStopped.is_task_error());
    }

    #[test]
    fn test_from_core_error() {
        let err: SdkError = CoreError::PayloadFormat("bad prefix".to_string()).into();
        assert!(matches!(err, SdkError::Payload(_)));

        let err: SdkError = CoreError::Grpc(tonic::Status::unavailable("down")).into();
        assert!(matches!(err, SdkError::Grpc(_)));

        let err: SdkError = CoreError::UnexpectedResponse("short reply".to_string()).into();
        assert!(matches!(err, SdkError::Internal(_)));
    }

    #[test]
    fn test_panic_message() {
        let payload = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload = std::panic::catch_unwind(|| panic!("code {}", 7)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "code 7");
    }
}
