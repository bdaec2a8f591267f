//! Error types for the ArmoniK worker SDK

use armonik_sdk_core::CoreError;
use std::path::PathBuf;

/// Errors raised while loading modules or dispatching tasks to them
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// No library exists at the application's path
    #[error("Application library not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The library exists but could not be loaded
    #[error("Failed to load application library {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// A required entry point is missing from the library
    #[error("Symbol {symbol} not found in {}: {source}", .path.display())]
    MissingSymbol {
        symbol: &'static str,
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("No application is loaded")]
    NoApplication,

    #[error("No service is in use")]
    NoService,

    #[error("Session is not initialized")]
    SessionNotInitialized,

    /// A string handed to the module contains a NUL byte
    #[error("Invalid string for module: {0}")]
    InvalidString(#[from] std::ffi::NulError),

    /// The task payload could not be decoded
    #[error("Invalid task payload: {0}")]
    Payload(#[from] CoreError),

    #[error("Task has no expected result")]
    NoExpectedResult,

    /// The host refused a result produced by the module
    #[error("Failed to send result {result_id}: {details}")]
    SendResult { result_id: String, details: String },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for worker operations
pub type WorkerResult<T> = std::result::Result<T, WorkerError>;
