//! The worker host's view of a task being processed.

use crate::error::WorkerResult;
use armonik_sdk_core::TaskOptions;

/// A task handed to the worker by its host
pub trait TaskHandler {
    fn session_id(&self) -> &str;

    fn task_id(&self) -> &str;

    /// Serialized [`TaskPayload`](armonik_sdk_core::TaskPayload)
    fn payload(&self) -> &[u8];

    fn task_options(&self) -> &TaskOptions;

    /// Result ids the task must produce
    fn expected_results(&self) -> &[String];

    /// Upload the data of one expected result
    fn send_result(&mut self, result_id: &str, data: &[u8]) -> WorkerResult<()>;
}

/// Outcome of processing a task, reported to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessStatus {
    Ok,
    Error(String),
}

impl ProcessStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, ProcessStatus::Ok)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ProcessStatus::Ok => None,
            ProcessStatus::Error(message) => Some(message),
        }
    }
}
