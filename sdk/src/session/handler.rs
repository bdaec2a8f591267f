//! Callbacks receiving task outcomes.

use crate::error::SdkError;

/// Receives the outcome of submitted tasks.
///
/// For every task, exactly one of the two methods is called, once. A single
/// handler may be registered for many tasks and must tolerate being called
/// from different threads.
pub trait ServiceInvocationHandler: Send + Sync {
    /// The task succeeded and produced `payload`
    fn handle_response(&self, payload: &[u8], task_id: &str);

    /// The task failed, or its result could not be retrieved.
    ///
    /// Remote task failures come as [`SdkError::Task`]; anything else is an
    /// error on the SDK or transport side.
    fn handle_error(&self, error: &SdkError, task_id: &str);
}
