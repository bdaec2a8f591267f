//! Blocking interface to the ArmoniK control plane.
//!
//! The session core only talks to the control plane through
//! [`ControlPlane`], which keeps it independent of the transport.
//! [`GrpcControlPlane`] is the production implementation; tests use the mock
//! from the `testing` module.

mod grpc;

pub use grpc::GrpcControlPlane;

use crate::error::Result;
use armonik_sdk_core::{ResultStatus, SubmittedTask, TaskOptions};
use std::collections::HashMap;

/// One task to submit: serialized payload, expected outputs, dependencies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSubmission {
    pub payload: Vec<u8>,
    pub expected_output_ids: Vec<String>,
    pub data_dependencies: Vec<String>,
}

/// Operations of the control plane used by sessions.
///
/// Every method blocks the calling thread until the control plane answers.
pub trait ControlPlane: Send + Sync {
    /// Create a session and return its id
    fn create_session(&self, options: &TaskOptions, partition_ids: &[String]) -> Result<String>;

    /// Cancel the session and its running tasks
    fn cancel_session(&self, session_id: &str) -> Result<()>;

    /// Refuse further submissions in the session
    fn close_session(&self, session_id: &str) -> Result<()>;

    /// Delete all data held for the session
    fn purge_session(&self, session_id: &str) -> Result<()>;

    /// Create one empty result per name, returning ids in the same order
    fn create_results(&self, session_id: &str, names: &[String]) -> Result<Vec<String>>;

    /// Submit tasks, returning them in submission order
    fn submit_tasks(
        &self,
        session_id: &str,
        options: Option<&TaskOptions>,
        tasks: Vec<TaskSubmission>,
    ) -> Result<Vec<SubmittedTask>>;

    /// Status of each given result. Results unknown to the control plane may
    /// be omitted or reported as [`ResultStatus::NotFound`].
    fn result_statuses(
        &self,
        session_id: &str,
        result_ids: &[String],
    ) -> Result<Vec<(String, ResultStatus)>>;

    /// Data of a result.
    ///
    /// Fails with [`SdkError::Task`](crate::error::SdkError::Task) when the
    /// task producing the result failed.
    fn download_result(&self, session_id: &str, result_id: &str) -> Result<Vec<u8>>;

    /// Result ids expected from each of the given tasks
    fn task_result_ids(&self, task_ids: &[String]) -> Result<HashMap<String, Vec<String>>>;

    /// Delete the data of the given results
    fn delete_results_data(&self, session_id: &str, result_ids: &[String]) -> Result<()>;
}
