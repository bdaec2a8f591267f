//! Submitter client wrapper
//!
//! Result status polling and task error retrieval still go through the
//! legacy submitter service.

use crate::error::CoreResult;
use crate::generated::armonik_v1;
use crate::generated::armonik_v1::submitter_client::SubmitterClient as GrpcSubmitterClient;
use crate::client::ResultStatus;
use tonic::transport::Channel;

/// Outcome of a task as reported by the control plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutput {
    /// The task succeeded, or has not finished yet
    Ok,
    /// The task failed with the given details
    Error(String),
}

impl From<armonik_v1::Output> for TaskOutput {
    fn from(output: armonik_v1::Output) -> Self {
        match output.r#type {
            Some(armonik_v1::output::Type::Error(error)) => TaskOutput::Error(error.details),
            Some(armonik_v1::output::Type::Ok(_)) | None => TaskOutput::Ok,
        }
    }
}

/// Client for the submitter service
#[derive(Debug, Clone)]
pub struct SubmitterClient {
    inner: GrpcSubmitterClient<Channel>,
}

impl SubmitterClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: GrpcSubmitterClient::new(channel),
        }
    }

    /// Status of each given result
    pub async fn get_result_status(
        &mut self,
        session_id: &str,
        result_ids: &[String],
    ) -> CoreResult<Vec<(String, ResultStatus)>> {
        let request = armonik_v1::GetResultStatusRequest {
            result_ids: result_ids.to_vec(),
            session_id: session_id.to_string(),
        };

        let response = self.inner.get_result_status(request).await?;
        Ok(response
            .into_inner()
            .id_statuses
            .into_iter()
            .map(|s| (s.result_id, ResultStatus::from(s.status)))
            .collect())
    }

    /// Output of a task, carrying its error details if it failed
    pub async fn try_get_task_output(
        &mut self,
        session_id: &str,
        task_id: &str,
    ) -> CoreResult<TaskOutput> {
        let request = armonik_v1::TaskOutputRequest {
            session: session_id.to_string(),
            task_id: task_id.to_string(),
        };

        let response = self.inner.try_get_task_output(request).await?;
        Ok(response.into_inner().into())
    }
}
