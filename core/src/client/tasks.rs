//! Tasks client wrapper

use crate::error::CoreResult;
use crate::generated::armonik_v1;
use crate::generated::armonik_v1::tasks_client::TasksClient as GrpcTasksClient;
use crate::task_options::TaskOptions;
use std::collections::HashMap;
use tonic::transport::Channel;

/// A task to create, whose payload was already uploaded as a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCreation {
    pub payload_id: String,
    pub expected_output_ids: Vec<String>,
    pub data_dependencies: Vec<String>,
}

/// A task accepted by the control plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTask {
    pub task_id: String,
    pub expected_output_ids: Vec<String>,
}

impl From<armonik_v1::submit_tasks_response::TaskInfo> for SubmittedTask {
    fn from(info: armonik_v1::submit_tasks_response::TaskInfo) -> Self {
        Self {
            task_id: info.task_id,
            expected_output_ids: info.expected_output_ids,
        }
    }
}

/// Client for task operations
#[derive(Debug, Clone)]
pub struct TasksClient {
    inner: GrpcTasksClient<Channel>,
}

impl TasksClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: GrpcTasksClient::new(channel),
        }
    }

    /// Submit a batch of tasks, in the order they are given
    pub async fn submit_tasks(
        &mut self,
        session_id: &str,
        task_options: Option<&TaskOptions>,
        creations: Vec<TaskCreation>,
    ) -> CoreResult<Vec<SubmittedTask>> {
        let request = armonik_v1::SubmitTasksRequest {
            session_id: session_id.to_string(),
            task_options: task_options.map(Into::into),
            task_creations: creations
                .into_iter()
                .map(|c| armonik_v1::submit_tasks_request::TaskCreation {
                    expected_output_keys: c.expected_output_ids,
                    data_dependencies: c.data_dependencies,
                    payload_id: c.payload_id,
                    task_options: None,
                })
                .collect(),
        };

        let response = self.inner.submit_tasks(request).await?;
        Ok(response
            .into_inner()
            .task_infos
            .into_iter()
            .map(SubmittedTask::from)
            .collect())
    }

    /// Result ids expected from each of the given tasks
    pub async fn get_result_ids(
        &mut self,
        task_ids: &[String],
    ) -> CoreResult<HashMap<String, Vec<String>>> {
        let request = armonik_v1::GetResultIdsRequest {
            task_id: task_ids.to_vec(),
        };

        let response = self.inner.get_result_ids(request).await?;
        Ok(response
            .into_inner()
            .task_results
            .into_iter()
            .map(|m| (m.task_id, m.result_ids))
            .collect())
    }
}
