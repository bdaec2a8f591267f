//! gRPC implementation of [`ControlPlane`]

use super::{ControlPlane, TaskSubmission};
use crate::channel_pool::{ChannelPool, GrpcChannelFactory};
use crate::error::{Result, SdkError};
use armonik_sdk_core::{
    ControlPlaneConfig, CoreResult, ResultStatus, ResultsClient, SessionsClient, SubmittedTask,
    SubmitterClient, TaskCreation, TaskOptions, TaskOutput, TasksClient,
};
use std::collections::HashMap;
use parking_lot::Mutex;
use std::future::Future;
use tokio::runtime::Runtime;
use tonic::transport::Channel;
use tracing::{debug, warn};
use uuid::Uuid;

/// Control plane reached over gRPC.
///
/// Owns a tokio runtime and blocks on it for every call, so it must not be
/// used from inside an async context.
pub struct GrpcControlPlane {
    channels: ChannelPool<GrpcChannelFactory>,
    runtime: Runtime,
    data_chunk_max_size: Mutex<Option<usize>>,
}

impl GrpcControlPlane {
    pub fn new(config: &ControlPlaneConfig) -> Result<Self> {
        let runtime = Runtime::new()
            .map_err(|e| SdkError::Other(format!("Failed to create runtime: {}", e)))?;
        let factory = GrpcChannelFactory::new(&config.endpoint, runtime.handle().clone())?;
        debug!(endpoint = %factory.endpoint(), "Control plane client ready");

        Ok(Self {
            channels: ChannelPool::new(factory),
            runtime,
            data_chunk_max_size: Mutex::new(None),
        })
    }

    /// Run one async call on a pooled channel.
    ///
    /// A channel that fails at the transport level is not returned to the
    /// pool.
    fn call<T, Fut>(&self, f: impl FnOnce(Channel) -> Fut) -> Result<T>
    where
        Fut: Future<Output = CoreResult<T>>,
    {
        let guard = self.channels.acquire()?;
        let result = self.runtime.block_on(f(guard.channel()));
        if let Err(e) = &result {
            if e.is_transport_failure() {
                warn!(error = %e, "Channel failed, discarding it");
                guard.mark_failed();
            }
        }
        result.map_err(SdkError::from)
    }

    /// Largest payload sent inline, fetched once from the control plane
    fn data_chunk_max_size(&self) -> Result<usize> {
        if let Some(size) = *self.data_chunk_max_size.lock() {
            return Ok(size);
        }
        let size = self.call(|channel| async move {
            ResultsClient::new(channel).data_chunk_max_size().await
        })?;
        debug!(size, "Fetched data chunk size");
        *self.data_chunk_max_size.lock() = Some(size);
        Ok(size)
    }

    fn aborted_result_error(&self, session_id: &str, result_id: &str) -> Result<SdkError> {
        let info = self.call(|channel| async move {
            ResultsClient::new(channel).get_result(result_id).await
        })?;
        if info.status != ResultStatus::Aborted {
            return Ok(SdkError::Internal(format!(
                "result {result_id} could not be downloaded while {:?}",
                info.status
            )));
        }

        let task_id = info.owner_task_id;
        let details = match self.call(|channel| {
            let task_id = task_id.clone();
            async move {
                SubmitterClient::new(channel)
                    .try_get_task_output(session_id, &task_id)
                    .await
            }
        }) {
            Ok(TaskOutput::Error(details)) => details,
            Ok(TaskOutput::Ok) => "result is aborted".to_string(),
            Err(e) => format!("result is aborted, task error unavailable: {e}"),
        };
        Ok(SdkError::Task { task_id, details })
    }
}

impl ControlPlane for GrpcControlPlane {
    fn create_session(&self, options: &TaskOptions, partition_ids: &[String]) -> Result<String> {
        self.call(|channel| async move {
            SessionsClient::new(channel)
                .create_session(options, partition_ids)
                .await
        })
    }

    fn cancel_session(&self, session_id: &str) -> Result<()> {
        self.call(|channel| async move { SessionsClient::new(channel).cancel_session(session_id).await })
    }

    fn close_session(&self, session_id: &str) -> Result<()> {
        self.call(|channel| async move { SessionsClient::new(channel).close_session(session_id).await })
    }

    fn purge_session(&self, session_id: &str) -> Result<()> {
        self.call(|channel| async move { SessionsClient::new(channel).purge_session(session_id).await })
    }

    fn create_results(&self, session_id: &str, names: &[String]) -> Result<Vec<String>> {
        self.call(|channel| async move {
            ResultsClient::new(channel)
                .create_results_metadata(session_id, names)
                .await
        })
    }

    fn submit_tasks(
        &self,
        session_id: &str,
        options: Option<&TaskOptions>,
        tasks: Vec<TaskSubmission>,
    ) -> Result<Vec<SubmittedTask>> {
        // Payloads travel as results holding data, referenced by id.
        let max_inline = self.data_chunk_max_size()?;
        let mut creations = Vec::with_capacity(tasks.len());
        let mut payloads = Vec::with_capacity(tasks.len());
        for task in tasks {
            payloads.push(task.payload);
            creations.push(TaskCreation {
                payload_id: String::new(),
                expected_output_ids: task.expected_output_ids,
                data_dependencies: task.data_dependencies,
            });
        }
        let PayloadUpload { inline, streamed } =
            split_payloads(payloads, max_inline, || Uuid::new_v4().to_string());

        if !inline.is_empty() {
            let (indices, results): (Vec<usize>, Vec<(String, Vec<u8>)>) = inline
                .into_iter()
                .map(|(index, name, data)| (index, (name, data)))
                .unzip();
            let payload_ids = self.call(|channel| async move {
                ResultsClient::new(channel)
                    .create_results(session_id, results)
                    .await
            })?;
            for (index, payload_id) in indices.into_iter().zip(payload_ids) {
                creations[index].payload_id = payload_id;
            }
        }

        if !streamed.is_empty() {
            let names: Vec<String> = streamed.iter().map(|(_, name, _)| name.clone()).collect();
            let payload_ids = self.call(|channel| async move {
                ResultsClient::new(channel)
                    .create_results_metadata(session_id, &names)
                    .await
            })?;
            for ((index, _, data), payload_id) in streamed.iter().zip(payload_ids) {
                let result_id = payload_id.as_str();
                self.call(|channel| async move {
                    ResultsClient::new(channel)
                        .upload_result_data(session_id, result_id, data, max_inline)
                        .await
                })?;
                creations[*index].payload_id = payload_id;
            }
        }

        self.call(|channel| async move {
            TasksClient::new(channel)
                .submit_tasks(session_id, options, creations)
                .await
        })
    }

    fn result_statuses(
        &self,
        session_id: &str,
        result_ids: &[String],
    ) -> Result<Vec<(String, ResultStatus)>> {
        self.call(|channel| async move {
            SubmitterClient::new(channel)
                .get_result_status(session_id, result_ids)
                .await
        })
    }

    fn download_result(&self, session_id: &str, result_id: &str) -> Result<Vec<u8>> {
        let downloaded = self.call(|channel| async move {
            ResultsClient::new(channel)
                .download_result_data(session_id, result_id)
                .await
        });
        match downloaded {
            Ok(data) => Ok(data),
            Err(SdkError::Grpc(status)) => {
                debug!(result_id, %status, "Download failed, checking for task error");
                Err(self.aborted_result_error(session_id, result_id)?)
            }
            Err(e) => Err(e),
        }
    }

    fn task_result_ids(&self, task_ids: &[String]) -> Result<HashMap<String, Vec<String>>> {
        self.call(|channel| async move { TasksClient::new(channel).get_result_ids(task_ids).await })
    }

    fn delete_results_data(&self, session_id: &str, result_ids: &[String]) -> Result<()> {
        self.call(|channel| async move {
            ResultsClient::new(channel)
                .delete_results_data(session_id, result_ids)
                .await
        })
    }
}

/// Payloads of one submission, by transfer mode. Entries are
/// `(task index, result name, data)`.
struct PayloadUpload {
    inline: Vec<(usize, String, Vec<u8>)>,
    streamed: Vec<(usize, String, Vec<u8>)>,
}

/// Payloads up to `max_inline` bytes are created with their data; larger
/// ones are created empty and streamed in chunks.
fn split_payloads(
    payloads: Vec<Vec<u8>>,
    max_inline: usize,
    mut name: impl FnMut() -> String,
) -> PayloadUpload {
    let mut upload = PayloadUpload {
        inline: Vec::new(),
        streamed: Vec::new(),
    };
    for (index, data) in payloads.into_iter().enumerate() {
        let entry = (index, name(), data);
        if entry.2.len() > max_inline {
            upload.streamed.push(entry);
        } else {
            upload.inline.push(entry);
        }
    }
    upload
}
