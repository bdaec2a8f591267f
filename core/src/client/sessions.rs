//! Sessions client wrapper

use crate::error::CoreResult;
use crate::generated::armonik_v1;
use crate::generated::armonik_v1::sessions_client::SessionsClient as GrpcSessionsClient;
use crate::task_options::TaskOptions;
use tonic::transport::Channel;
use tracing::debug;

/// Client for session lifecycle operations
#[derive(Debug, Clone)]
pub struct SessionsClient {
    inner: GrpcSessionsClient<Channel>,
}

impl SessionsClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: GrpcSessionsClient::new(channel),
        }
    }

    /// Create a session and return its id
    pub async fn create_session(
        &mut self,
        default_options: &TaskOptions,
        partition_ids: &[String],
    ) -> CoreResult<String> {
        let request = armonik_v1::CreateSessionRequest {
            default_task_option: Some(default_options.into()),
            partition_ids: partition_ids.to_vec(),
        };

        let response = self.inner.create_session(request).await?;
        Ok(response.into_inner().session_id)
    }

    /// Cancel the session and every task still running in it
    pub async fn cancel_session(&mut self, session_id: &str) -> CoreResult<()> {
        let response = self.inner.cancel_session(session_request(session_id)).await?;
        log_status("cancel", response.into_inner());
        Ok(())
    }

    /// Refuse new task submissions in the session
    pub async fn close_session(&mut self, session_id: &str) -> CoreResult<()> {
        let response = self.inner.close_session(session_request(session_id)).await?;
        log_status("close", response.into_inner());
        Ok(())
    }

    /// Delete every result payload stored for the session
    pub async fn purge_session(&mut self, session_id: &str) -> CoreResult<()> {
        let response = self.inner.purge_session(session_request(session_id)).await?;
        log_status("purge", response.into_inner());
        Ok(())
    }
}

fn session_request(session_id: &str) -> armonik_v1::SessionIdRequest {
    armonik_v1::SessionIdRequest {
        session_id: session_id.to_string(),
    }
}

fn log_status(action: &str, response: armonik_v1::SessionResponse) {
    if let Some(session) = response.session {
        let status = armonik_v1::SessionStatus::try_from(session.status)
            .unwrap_or(armonik_v1::SessionStatus::Unspecified);
        debug!(session_id = %session.session_id, ?status, action, "Session updated");
    }
}
