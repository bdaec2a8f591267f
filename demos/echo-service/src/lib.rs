//! Echo service
//!
//! An application library for the dynamic worker. Every method returns its
//! input unchanged. Build it as a `cdylib` and deploy it under the worker's
//! application base path.

use armonik_worker_sdk::{export_service, ServiceBase, ServiceResult};
use tracing::info;

/// Returns the arguments of every call
pub struct EchoService {
    name: String,
}

impl ServiceBase for EchoService {
    /// Id of the entered session
    type Session = String;

    fn create(service_namespace: &str, service_name: &str) -> Self {
        info!(namespace = service_namespace, service = service_name, "Created EchoService");
        EchoService {
            name: service_name.to_string(),
        }
    }

    fn enter_session(&mut self, session_id: &str) -> String {
        info!(service = %self.name, session_id, "Entering session");
        session_id.to_string()
    }

    fn leave_session(&mut self, session: String) {
        info!(service = %self.name, session_id = %session, "Leaving session");
    }

    fn call(&mut self, session: &mut String, method: &str, input: &[u8]) -> ServiceResult {
        info!(session_id = %session, method, size = input.len(), "EchoService call");
        Ok(input.to_vec())
    }
}

impl Drop for EchoService {
    fn drop(&mut self) {
        info!(service = %self.name, "Deleted EchoService");
    }
}

export_service!(EchoService);
