//! Handler recording every outcome it receives.

use crate::error::SdkError;
use crate::session::ServiceInvocationHandler;
use parking_lot::Mutex;
use std::sync::Arc;

/// A [`ServiceInvocationHandler`] that records calls for later assertions.
#[derive(Default)]
pub struct RecordingHandler {
    responses: Mutex<Vec<(String, Vec<u8>)>>,
    errors: Mutex<Vec<(String, String)>>,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// `(task_id, payload)` of each successful task, in delivery order
    pub fn responses(&self) -> Vec<(String, Vec<u8>)> {
        self.responses.lock().clone()
    }

    /// `(task_id, error message)` of each failure, in delivery order
    pub fn errors(&self) -> Vec<(String, String)> {
        self.errors.lock().clone()
    }

    /// Total number of callbacks received
    pub fn call_count(&self) -> usize {
        self.responses.lock().len() + self.errors.lock().len()
    }

    /// Number of callbacks received for one task
    pub fn calls_for(&self, task_id: &str) -> usize {
        let responses = self.responses.lock().iter().filter(|(id, _)| id == task_id).count();
        let errors = self.errors.lock().iter().filter(|(id, _)| id == task_id).count();
        responses + errors
    }
}

impl ServiceInvocationHandler for RecordingHandler {
    fn handle_response(&self, payload: &[u8], task_id: &str) {
        self.responses
            .lock()
            .push((task_id.to_string(), payload.to_vec()));
    }

    fn handle_error(&self, error: &SdkError, task_id: &str) {
        self.errors
            .lock()
            .push((task_id.to_string(), error.to_string()));
    }
}
