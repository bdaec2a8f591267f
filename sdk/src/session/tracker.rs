//! Bookkeeping of submitted tasks awaiting their result.

use super::handler::ServiceInvocationHandler;
use std::collections::HashMap;
use std::sync::Arc;

/// A tracked result: the task producing it and who wants it
#[derive(Clone)]
pub(crate) struct TrackedResult {
    pub task_id: String,
    pub handler: Arc<dyn ServiceInvocationHandler>,
}

/// Results awaited by a session, keyed by result id, with an index from task
/// id to result id.
///
/// Both maps are only ever changed together, so a task is tracked in both or
/// in neither.
#[derive(Default)]
pub(crate) struct TaskTracker {
    by_result: HashMap<String, TrackedResult>,
    result_of_task: HashMap<String, String>,
}

impl TaskTracker {
    pub fn insert(
        &mut self,
        task_id: String,
        result_id: String,
        handler: Arc<dyn ServiceInvocationHandler>,
    ) {
        self.result_of_task.insert(task_id.clone(), result_id.clone());
        self.by_result.insert(result_id, TrackedResult { task_id, handler });
    }

    pub fn result_of(&self, task_id: &str) -> Option<&str> {
        self.result_of_task.get(task_id).map(String::as_str)
    }

    pub fn result_ids(&self) -> Vec<String> {
        self.by_result.keys().cloned().collect()
    }

    /// Stop tracking a result, handing back its entry
    pub fn remove(&mut self, result_id: &str) -> Option<TrackedResult> {
        let tracked = self.by_result.remove(result_id)?;
        self.result_of_task.remove(&tracked.task_id);
        Some(tracked)
    }

    pub fn clear(&mut self) {
        self.by_result.clear();
        self.result_of_task.clear();
    }

    pub fn len(&self) -> usize {
        self.by_result.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_result.is_empty()
    }
}
