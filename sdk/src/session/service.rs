//! Session service: submission, polling and result dispatch.

use super::handler::ServiceInvocationHandler;
use super::tracker::{TaskTracker, TrackedResult};
use super::wait::{WaitBehavior, WaitOptions};
use crate::control_plane::{ControlPlane, GrpcControlPlane, TaskSubmission};
use crate::error::{panic_message, Result, SdkError};
use armonik_sdk_core::config::{SUBMIT_BATCH_SIZE_KEY, WAIT_BATCH_SIZE_KEY};
use armonik_sdk_core::{ControlPlaneConfig, Properties, ResultStatus, TaskOptions, TaskPayload};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Result ids per cleanup request
const CLEANUP_BATCH_SIZE: usize = 500;

/// A session on the control plane and the tasks submitted through it.
///
/// All methods take `&self`; a session can be shared between threads that
/// submit and wait concurrently. Each submitted task's outcome is delivered
/// to its handler exactly once, by whichever `wait_results` call observes it
/// first.
pub struct SessionService {
    session_id: String,
    task_options: TaskOptions,
    control_plane: Arc<dyn ControlPlane>,
    tracker: Mutex<TaskTracker>,
    submit_batch_size: usize,
    wait_batch_size: usize,
    dropped: AtomicBool,
}

impl SessionService {
    /// Create a new session in the configured partition.
    pub fn new(properties: &Properties, control_plane: Arc<dyn ControlPlane>) -> Result<Self> {
        let partitions: Vec<String> = properties.partition_id().into_iter().collect();
        let session_id = control_plane.create_session(&properties.task_options, &partitions)?;
        info!(session_id = %session_id, partitions = ?partitions, "Session created");
        Self::open(properties, control_plane, session_id)
    }

    /// Attach to an existing session without creating one.
    pub fn open(
        properties: &Properties,
        control_plane: Arc<dyn ControlPlane>,
        session_id: impl Into<String>,
    ) -> Result<Self> {
        let config = &properties.configuration;
        let submit_batch_size = config.get_usize(
            SUBMIT_BATCH_SIZE_KEY,
            ControlPlaneConfig::DEFAULT_SUBMIT_BATCH_SIZE,
        )?;
        let wait_batch_size =
            config.get_usize(WAIT_BATCH_SIZE_KEY, ControlPlaneConfig::DEFAULT_WAIT_BATCH_SIZE)?;
        if submit_batch_size == 0 || wait_batch_size == 0 {
            return Err(SdkError::InvalidConfiguration(
                "batch sizes must be positive".to_string(),
            ));
        }

        Ok(Self {
            session_id: session_id.into(),
            task_options: properties.task_options.clone(),
            control_plane,
            tracker: Mutex::new(TaskTracker::default()),
            submit_batch_size,
            wait_batch_size,
            dropped: AtomicBool::new(false),
        })
    }

    /// Create a new session on the control plane named by the configuration.
    pub fn connect(properties: &Properties) -> Result<Self> {
        let config = properties.configuration.control_plane()?;
        let control_plane = Arc::new(GrpcControlPlane::new(&config)?);
        Self::new(properties, control_plane)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Options applied to tasks submitted without their own
    pub fn task_options(&self) -> &TaskOptions {
        &self.task_options
    }

    /// Number of submitted tasks whose outcome was not delivered yet
    pub fn pending_count(&self) -> usize {
        self.tracker.lock().len()
    }

    /// Submit tasks with the session's default options.
    ///
    /// Returns the task ids in request order. `handler` receives the outcome
    /// of each of them from [`wait_results`](Self::wait_results).
    pub fn submit(
        &self,
        requests: Vec<TaskPayload>,
        handler: Arc<dyn ServiceInvocationHandler>,
    ) -> Result<Vec<String>> {
        self.submit_inner(requests, handler, None)
    }

    /// Submit tasks with explicit options
    pub fn submit_with_options(
        &self,
        requests: Vec<TaskPayload>,
        handler: Arc<dyn ServiceInvocationHandler>,
        options: &TaskOptions,
    ) -> Result<Vec<String>> {
        self.submit_inner(requests, handler, Some(options))
    }

    fn submit_inner(
        &self,
        requests: Vec<TaskPayload>,
        handler: Arc<dyn ServiceInvocationHandler>,
        options: Option<&TaskOptions>,
    ) -> Result<Vec<String>> {
        if self.dropped.load(Ordering::Acquire) {
            return Err(SdkError::SessionDropped(self.session_id.clone()));
        }

        let options = options.unwrap_or(&self.task_options);
        let mut task_ids = Vec::with_capacity(requests.len());
        let mut requests = requests.into_iter().peekable();
        while requests.peek().is_some() {
            let batch: Vec<TaskPayload> = requests.by_ref().take(self.submit_batch_size).collect();
            task_ids.extend(self.submit_batch(batch, &handler, options)?);
        }
        Ok(task_ids)
    }

    fn submit_batch(
        &self,
        batch: Vec<TaskPayload>,
        handler: &Arc<dyn ServiceInvocationHandler>,
        options: &TaskOptions,
    ) -> Result<Vec<String>> {
        let names: Vec<String> = batch.iter().map(|_| Uuid::new_v4().to_string()).collect();
        let result_ids = self
            .control_plane
            .create_results(&self.session_id, &names)?;
        if result_ids.len() != batch.len() {
            return Err(SdkError::Internal(format!(
                "requested {} results, control plane created {}",
                batch.len(),
                result_ids.len()
            )));
        }

        let mut submissions = Vec::with_capacity(batch.len());
        for (payload, result_id) in batch.into_iter().zip(&result_ids) {
            submissions.push(TaskSubmission {
                payload: payload.serialize()?,
                expected_output_ids: vec![result_id.clone()],
                data_dependencies: payload.data_dependencies,
            });
        }

        let submitted = self
            .control_plane
            .submit_tasks(&self.session_id, Some(options), submissions)?;
        if submitted.len() != result_ids.len() {
            warn!(
                session_id = %self.session_id,
                requested = result_ids.len(),
                submitted = submitted.len(),
                "Control plane accepted fewer tasks than submitted"
            );
        }

        let mut task_ids = Vec::with_capacity(submitted.len());
        {
            let mut tracker = self.tracker.lock();
            for (index, task) in submitted.into_iter().enumerate() {
                let result_id = match task.expected_output_ids.into_iter().next() {
                    Some(id) => id,
                    None => match result_ids.get(index) {
                        Some(id) => id.clone(),
                        None => continue,
                    },
                };
                tracker.insert(task.task_id.clone(), result_id, Arc::clone(handler));
                task_ids.push(task.task_id);
            }
        }
        debug!(session_id = %self.session_id, count = task_ids.len(), "Tasks submitted");
        Ok(task_ids)
    }

    /// Wait for every task of the session with default options
    pub fn wait_all(&self) {
        self.wait_all_with(&WaitOptions::default())
    }

    pub fn wait_all_with(&self, options: &WaitOptions) {
        self.wait_results(&[], WaitBehavior::ALL, options)
    }

    /// Poll the control plane and dispatch outcomes to the handlers.
    ///
    /// Waits on `task_ids`, or on every tracked task when it is empty. Task
    /// ids not tracked by this session are skipped. Returns when everything
    /// awaited is resolved, when `behavior` says to stop early, or when the
    /// timeout elapses. Errors are never returned: they go to the handlers
    /// or to the log.
    pub fn wait_results(&self, task_ids: &[String], behavior: WaitBehavior, options: &WaitOptions) {
        let deadline = options.timeout.map(|timeout| Instant::now() + timeout);
        let scoped = !task_ids.is_empty();

        let mut scope: HashSet<String> = HashSet::new();
        if scoped {
            let tracker = self.tracker.lock();
            for task_id in task_ids {
                match tracker.result_of(task_id) {
                    Some(result_id) => {
                        scope.insert(result_id.to_string());
                    }
                    None => warn!(task_id = %task_id, "Task is not tracked by this session"),
                }
            }
        }

        let mut resolved = 0usize;
        loop {
            let snapshot: Vec<String> = if scoped {
                scope.iter().cloned().collect()
            } else {
                self.tracker.lock().result_ids()
            };
            if snapshot.is_empty() {
                break;
            }

            let statuses = self.poll_statuses(&snapshot);
            let claimed = self.claim_resolved(&statuses);

            let mut failed = false;
            for (result_id, status, tracked) in claimed {
                scope.remove(&result_id);
                resolved += 1;
                if let Some(tracked) = tracked {
                    failed |= !self.dispatch(&result_id, status, tracked);
                }
            }

            if behavior.contains(WaitBehavior::BREAK_ON_ERROR) && failed {
                debug!(session_id = %self.session_id, "Stopping wait on task error");
                break;
            }
            if behavior.contains(WaitBehavior::ANY) && resolved > 0 {
                break;
            }
            let remaining = if scoped {
                scope.len()
            } else {
                self.tracker.lock().len()
            };
            if remaining == 0 {
                break;
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    warn!(
                        session_id = %self.session_id,
                        remaining,
                        "Timed out waiting for results"
                    );
                    break;
                }
            }
            thread::sleep(options.polling);
        }
    }

    /// Status of each result, requested in batches. A failed batch is logged
    /// and its results are polled again next time.
    fn poll_statuses(&self, result_ids: &[String]) -> HashMap<String, ResultStatus> {
        let mut statuses = HashMap::with_capacity(result_ids.len());
        for chunk in result_ids.chunks(self.wait_batch_size) {
            match self.control_plane.result_statuses(&self.session_id, chunk) {
                Ok(batch) => statuses.extend(batch),
                Err(e) => {
                    error!(session_id = %self.session_id, error = %e, "Failed to poll result statuses")
                }
            }
        }
        statuses
    }

    /// Stop tracking every result in a final state, in one critical section.
    ///
    /// An entry comes back as `None` when another waiter claimed it first.
    fn claim_resolved(
        &self,
        statuses: &HashMap<String, ResultStatus>,
    ) -> Vec<(String, ResultStatus, Option<TrackedResult>)> {
        let mut tracker = self.tracker.lock();
        statuses
            .iter()
            .filter(|(_, status)| status.is_terminal())
            .map(|(result_id, status)| (result_id.clone(), *status, tracker.remove(result_id)))
            .collect()
    }

    /// Deliver the outcome of one result. Returns `false` when the task is
    /// reported as failed.
    fn dispatch(&self, result_id: &str, status: ResultStatus, tracked: TrackedResult) -> bool {
        let TrackedResult { task_id, handler } = tracked;
        let outcome = match status {
            ResultStatus::NotFound => {
                debug!(task_id = %task_id, result_id, "Result not found, dropping it");
                return true;
            }
            ResultStatus::Deleted => Err(SdkError::Internal(format!(
                "data of result {result_id} was deleted"
            ))),
            ResultStatus::Aborted => match self.control_plane.download_result(&self.session_id, result_id) {
                Ok(_) => Err(SdkError::Internal(format!(
                    "result {result_id} is aborted but its data is available"
                ))),
                Err(e) => Err(e),
            },
            _ => self.control_plane.download_result(&self.session_id, result_id),
        };

        match outcome {
            Ok(payload) => {
                debug!(task_id = %task_id, result_id, size = payload.len(), "Task completed");
                guarded(&task_id, || handler.handle_response(&payload, &task_id))
            }
            Err(e) => {
                if e.is_task_error() {
                    warn!(task_id = %task_id, result_id, error = %e, "Task failed");
                } else {
                    error!(task_id = %task_id, result_id, error = %e, "Could not retrieve task result");
                }
                guarded(&task_id, || handler.handle_error(&e, &task_id));
                false
            }
        }
    }

    /// Delete the data of the results produced by the given tasks.
    pub fn cleanup_tasks(&self, task_ids: &[String]) -> Result<()> {
        if task_ids.is_empty() {
            return Ok(());
        }
        let result_ids: Vec<String> = self
            .control_plane
            .task_result_ids(task_ids)?
            .into_values()
            .flatten()
            .collect();
        for chunk in result_ids.chunks(CLEANUP_BATCH_SIZE) {
            self.control_plane
                .delete_results_data(&self.session_id, chunk)?;
        }
        debug!(session_id = %self.session_id, results = result_ids.len(), "Task results cleaned up");
        Ok(())
    }

    /// Forget pending tasks, then cancel and purge the session.
    ///
    /// Handlers of tasks still pending are never called.
    pub fn drop_session(&self) -> Result<()> {
        self.dropped.store(true, Ordering::Release);
        let forgotten = {
            let mut tracker = self.tracker.lock();
            let count = tracker.len();
            tracker.clear();
            count
        };
        info!(session_id = %self.session_id, forgotten, "Dropping session");
        self.control_plane.cancel_session(&self.session_id)?;
        self.control_plane.purge_session(&self.session_id)
    }

    /// Stop accepting submissions; submitted tasks still run
    pub fn close_session(&self) -> Result<()> {
        info!(session_id = %self.session_id, "Closing session");
        self.control_plane.close_session(&self.session_id)
    }

    /// Cancel the session's tasks, keeping track of them locally
    pub fn cancel_session(&self) -> Result<()> {
        info!(session_id = %self.session_id, "Cancelling session");
        self.control_plane.cancel_session(&self.session_id)
    }

    /// Delete the session's data on the control plane
    pub fn purge_session(&self) -> Result<()> {
        info!(session_id = %self.session_id, "Purging session");
        self.control_plane.purge_session(&self.session_id)
    }
}

/// Run a handler callback, logging instead of propagating its panic.
/// Returns `false` if it panicked.
fn guarded(task_id: &str, callback: impl FnOnce()) -> bool {
    match catch_unwind(AssertUnwindSafe(callback)) {
        Ok(()) => true,
        Err(payload) => {
            error!(
                task_id,
                panic = %panic_message(payload.as_ref()),
                "Result handler panicked"
            );
            false
        }
    }
}
