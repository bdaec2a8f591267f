//! In-memory control plane for testing sessions without a cluster.

use crate::control_plane::{ControlPlane, TaskSubmission};
use crate::error::{Result, SdkError};
use armonik_sdk_core::{ResultStatus, SubmittedTask, TaskOptions, TaskPayload};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// How a mocked result ends up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOutcome {
    /// Completes with the serialized payload of the task that produced it
    Echo,
    /// Completes with the given data
    Completed(Vec<u8>),
    /// The producing task fails with the given details
    Aborted(String),
    /// Reported as aborted, yet its data can still be downloaded
    AbortedWithData(Vec<u8>),
    /// Its data was deleted
    Deleted,
    /// Unknown to the control plane
    NotFound,
    /// Never leaves the created state
    Pending,
}

/// Control plane operations, as recorded by [`MockControlPlane::calls`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockCall {
    CreateSession,
    CancelSession,
    CloseSession,
    PurgeSession,
    CreateResults,
    SubmitTasks,
    ResultStatuses,
    DownloadResult,
    TaskResultIds,
    DeleteResultsData,
}

/// A task as received by the mock
#[derive(Debug, Clone)]
pub struct SubmittedRecord {
    pub session_id: String,
    pub task_id: String,
    pub options: Option<TaskOptions>,
    pub submission: TaskSubmission,
}

type Responder = Arc<dyn Fn(&TaskPayload) -> MockOutcome + Send + Sync>;

/// A [`ControlPlane`] keeping everything in memory.
///
/// Ids are deterministic: sessions are `session-1`, `session-2`..., results
/// `r1`, `r2`... and tasks `t1`, `t2`..., in creation order. A result reports
/// `CREATED` for the configured number of polls after its task is submitted,
/// then the state given by its [`MockOutcome`]. Outcomes default to
/// [`MockOutcome::Echo`] unless set per result or by a responder.
///
/// Clones share state, so a test can keep a handle after giving one to a
/// session.
///
/// # Example
///
/// ```ignore
/// use armonik_sdk::testing::{MockControlPlane, MockOutcome};
///
/// let mock = MockControlPlane::new().with_poll_delay(1);
/// mock.set_outcome("r2", MockOutcome::Aborted("division by zero".into()));
/// let session = SessionService::new(&properties, Arc::new(mock.clone()))?;
/// ```
#[derive(Clone, Default)]
pub struct MockControlPlane {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    poll_delay: usize,
    responder: Option<Responder>,
    sessions: usize,
    session_partitions: Vec<Vec<String>>,
    results: HashMap<String, MockResult>,
    result_count: usize,
    tasks: HashMap<String, Vec<String>>,
    submitted: Vec<SubmittedRecord>,
    submit_batch_sizes: Vec<usize>,
    status_batch_sizes: Vec<usize>,
    downloads: HashMap<String, usize>,
    deleted: Vec<String>,
    calls: Vec<(MockCall, String)>,
    failures: HashMap<MockCall, VecDeque<SdkError>>,
}

#[derive(Default)]
struct MockResult {
    owner_task_id: Option<String>,
    payload: Vec<u8>,
    outcome: Option<MockOutcome>,
    polls: usize,
    delay: usize,
}

impl MockResult {
    fn status(&mut self) -> ResultStatus {
        if self.owner_task_id.is_none() {
            return ResultStatus::Created;
        }
        self.polls += 1;
        if self.polls <= self.delay {
            return ResultStatus::Created;
        }
        match self.outcome.as_ref().unwrap_or(&MockOutcome::Echo) {
            MockOutcome::Echo | MockOutcome::Completed(_) => ResultStatus::Completed,
            MockOutcome::Aborted(_) | MockOutcome::AbortedWithData(_) => ResultStatus::Aborted,
            MockOutcome::Deleted => ResultStatus::Deleted,
            MockOutcome::NotFound => ResultStatus::NotFound,
            MockOutcome::Pending => ResultStatus::Created,
        }
    }
}

impl MockControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of polls answered with `CREATED` before a submitted result
    /// reaches its outcome
    pub fn with_poll_delay(self, polls: usize) -> Self {
        self.inner.lock().poll_delay = polls;
        self
    }

    /// Decide the outcome of every submitted task without an explicit one
    pub fn set_responder(&self, responder: impl Fn(&TaskPayload) -> MockOutcome + Send + Sync + 'static) {
        self.inner.lock().responder = Some(Arc::new(responder));
    }

    /// Set the outcome of a result, before or after it is created
    pub fn set_outcome(&self, result_id: &str, outcome: MockOutcome) {
        self.inner
            .lock()
            .results
            .entry(result_id.to_string())
            .or_default()
            .outcome = Some(outcome);
    }

    /// Make the next call of `call` fail with `error`
    pub fn fail_next(&self, call: MockCall, error: SdkError) {
        self.inner
            .lock()
            .failures
            .entry(call)
            .or_default()
            .push_back(error);
    }

    /// Every call received, with the session or result it targeted
    pub fn calls(&self) -> Vec<(MockCall, String)> {
        self.inner.lock().calls.clone()
    }

    pub fn call_count(&self, call: MockCall) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|(c, _)| *c == call)
            .count()
    }

    /// Partitions requested by each session creation
    pub fn session_partitions(&self) -> Vec<Vec<String>> {
        self.inner.lock().session_partitions.clone()
    }

    pub fn submitted(&self) -> Vec<SubmittedRecord> {
        self.inner.lock().submitted.clone()
    }

    /// Number of tasks in each submission request
    pub fn submit_batch_sizes(&self) -> Vec<usize> {
        self.inner.lock().submit_batch_sizes.clone()
    }

    /// Number of results in each status request, failed ones included
    pub fn status_batch_sizes(&self) -> Vec<usize> {
        self.inner.lock().status_batch_sizes.clone()
    }

    pub fn download_count(&self, result_id: &str) -> usize {
        self.inner
            .lock()
            .downloads
            .get(result_id)
            .copied()
            .unwrap_or(0)
    }

    /// Result ids whose data was deleted, in request order
    pub fn deleted_results(&self) -> Vec<String> {
        self.inner.lock().deleted.clone()
    }

    fn record(&self, call: MockCall, target: &str) -> Result<()> {
        let mut state = self.inner.lock();
        state.calls.push((call, target.to_string()));
        match state.failures.get_mut(&call).and_then(VecDeque::pop_front) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl ControlPlane for MockControlPlane {
    fn create_session(&self, _options: &TaskOptions, partition_ids: &[String]) -> Result<String> {
        self.record(MockCall::CreateSession, "")?;
        let mut state = self.inner.lock();
        state.sessions += 1;
        state.session_partitions.push(partition_ids.to_vec());
        Ok(format!("session-{}", state.sessions))
    }

    fn cancel_session(&self, session_id: &str) -> Result<()> {
        self.record(MockCall::CancelSession, session_id)
    }

    fn close_session(&self, session_id: &str) -> Result<()> {
        self.record(MockCall::CloseSession, session_id)
    }

    fn purge_session(&self, session_id: &str) -> Result<()> {
        self.record(MockCall::PurgeSession, session_id)
    }

    fn create_results(&self, session_id: &str, names: &[String]) -> Result<Vec<String>> {
        self.record(MockCall::CreateResults, session_id)?;
        let mut state = self.inner.lock();
        let mut ids = Vec::with_capacity(names.len());
        for _ in names {
            state.result_count += 1;
            let id = format!("r{}", state.result_count);
            state.results.entry(id.clone()).or_default();
            ids.push(id);
        }
        Ok(ids)
    }

    fn submit_tasks(
        &self,
        session_id: &str,
        options: Option<&TaskOptions>,
        tasks: Vec<TaskSubmission>,
    ) -> Result<Vec<SubmittedTask>> {
        self.record(MockCall::SubmitTasks, session_id)?;
        let mut state = self.inner.lock();
        state.submit_batch_sizes.push(tasks.len());

        let mut submitted = Vec::with_capacity(tasks.len());
        for submission in tasks {
            let task_id = format!("t{}", state.submitted.len() + 1);
            let default_outcome = match (&state.responder, TaskPayload::deserialize(&submission.payload)) {
                (Some(responder), Ok(payload)) => responder(&payload),
                _ => MockOutcome::Echo,
            };
            let delay = state.poll_delay;
            for result_id in &submission.expected_output_ids {
                let result = state.results.entry(result_id.clone()).or_default();
                result.owner_task_id = Some(task_id.clone());
                result.payload = submission.payload.clone();
                result.delay = delay;
                result.outcome.get_or_insert_with(|| default_outcome.clone());
            }
            state
                .tasks
                .insert(task_id.clone(), submission.expected_output_ids.clone());
            submitted.push(SubmittedTask {
                task_id: task_id.clone(),
                expected_output_ids: submission.expected_output_ids.clone(),
            });
            state.submitted.push(SubmittedRecord {
                session_id: session_id.to_string(),
                task_id,
                options: options.cloned(),
                submission,
            });
        }
        Ok(submitted)
    }

    fn result_statuses(
        &self,
        session_id: &str,
        result_ids: &[String],
    ) -> Result<Vec<(String, ResultStatus)>> {
        self.inner.lock().status_batch_sizes.push(result_ids.len());
        self.record(MockCall::ResultStatuses, session_id)?;
        let mut state = self.inner.lock();
        Ok(result_ids
            .iter()
            .map(|id| {
                let status = match state.results.get_mut(id) {
                    Some(result) => result.status(),
                    None => ResultStatus::NotFound,
                };
                (id.clone(), status)
            })
            .collect())
    }

    fn download_result(&self, _session_id: &str, result_id: &str) -> Result<Vec<u8>> {
        self.record(MockCall::DownloadResult, result_id)?;
        let mut state = self.inner.lock();
        *state.downloads.entry(result_id.to_string()).or_default() += 1;

        let missing = || SdkError::Grpc(tonic::Status::not_found(format!("result {result_id}")));
        let result = state.results.get(result_id).ok_or_else(missing)?;
        match result.outcome.as_ref().unwrap_or(&MockOutcome::Echo) {
            MockOutcome::Echo => Ok(result.payload.clone()),
            MockOutcome::Completed(data) | MockOutcome::AbortedWithData(data) => Ok(data.clone()),
            MockOutcome::Aborted(details) => Err(SdkError::Task {
                task_id: result.owner_task_id.clone().unwrap_or_default(),
                details: details.clone(),
            }),
            MockOutcome::Deleted | MockOutcome::NotFound | MockOutcome::Pending => Err(missing()),
        }
    }

    fn task_result_ids(&self, task_ids: &[String]) -> Result<HashMap<String, Vec<String>>> {
        self.record(MockCall::TaskResultIds, "")?;
        let state = self.inner.lock();
        Ok(task_ids
            .iter()
            .filter_map(|id| state.tasks.get(id).map(|results| (id.clone(), results.clone())))
            .collect())
    }

    fn delete_results_data(&self, session_id: &str, result_ids: &[String]) -> Result<()> {
        self.record(MockCall::DeleteResultsData, session_id)?;
        let mut state = self.inner.lock();
        for id in result_ids {
            if let Some(result) = state.results.get_mut(id) {
                result.outcome = Some(MockOutcome::Deleted);
            }
            state.deleted.push(id.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(result_id: &str) -> TaskSubmission {
        TaskSubmission {
            payload: TaskPayload::new("Echo", b"hi".to_vec()).serialize().unwrap(),
            expected_output_ids: vec![result_id.to_string()],
            data_dependencies: vec![],
        }
    }

    #[test]
    fn test_results_resolve_after_delay() {
        let mock = MockControlPlane::new().with_poll_delay(1);
        let ids = mock.create_results("s", &["a".to_string()]).unwrap();
        assert_eq!(ids, vec!["r1"]);
        assert_eq!(
            mock.result_statuses("s", &ids).unwrap(),
            vec![("r1".to_string(), ResultStatus::Created)]
        );

        mock.submit_tasks("s", None, vec![submission("r1")]).unwrap();
        assert_eq!(mock.result_statuses("s", &ids).unwrap()[0].1, ResultStatus::Created);
        assert_eq!(mock.result_statuses("s", &ids).unwrap()[0].1, ResultStatus::Completed);
        assert_eq!(mock.download_result("s", "r1").unwrap(), submission("r1").payload);
    }

    #[test]
    fn test_responder_and_failures() {
        let mock = MockControlPlane::new();
        mock.set_responder(|payload| MockOutcome::Aborted(format!("{} failed", payload.method_name)));
        mock.fail_next(MockCall::SubmitTasks, SdkError::Transport("reset".into()));

        assert!(mock.submit_tasks("s", None, vec![submission("r1")]).is_err());
        let submitted = mock.submit_tasks("s", None, vec![submission("r1")]).unwrap();
        assert_eq!(submitted[0].task_id, "t1");

        match mock.download_result("s", "r1") {
            Err(SdkError::Task { task_id, details }) => {
                assert_eq!(task_id, "t1");
                assert_eq!(details, "Echo failed");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(mock.call_count(MockCall::SubmitTasks), 2);
        assert_eq!(
            mock.result_statuses("s", &["zz".to_string()]).unwrap()[0].1,
            ResultStatus::NotFound
        );
    }
}
