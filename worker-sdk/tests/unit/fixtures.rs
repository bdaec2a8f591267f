//! A recording service exported through the C interface, and the loader and
//! task handler driving it.

use armonik_sdk_core::TaskOptions;
use armonik_worker_sdk::abi::FunctionTable;
use armonik_worker_sdk::{
    export_service, ModuleLoader, ServiceBase, ServiceModule, ServiceResult, TaskHandler,
    WorkerError, WorkerResult,
};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static EVENTS: Mutex<Vec<(String, String)>> = parking_lot::const_mutex(Vec::new());

fn record(tag: &str, event: String) {
    EVENTS.lock().push((tag.to_string(), event));
}

/// Lifecycle events of services created with `namespace`, in order
pub fn events(namespace: &str) -> Vec<String> {
    let prefix = format!("{namespace}/");
    EVENTS
        .lock()
        .iter()
        .filter(|(tag, _)| tag.starts_with(&prefix))
        .map(|(_, event)| event.clone())
        .collect()
}

/// Records its lifecycle under `namespace/name`
pub struct Recorder {
    tag: String,
}

impl ServiceBase for Recorder {
    type Session = String;

    fn create(service_namespace: &str, service_name: &str) -> Self {
        let tag = format!("{service_namespace}/{service_name}");
        record(&tag, format!("create {service_name}"));
        Recorder { tag }
    }

    fn enter_session(&mut self, session_id: &str) -> String {
        record(&self.tag, format!("enter {session_id}"));
        session_id.to_string()
    }

    fn leave_session(&mut self, session: String) {
        record(&self.tag, format!("leave {session}"));
    }

    fn call(&mut self, session: &mut String, method: &str, input: &[u8]) -> ServiceResult {
        match method {
            "Echo" => Ok(input.to_vec()),
            "Session" => Ok(session.clone().into_bytes()),
            "Fail" => Err("requested failure".into()),
            "Panic" => panic!("service bug"),
            other => Err(format!("unknown method {other}").into()),
        }
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        record(&self.tag, "destroy".to_string());
    }
}

export_service!(Recorder);

pub fn recorder_functions() -> FunctionTable {
    FunctionTable {
        create_service: armonik_create_service,
        destroy_service: armonik_destroy_service,
        enter_session: armonik_enter_session,
        leave_session: armonik_leave_session,
        call: armonik_call,
    }
}

/// Serves the recorder for every path except those named `missing*`
#[derive(Clone, Default)]
pub struct FakeLoader {
    loads: Arc<Mutex<Vec<PathBuf>>>,
    count: Arc<AtomicUsize>,
}

impl FakeLoader {
    pub fn load_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn loaded_paths(&self) -> Vec<PathBuf> {
        self.loads.lock().clone()
    }
}

impl ModuleLoader for FakeLoader {
    fn load(&self, path: &Path) -> WorkerResult<Box<dyn ServiceModule>> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.loads.lock().push(path.to_path_buf());
        let missing = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("missing"));
        if missing {
            return Err(WorkerError::NotFound(path.to_path_buf()));
        }
        Ok(Box::new(recorder_functions()))
    }
}

/// A task whose uploaded results are kept in memory
pub struct FakeTask {
    pub session_id: String,
    pub task_id: String,
    pub payload: Vec<u8>,
    pub options: TaskOptions,
    pub expected: Vec<String>,
    pub sent: Vec<(String, Vec<u8>)>,
}

impl FakeTask {
    pub fn new(session_id: &str, payload: Vec<u8>, options: TaskOptions) -> Self {
        Self {
            session_id: session_id.to_string(),
            task_id: "t1".to_string(),
            payload,
            options,
            expected: vec!["r1".to_string()],
            sent: Vec::new(),
        }
    }
}

impl TaskHandler for FakeTask {
    fn session_id(&self) -> &str {
        &self.session_id
    }

    fn task_id(&self) -> &str {
        &self.task_id
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn task_options(&self) -> &TaskOptions {
        &self.options
    }

    fn expected_results(&self) -> &[String] {
        &self.expected
    }

    fn send_result(&mut self, result_id: &str, data: &[u8]) -> WorkerResult<()> {
        self.sent.push((result_id.to_string(), data.to_vec()));
        Ok(())
    }
}
