//! Dispatching whole tasks through the dynamic worker.

use crate::fixtures::{events, FakeLoader, FakeTask};
use armonik_sdk_core::{Configuration, TaskOptions, TaskPayload};
use armonik_worker_sdk::{DynamicWorker, ProcessStatus};

fn worker(loader: &FakeLoader) -> DynamicWorker {
    let mut config = Configuration::new();
    config.set("Worker__ApplicationBasePath", "/apps");
    DynamicWorker::with_loader(&config, Box::new(loader.clone()))
}

fn task(namespace: &str, session_id: &str, method: &str, arguments: &[u8]) -> FakeTask {
    let payload = TaskPayload::new(method, arguments.to_vec())
        .serialize()
        .unwrap();
    let options = TaskOptions::new("libapp.so", "1.0", namespace, "Svc");
    FakeTask::new(session_id, payload, options)
}

#[test]
fn test_echo_task() {
    let loader = FakeLoader::default();
    let mut worker = worker(&loader);
    let mut echo = task("worker-echo", "s1", "Echo", b"Test");

    assert_eq!(worker.execute(&mut echo), ProcessStatus::Ok);
    assert_eq!(echo.sent, vec![("r1".to_string(), b"Test".to_vec())]);
    assert_eq!(
        loader.loaded_paths(),
        vec![std::path::PathBuf::from("/apps/libapp.so.1.0")]
    );
}

#[test]
fn test_binary_arguments_pass_through() {
    let loader = FakeLoader::default();
    let mut worker = worker(&loader);
    let arguments = [0u8, 0x80, 0xff, 0, b'x'];
    let mut echo = task("worker-binary", "s1", "Echo", &arguments);

    assert!(worker.execute(&mut echo).is_ok());
    assert_eq!(echo.sent[0].1, arguments.to_vec());
}

#[test]
fn test_consecutive_tasks_reuse_session() {
    let loader = FakeLoader::default();
    let mut worker = worker(&loader);

    for _ in 0..3 {
        let mut current = task("worker-reuse", "s1", "Session", b"");
        assert!(worker.execute(&mut current).is_ok());
        assert_eq!(current.sent[0].1, b"s1".to_vec());
    }
    let mut next = task("worker-reuse", "s2", "Session", b"");
    assert!(worker.execute(&mut next).is_ok());
    assert_eq!(next.sent[0].1, b"s2".to_vec());

    assert_eq!(loader.load_count(), 1);
    assert_eq!(
        events("worker-reuse"),
        vec!["create Svc", "enter s1", "leave s1", "enter s2"]
    );
}

#[test]
fn test_method_error_fails_the_task() {
    let loader = FakeLoader::default();
    let mut worker = worker(&loader);
    let mut failing = task("worker-fail", "s1", "Fail", b"");

    assert_eq!(
        worker.execute(&mut failing),
        ProcessStatus::Error("requested failure".to_string())
    );
    assert!(failing.sent.is_empty());
}

#[test]
fn test_service_panic_fails_the_task() {
    let loader = FakeLoader::default();
    let mut worker = worker(&loader);
    let mut panicking = task("worker-panic", "s1", "Panic", b"");

    let status = worker.execute(&mut panicking);
    let message = status.error_message().unwrap_or_default();
    assert!(message.contains("panicked"), "{message}");

    // The service survives.
    let mut echo = task("worker-panic", "s1", "Echo", b"ok");
    assert!(worker.execute(&mut echo).is_ok());
}

#[test]
fn test_malformed_payload_fails_the_task() {
    let loader = FakeLoader::default();
    let mut worker = worker(&loader);
    let mut malformed = task("worker-malformed", "s1", "Echo", b"");
    malformed.payload = b"zzzz".to_vec();

    let status = worker.execute(&mut malformed);
    assert!(status
        .error_message()
        .is_some_and(|m| m.starts_with("Invalid task payload")));
    assert_eq!(loader.load_count(), 0);
}

#[test]
fn test_missing_application_fails_the_task() {
    let loader = FakeLoader::default();
    let mut worker = worker(&loader);
    let mut orphan = task("worker-missing", "s1", "Echo", b"");
    orphan.options.application_name = "missing.so".to_string();

    let status = worker.execute(&mut orphan);
    assert_eq!(
        status.error_message(),
        Some("Application library not found: /apps/missing.so.1.0")
    );
    assert!(worker.manager().current_application().is_none());
}
