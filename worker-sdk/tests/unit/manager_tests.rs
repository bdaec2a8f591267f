//! Application, service and session switching.

use crate::fixtures::{events, FakeLoader, FakeTask};
use armonik_sdk_core::{TaskOptions, WorkerConfig};
use armonik_worker_sdk::{AppId, ApplicationManager, ServiceId, WorkerError};
use std::path::PathBuf;

fn manager(loader: &FakeLoader) -> ApplicationManager {
    let config = WorkerConfig {
        application_base_path: PathBuf::from("/apps"),
    };
    ApplicationManager::with_loader(&config, Box::new(loader.clone()))
}

fn task() -> FakeTask {
    FakeTask::new("s1", Vec::new(), TaskOptions::default())
}

#[test]
fn test_library_path() {
    let manager = manager(&FakeLoader::default());
    assert_eq!(
        manager.library_path(&AppId::new("libapp.so", "1.0")),
        PathBuf::from("/apps/libapp.so.1.0")
    );
    assert_eq!(
        manager.library_path(&AppId::new("libapp.so", "")),
        PathBuf::from("/apps/libapp.so")
    );
}

#[test]
fn test_use_application_is_idempotent() {
    let loader = FakeLoader::default();
    let mut manager = manager(&loader);
    let app = AppId::new("libapp.so", "1.0");

    manager.use_application(&app).unwrap();
    manager.use_application(&app).unwrap();
    assert_eq!(loader.load_count(), 1);
    assert_eq!(manager.current_application(), Some(&app));

    manager
        .use_application(&AppId::new("libapp.so", "2.0"))
        .unwrap();
    assert_eq!(loader.load_count(), 2);
    assert_eq!(
        loader.loaded_paths(),
        vec![
            PathBuf::from("/apps/libapp.so.1.0"),
            PathBuf::from("/apps/libapp.so.2.0")
        ]
    );
}

#[test]
fn test_switching_application_tears_down_service() {
    let loader = FakeLoader::default();
    let mut manager = manager(&loader);
    let app = AppId::new("libapp.so", "1.0");
    let service = ServiceId::new(app.clone(), "switch-app", "Svc");

    manager
        .use_application(&app)
        .unwrap()
        .use_service(&service)
        .unwrap()
        .use_session("s1")
        .unwrap();
    manager
        .use_application(&AppId::new("other.so", ""))
        .unwrap();

    assert_eq!(
        events("switch-app"),
        vec!["create Svc", "enter s1", "leave s1", "destroy"]
    );
    assert_eq!(manager.current_service(), None);
    assert_eq!(manager.current_session(), None);
}

#[test]
fn test_use_service_is_idempotent() {
    let loader = FakeLoader::default();
    let mut manager = manager(&loader);
    let app = AppId::new("libapp.so", "1.0");
    let first = ServiceId::new(app.clone(), "switch-service", "A");
    let second = ServiceId::new(app.clone(), "switch-service", "B");

    manager.use_application(&app).unwrap();
    manager.use_service(&first).unwrap().use_session("s1").unwrap();
    manager.use_service(&first).unwrap();
    assert_eq!(events("switch-service"), vec!["create A", "enter s1"]);

    manager.use_service(&second).unwrap();
    assert_eq!(
        events("switch-service"),
        vec!["create A", "enter s1", "leave s1", "destroy", "create B"]
    );
    assert_eq!(manager.current_service(), Some(&second));
    assert_eq!(manager.current_session(), None);
}

#[test]
fn test_use_session_is_idempotent() {
    let loader = FakeLoader::default();
    let mut manager = manager(&loader);
    let app = AppId::new("libapp.so", "1.0");

    manager
        .use_application(&app)
        .unwrap()
        .use_service(&ServiceId::new(app.clone(), "switch-session", "Svc"))
        .unwrap();
    manager.use_session("s1").unwrap();
    manager.use_session("s1").unwrap();
    manager.use_session("s2").unwrap();

    assert_eq!(
        events("switch-session"),
        vec!["create Svc", "enter s1", "leave s1", "enter s2"]
    );
    assert_eq!(manager.current_session(), Some("s2"));
}

#[test]
fn test_steps_require_their_parent() {
    let loader = FakeLoader::default();
    let mut manager = manager(&loader);
    let app = AppId::new("libapp.so", "1.0");

    assert!(matches!(
        manager.use_service(&ServiceId::new(app.clone(), "orphan", "Svc")),
        Err(WorkerError::NoApplication)
    ));
    assert!(matches!(
        manager.use_session("s1"),
        Err(WorkerError::NoService)
    ));
    assert!(matches!(
        manager.execute(&mut task(), "Echo", b""),
        Err(WorkerError::SessionNotInitialized)
    ));

    manager
        .use_application(&app)
        .unwrap()
        .use_service(&ServiceId::new(app.clone(), "orphan", "Svc"))
        .unwrap();
    assert!(matches!(
        manager.execute(&mut task(), "Echo", b""),
        Err(WorkerError::SessionNotInitialized)
    ));
}

#[test]
fn test_failed_load_leaves_nothing_loaded() {
    let loader = FakeLoader::default();
    let mut manager = manager(&loader);
    let app = AppId::new("libapp.so", "1.0");

    manager
        .use_application(&app)
        .unwrap()
        .use_service(&ServiceId::new(app.clone(), "failed-load", "Svc"))
        .unwrap();
    let result = manager.use_application(&AppId::new("missing.so", ""));

    assert!(matches!(result, Err(WorkerError::NotFound(_))));
    assert_eq!(manager.current_application(), None);
    assert_eq!(events("failed-load"), vec!["create Svc", "destroy"]);
}
