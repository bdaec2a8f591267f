//! Session behavior: submission, waiting and result dispatch.

use armonik_sdk::testing::{MockCall, MockControlPlane, MockOutcome, RecordingHandler};
use armonik_sdk::{
    Configuration, Properties, SdkError, SessionService, TaskOptions, TaskPayload, WaitBehavior,
    WaitOptions,
};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn fast() -> WaitOptions {
    WaitOptions::default().with_polling(Duration::from_millis(1))
}

fn open_session(mock: &MockControlPlane) -> SessionService {
    SessionService::new(&Properties::default(), Arc::new(mock.clone())).unwrap()
}

/// Tasks named "slow" never finish and tasks named "fail" abort.
fn scripted(mock: &MockControlPlane) {
    mock.set_responder(|payload| match payload.method_name.as_str() {
        "slow" => MockOutcome::Pending,
        "fail" => MockOutcome::Aborted("boom".to_string()),
        _ => MockOutcome::Echo,
    });
}

#[test]
fn test_echo_round_trip() {
    let mock = MockControlPlane::new().with_poll_delay(1);
    let session = open_session(&mock);
    let handler = RecordingHandler::new();

    let task_ids = session
        .submit(vec![TaskPayload::new("Echo", b"Test".to_vec())], handler.clone())
        .unwrap();
    assert_eq!(task_ids, vec!["t1"]);
    assert_eq!(session.pending_count(), 1);

    session.wait_results(&[], WaitBehavior::ALL, &fast());

    assert_eq!(
        handler.responses(),
        vec![("t1".to_string(), b"00000004Echo00000004Test".to_vec())]
    );
    assert!(handler.errors().is_empty());
    assert_eq!(session.pending_count(), 0);
    assert_eq!(mock.download_count("r1"), 1);
    assert_eq!(mock.call_count(MockCall::ResultStatuses), 2);
}

#[test]
fn test_task_ids_follow_request_order() {
    let mock = MockControlPlane::new();
    let session = open_session(&mock);
    let requests = ["a", "b", "c"]
        .iter()
        .map(|m| TaskPayload::new(*m, Vec::new()))
        .collect();

    let task_ids = session.submit(requests, RecordingHandler::new()).unwrap();
    assert_eq!(task_ids, vec!["t1", "t2", "t3"]);

    let submitted = mock.submitted();
    let methods: Vec<String> = submitted
        .iter()
        .map(|record| TaskPayload::deserialize(&record.submission.payload).unwrap().method_name)
        .collect();
    assert_eq!(methods, vec!["a", "b", "c"]);
    assert_eq!(submitted[1].submission.expected_output_ids, vec!["r2"]);
}

#[test]
fn test_dependencies_and_options_are_forwarded() {
    let mock = MockControlPlane::new();
    let session = open_session(&mock);
    let options = TaskOptions::new("App", "2.0", "ns", "Svc").with_priority(7);

    session
        .submit_with_options(
            vec![TaskPayload::new("Sum", vec![1, 2]).with_dependencies(["d1", "d2"])],
            RecordingHandler::new(),
            &options,
        )
        .unwrap();

    let record = &mock.submitted()[0];
    assert_eq!(record.submission.data_dependencies, vec!["d1", "d2"]);
    assert_eq!(record.options.as_ref().map(|o| o.priority), Some(7));
}

#[test]
fn test_session_options_apply_when_none_are_given() {
    let mock = MockControlPlane::new();
    let defaults = TaskOptions::new("App", "2.0", "ns", "Svc").with_priority(7);
    let properties = Properties::new(Configuration::new(), defaults.clone());
    let session = SessionService::open(&properties, Arc::new(mock.clone()), "existing").unwrap();

    session
        .submit(vec![TaskPayload::new("Echo", vec![])], RecordingHandler::new())
        .unwrap();

    let record = &mock.submitted()[0];
    assert_eq!(record.options.as_ref(), Some(&defaults));

    let explicit = TaskOptions::new("Other", "1.0", "ns", "Svc").with_priority(2);
    session
        .submit_with_options(vec![TaskPayload::new("Echo", vec![])], RecordingHandler::new(), &explicit)
        .unwrap();
    assert_eq!(mock.submitted()[1].options.as_ref(), Some(&explicit));
}

#[test]
fn test_submit_failure_is_returned() {
    let mock = MockControlPlane::new();
    let session = open_session(&mock);
    mock.fail_next(MockCall::SubmitTasks, SdkError::Transport("unreachable".into()));

    let result = session.submit(vec![TaskPayload::new("Echo", vec![])], RecordingHandler::new());
    assert!(matches!(result, Err(SdkError::Transport(_))));
    assert_eq!(session.pending_count(), 0);
}

#[test]
fn test_task_error_reaches_handler() {
    let mock = MockControlPlane::new();
    scripted(&mock);
    let session = open_session(&mock);
    let handler = RecordingHandler::new();

    session
        .submit(
            vec![TaskPayload::new("fail", vec![]), TaskPayload::new("ok", vec![])],
            handler.clone(),
        )
        .unwrap();
    session.wait_all_with(&fast());

    assert_eq!(
        handler.errors(),
        vec![("t1".to_string(), "Task t1 failed: boom".to_string())]
    );
    assert_eq!(handler.responses().len(), 1);
    assert_eq!(handler.responses()[0].0, "t2");
}

#[test]
fn test_wait_any_returns_after_first_result() {
    let mock = MockControlPlane::new();
    scripted(&mock);
    let session = open_session(&mock);
    let handler = RecordingHandler::new();

    let task_ids = session
        .submit(
            vec![TaskPayload::new("slow", vec![]), TaskPayload::new("quick", vec![])],
            handler.clone(),
        )
        .unwrap();
    session.wait_results(&task_ids, WaitBehavior::ANY, &fast());

    assert_eq!(handler.call_count(), 1);
    assert_eq!(handler.calls_for("t2"), 1);
    assert_eq!(session.pending_count(), 1);
}

#[test]
fn test_break_on_error_stops_early() {
    let mock = MockControlPlane::new();
    scripted(&mock);
    let session = open_session(&mock);
    let handler = RecordingHandler::new();

    session
        .submit(
            vec![TaskPayload::new("fail", vec![]), TaskPayload::new("slow", vec![])],
            handler.clone(),
        )
        .unwrap();

    let started = Instant::now();
    session.wait_results(&[], WaitBehavior::BREAK_ON_ERROR, &fast());
    assert!(started.elapsed() < Duration::from_secs(5));

    assert_eq!(handler.errors().len(), 1);
    assert_eq!(session.pending_count(), 1);
}

#[test]
fn test_timeout_leaves_tasks_tracked() {
    let mock = MockControlPlane::new();
    scripted(&mock);
    let session = open_session(&mock);
    let handler = RecordingHandler::new();

    session
        .submit(vec![TaskPayload::new("slow", vec![])], handler.clone())
        .unwrap();
    session.wait_results(
        &[],
        WaitBehavior::ALL,
        &fast().with_timeout(Duration::from_millis(20)),
    );

    assert_eq!(handler.call_count(), 0);
    assert_eq!(session.pending_count(), 1);
}

#[test]
fn test_scoped_wait_ignores_other_and_unknown_tasks() {
    let mock = MockControlPlane::new();
    let session = open_session(&mock);
    let handler = RecordingHandler::new();

    session
        .submit(
            (0..3).map(|i| TaskPayload::new("Echo", vec![i])).collect(),
            handler.clone(),
        )
        .unwrap();
    session.wait_results(
        &["t2".to_string(), "unknown".to_string()],
        WaitBehavior::ALL,
        &fast(),
    );

    assert_eq!(handler.call_count(), 1);
    assert_eq!(handler.calls_for("t2"), 1);
    assert_eq!(session.pending_count(), 2);
}

#[test]
fn test_not_found_result_is_dropped_silently() {
    let mock = MockControlPlane::new();
    mock.set_outcome("r1", MockOutcome::NotFound);
    let session = open_session(&mock);
    let handler = RecordingHandler::new();

    session
        .submit(vec![TaskPayload::new("Echo", vec![])], handler.clone())
        .unwrap();
    session.wait_all_with(&fast());

    assert_eq!(handler.call_count(), 0);
    assert_eq!(session.pending_count(), 0);
}

#[test]
fn test_concurrent_waiters_deliver_exactly_once() {
    let mock = MockControlPlane::new().with_poll_delay(2);
    let session = Arc::new(open_session(&mock));
    let handler = RecordingHandler::new();

    let task_ids = session
        .submit(
            (0..50u8).map(|i| TaskPayload::new("Echo", vec![i])).collect(),
            handler.clone(),
        )
        .unwrap();

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let session = Arc::clone(&session);
            thread::spawn(move || session.wait_results(&[], WaitBehavior::ALL, &fast()))
        })
        .collect();
    for waiter in waiters {
        waiter.join().unwrap();
    }

    assert_eq!(handler.call_count(), 50);
    for task_id in &task_ids {
        assert_eq!(handler.calls_for(task_id), 1, "task {task_id}");
    }
}

#[test]
fn test_submit_from_another_thread() {
    let mock = MockControlPlane::new().with_poll_delay(3);
    let session = Arc::new(open_session(&mock));
    let handler = RecordingHandler::new();

    session
        .submit(vec![TaskPayload::new("Echo", vec![0])], handler.clone())
        .unwrap();
    let submitter = {
        let session = Arc::clone(&session);
        let handler = handler.clone();
        thread::spawn(move || {
            for i in 1..10u8 {
                session
                    .submit(vec![TaskPayload::new("Echo", vec![i])], handler.clone())
                    .unwrap();
            }
        })
    };
    submitter.join().unwrap();
    session.wait_all_with(&fast());

    assert_eq!(handler.call_count(), 10);
    assert_eq!(session.pending_count(), 0);
}

#[test]
fn test_drop_session_forgets_pending_tasks() {
    let mock = MockControlPlane::new();
    scripted(&mock);
    let session = open_session(&mock);
    let handler = RecordingHandler::new();

    session
        .submit(vec![TaskPayload::new("slow", vec![])], handler.clone())
        .unwrap();
    session.drop_session().unwrap();

    assert_eq!(session.pending_count(), 0);
    session.wait_all_with(&fast());
    assert_eq!(handler.call_count(), 0);

    let calls: Vec<MockCall> = mock.calls().into_iter().map(|(call, _)| call).collect();
    let cancel = calls.iter().position(|c| *c == MockCall::CancelSession);
    let purge = calls.iter().position(|c| *c == MockCall::PurgeSession);
    assert!(cancel.is_some() && cancel < purge);

    let again = session.submit(vec![TaskPayload::new("Echo", vec![])], handler.clone());
    assert!(matches!(again, Err(SdkError::SessionDropped(_))));
}

#[test]
fn test_cleanup_deletes_results_in_chunks() {
    let mock = MockControlPlane::new();
    let session = open_session(&mock);

    let task_ids = session
        .submit(
            (0..501u32)
                .map(|i| TaskPayload::new("Echo", i.to_le_bytes().to_vec()))
                .collect(),
            RecordingHandler::new(),
        )
        .unwrap();
    session.cleanup_tasks(&task_ids).unwrap();

    assert_eq!(mock.call_count(MockCall::DeleteResultsData), 2);
    let mut deleted = mock.deleted_results();
    deleted.sort();
    deleted.dedup();
    assert_eq!(deleted.len(), 501);
    // Cleanup does not touch local bookkeeping.
    assert_eq!(session.pending_count(), 501);
}

#[test]
fn test_cleanup_of_nothing_makes_no_call() {
    let mock = MockControlPlane::new();
    let session = open_session(&mock);
    session.cleanup_tasks(&[]).unwrap();
    assert_eq!(mock.call_count(MockCall::TaskResultIds), 0);
}

#[test]
fn test_session_lifecycle_calls() {
    let mock = MockControlPlane::new();
    let session = open_session(&mock);
    session.close_session().unwrap();
    session.cancel_session().unwrap();
    session.purge_session().unwrap();

    let calls = mock.calls();
    assert_eq!(calls[0].0, MockCall::CreateSession);
    assert_eq!(calls[1], (MockCall::CloseSession, "session-1".to_string()));
    assert_eq!(calls[2], (MockCall::CancelSession, "session-1".to_string()));
    assert_eq!(calls[3], (MockCall::PurgeSession, "session-1".to_string()));
}

#[test]
fn test_open_attaches_without_creating() {
    let mock = MockControlPlane::new();
    let mut configuration = Configuration::new();
    configuration.set("GrpcClient:WaitBatchSize", "10");
    let properties = Properties::new(configuration, TaskOptions::default());

    let session = SessionService::open(&properties, Arc::new(mock.clone()), "existing").unwrap();
    assert_eq!(session.session_id(), "existing");
    assert_eq!(mock.call_count(MockCall::CreateSession), 0);
}
