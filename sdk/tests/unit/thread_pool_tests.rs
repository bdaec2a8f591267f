//! Thread pool and join sets driving sessions from several threads.

use armonik_sdk::testing::{MockControlPlane, MockOutcome, RecordingHandler};
use armonik_sdk::{
    JoinSet, Properties, SdkError, SessionService, TaskPayload, ThreadPool, WaitBehavior,
    WaitOptions,
};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_parallel_submission_through_join_set() {
    let mock = MockControlPlane::new();
    let session =
        Arc::new(SessionService::new(&Properties::default(), Arc::new(mock.clone())).unwrap());
    let handler = RecordingHandler::new();
    let pool = ThreadPool::new(4);

    {
        let submissions = JoinSet::new(&pool);
        for i in 0..20u8 {
            let session = Arc::clone(&session);
            let handler = handler.clone();
            submissions
                .spawn(move || {
                    session.submit(vec![TaskPayload::new("Echo", vec![i])], handler)?;
                    Ok(())
                })
                .unwrap();
        }
        submissions.wait().unwrap();
    }

    assert_eq!(session.pending_count(), 20);
    session.wait_results(
        &[],
        WaitBehavior::ALL,
        &WaitOptions::default().with_polling(Duration::from_millis(1)),
    );
    assert_eq!(handler.call_count(), 20);
    assert!(pool.thread_count() <= 4);
}

#[test]
fn test_join_set_surfaces_submission_error() {
    let mock = MockControlPlane::new();
    let session =
        Arc::new(SessionService::new(&Properties::default(), Arc::new(mock.clone())).unwrap());
    session.drop_session().unwrap();
    let pool = ThreadPool::new(2);

    let jobs = JoinSet::new(&pool);
    let dropped = Arc::clone(&session);
    jobs.spawn(move || {
        dropped.submit(vec![TaskPayload::new("Echo", vec![])], RecordingHandler::new())?;
        Ok(())
    })
    .unwrap();
    jobs.spawn(|| Ok(())).unwrap();

    assert!(matches!(jobs.wait(), Err(SdkError::SessionDropped(_))));
    assert_eq!(jobs.pending(), 0);
}

#[test]
fn test_waiting_on_a_pool_thread() {
    let mock = MockControlPlane::new().with_poll_delay(1);
    mock.set_outcome("r1", MockOutcome::Completed(b"done".to_vec()));
    let session =
        Arc::new(SessionService::new(&Properties::default(), Arc::new(mock.clone())).unwrap());
    let handler = RecordingHandler::new();
    session
        .submit(vec![TaskPayload::new("Echo", vec![])], handler.clone())
        .unwrap();

    let pool = ThreadPool::new(1);
    let jobs = JoinSet::new(&pool);
    let waiter = Arc::clone(&session);
    jobs.spawn(move || {
        waiter.wait_all_with(&WaitOptions::default().with_polling(Duration::from_millis(1)));
        Ok(())
    })
    .unwrap();
    jobs.wait().unwrap();

    assert_eq!(handler.responses(), vec![("t1".to_string(), b"done".to_vec())]);
}
