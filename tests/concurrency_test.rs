//! Concurrency tests
//!
//! Registrations racing each other and the status sweep must never overbook an
//! event or leave it in a state the clock disagrees with.

mod helpers;

use futures::future::join_all;

use campus_events::database::EventStore;
use campus_events::models::EventStatus;
use campus_events::LifecycleError;

use helpers::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_never_exceed_capacity() {
    let db = TestDatabase::new().await;
    let event = db.seed_upcoming(5).await;

    let handles = (1..=20).map(|student_id| {
        let lifecycle = db.lifecycle();
        tokio::spawn(async move { lifecycle.register(student_id, event.id, now()).await })
    });

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("registration task panicked"))
        .collect();

    let accepted = results.iter().filter(|result| result.is_ok()).count();
    let full = results
        .iter()
        .filter(|result| matches!(result, Err(LifecycleError::Full { .. })))
        .count();

    assert_eq!(accepted, 5);
    assert_eq!(full, 15);
    assert_eq!(db.service.count_registrations(event.id).await.unwrap(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_last_seat_goes_to_exactly_one_student() {
    let db = TestDatabase::new().await;
    let event = db.seed_upcoming(1).await;

    let first = db.lifecycle();
    let second = db.lifecycle();
    let (a, b) = tokio::join!(
        tokio::spawn(async move { first.register(1, event.id, now()).await }),
        tokio::spawn(async move { second.register(2, event.id, now()).await }),
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    assert_eq!(outcomes.iter().filter(|result| result.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|result| *result == Err(LifecycleError::Full { event_id: event.id, max_participants: 1 })));
    assert_eq!(db.service.count_registrations(event.id).await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_student_racing_registers_once() {
    let db = TestDatabase::new().await;
    let event = db.seed_upcoming(10).await;

    let handles = (0..6).map(|_| {
        let lifecycle = db.lifecycle();
        tokio::spawn(async move { lifecycle.register(7, event.id, now()).await })
    });
    let results: Vec<_> = join_all(handles).await.into_iter().map(Result::unwrap).collect();

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter(|result| result.is_err())
        .all(|result| matches!(result, Err(LifecycleError::AlreadyRegistered { student_id: 7, .. }))));
    assert_eq!(db.service.count_registrations(event.id).await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sweep_racing_registrations_stays_consistent() {
    let db = TestDatabase::new().await;
    // already started but still stored as upcoming
    let started = db.seed_event(now() - minutes(1), now() + hours(1), 50).await;
    let open = db.seed_upcoming(3).await;

    let sweeper = db.lifecycle();
    let sweep = tokio::spawn(async move { sweeper.recompute_statuses(now()).await });

    let registrations = (1..=10).flat_map(|student_id| {
        [started.id, open.id].map(|event_id| {
            let lifecycle = db.lifecycle();
            tokio::spawn(async move { lifecycle.register(student_id, event_id, now()).await })
        })
    });
    let registrations: Vec<_> = join_all(registrations).await.into_iter().map(Result::unwrap).collect();

    let report = sweep.await.unwrap().unwrap();
    assert_eq!(report.failed, 0);

    for result in &registrations {
        if let Err(err) = result {
            assert!(
                matches!(err, LifecycleError::EventAlreadyStarted { .. } | LifecycleError::Full { .. }),
                "unexpected error {err:?}"
            );
        }
    }

    assert_eq!(db.service.count_registrations(started.id).await.unwrap(), 0);
    assert_eq!(db.service.count_registrations(open.id).await.unwrap(), 3);
    assert_eq!(db.stored_status(started.id).await, "ongoing");
    assert_eq!(db.stored_status(open.id).await, "upcoming");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancel_racing_end_applies_one_override() {
    let db = TestDatabase::new().await;
    let event = db.seed_event(now() - minutes(30), now() + hours(1), 10).await;

    let ender = db.lifecycle();
    let canceller = db.lifecycle();
    let (ended, cancelled) = tokio::join!(
        tokio::spawn(async move { ender.end_event(ORGANIZER, event.id, now()).await }),
        tokio::spawn(async move { canceller.cancel_event(ORGANIZER, event.id, now()).await }),
    );
    let (ended, cancelled) = (ended.unwrap(), cancelled.unwrap());

    assert!(ended.is_ok() != cancelled.is_ok(), "{ended:?} / {cancelled:?}");

    let stored = db.service.find_event(event.id).await.unwrap().unwrap();
    match (ended, cancelled) {
        (Ok(_), Err(err)) => {
            assert_eq!(err, LifecycleError::AlreadyCompleted { event_id: event.id });
            assert_eq!(stored.status, EventStatus::Completed);
        }
        (Err(err), Ok(_)) => {
            assert_eq!(
                err,
                LifecycleError::InvalidTransition { from: EventStatus::Cancelled, to: EventStatus::Completed }
            );
            assert_eq!(stored.status, EventStatus::Cancelled);
        }
        other => panic!("expected exactly one override to win, got {other:?}"),
    }
}
