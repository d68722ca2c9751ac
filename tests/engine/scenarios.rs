//! End-to-end dispatch scenarios

use eventstack::dispatch::{
    subscriber_fn, DispatchError, DrainMode, EventQueue, ExecutorPool, SubscriberRegistry,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[test]
fn test_recursive_fan_out_scenario() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let mut registry = SubscriberRegistry::default();
    registry
        .register(
            3,
            subscriber_fn(|_, queue| {
                queue.publish(2, Some(Box::new(32i32))).unwrap();
            }),
        )
        .unwrap();
    let recorder = Arc::clone(&received);
    registry
        .register(
            2,
            subscriber_fn(move |payload, _| {
                let datum = payload.and_then(|p| p.downcast_ref::<i32>()).copied();
                recorder.lock().unwrap().push(datum);
            }),
        )
        .unwrap();

    let queue = EventQueue::default();
    queue.publish(3, None).unwrap();
    ExecutorPool::default().run(&queue, &registry).unwrap();

    assert_eq!(*received.lock().unwrap(), vec![Some(32)]);
    assert!(queue.is_empty());
}

#[test]
fn test_registration_range_check() {
    let mut registry = SubscriberRegistry::new(26);
    let err = registry
        .register(26, subscriber_fn(|_, _| {}))
        .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::InvalidEventType {
            event_type: 26,
            event_types: 26
        }
    ));
    assert_eq!(
        err.to_string(),
        "Event of type 26 is not in valid range 0-25"
    );
}

#[test]
fn test_queue_is_reusable_across_runs() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = SubscriberRegistry::default();
    let counter = Arc::clone(&calls);
    registry
        .register(
            0,
            subscriber_fn(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

    let queue = EventQueue::new(3);
    let pool = ExecutorPool::new(2, DrainMode::Quiescent);
    for _ in 0..3 {
        for _ in 0..3 {
            queue.publish(0, None).unwrap();
        }
        let report = pool.run(&queue, &registry).unwrap();
        assert_eq!(report.dispatched(), 3);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 9);
}

#[test]
fn test_many_workers_drain_large_backlog() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = SubscriberRegistry::default();
    for event_type in 0..26 {
        let counter = Arc::clone(&calls);
        registry
            .register(
                event_type,
                subscriber_fn(move |_, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
    }

    let queue = EventQueue::new(10_000);
    for i in 0..5_000u32 {
        queue.publish(i % 26, None).unwrap();
    }
    let report = ExecutorPool::new(8, DrainMode::Snapshot)
        .run(&queue, &registry)
        .unwrap();

    assert_eq!(report.workers.len(), 8);
    assert_eq!(report.dispatched(), 5_000);
    assert_eq!(calls.load(Ordering::SeqCst), 5_000);
    assert!(queue.is_empty());
}
