//! Demo driver: letter-seeded events and a fixed set of sample subscribers
//!
//! | type | behaviour                                         |
//! |------|---------------------------------------------------|
//! | 0    | reports itself                                    |
//! | 1    | reports itself, publishes a type 0                |
//! | 2    | reports its `i32` datum, if any                   |
//! | 3    | publishes a type 2 carrying 32                    |
//! | 4    | publishes a type 2 carrying 64                    |
//! | 5    | publishes another type 5; registered twice        |
//!
//! Type 5 never stops on its own, so it exercises the publish ceiling.

use crate::core::config::EngineConfig;
use crate::dispatch::{
    subscriber_fn, DispatchResult, Event, EventQueue, EventType, ExecutorPool, RunReport,
    SubscriberRegistry,
};
use std::sync::Arc;

/// Destination for subscriber output lines
pub type Sink = Arc<dyn Fn(String) + Send + Sync>;

/// Map a seed character to its event type; `'a'` is type 0
///
/// Characters before `'a'` wrap around to very large types, which the executor
/// reports as out of range instead of dispatching.
pub fn event_type_for(c: char) -> EventType {
    (c as u32).wrapping_sub('a' as u32)
}

/// Publish one payload-less event per character of `line`, up to the first newline
///
/// Returns the number of events accepted by the queue.
pub fn seed_events(queue: &EventQueue, line: &str) -> usize {
    line.chars()
        .take_while(|&c| c != '\n' && c != '\r')
        .filter(|&c| queue.publish_event(Event::empty(event_type_for(c))).is_ok())
        .count()
}

fn publish_or_log(queue: &EventQueue, event: Event) {
    if let Err(err) = queue.publish_event(event) {
        // Overflow is already reported by the queue
        if err.is_fatal() {
            log::error!("{}", err);
        }
    }
}

pub fn register_demo_subscribers(
    registry: &mut SubscriberRegistry,
    sink: &Sink,
) -> DispatchResult<()> {
    let out = Arc::clone(sink);
    registry.register(
        0,
        subscriber_fn(move |_, _| out("This is a '0'-type subscriber!".to_string())),
    )?;

    let out = Arc::clone(sink);
    registry.register(
        1,
        subscriber_fn(move |_, queue| {
            out("This is a '1'-type subscriber, and it generates a '0'-type event!".to_string());
            publish_or_log(queue, Event::empty(0));
        }),
    )?;

    let out = Arc::clone(sink);
    registry.register(
        2,
        subscriber_fn(move |payload, _| {
            match payload.and_then(|p| p.downcast_ref::<i32>()) {
                Some(datum) => out(format!(
                    "This is a '2'-type subscriber; here's the event's datum: {datum}"
                )),
                None => out("This is a '2'-type subscriber with no data".to_string()),
            }
        }),
    )?;

    for (event_type, datum) in [(3, 32i32), (4, 64i32)] {
        let out = Arc::clone(sink);
        registry.register(
            event_type,
            subscriber_fn(move |_, queue| {
                out(format!(
                    "This is a '{event_type}'-type subscriber, and it generates '2'-type events with a datum of {datum}!"
                ));
                publish_or_log(queue, Event::with_value(2, datum));
            }),
        )?;
    }

    let out = Arc::clone(sink);
    let recursion: Arc<dyn crate::dispatch::Subscriber> = Arc::new(subscriber_fn(move |_, queue| {
        out("This is a '5'-type subscriber, and it generates another '5'-type event!".to_string());
        publish_or_log(queue, Event::empty(5));
    }));
    registry.register_shared(5, Arc::clone(&recursion))?;
    registry.register_shared(5, recursion)?;

    Ok(())
}

/// Wire the demo subscribers, seed `line` and drain it with a pool built from `config`
pub fn run_demo(config: &EngineConfig, line: &str, sink: Sink) -> DispatchResult<RunReport> {
    let mut registry = SubscriberRegistry::with_config(config);
    register_demo_subscribers(&mut registry, &sink)?;

    let queue = EventQueue::with_config(config);
    let seeded = seed_events(&queue, line);
    log::info!("Seeded {} events", seeded);

    let report = ExecutorPool::with_config(config).run(&queue, &registry)?;
    registry.clear();
    Ok(report)
}
