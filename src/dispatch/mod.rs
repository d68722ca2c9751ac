//! In-process publish/subscribe dispatch engine
//!
//! Producers publish typed events with opaque payloads onto a shared LIFO
//! [`EventQueue`]. An [`ExecutorPool`] of worker threads drains the queue and
//! invokes every [`Subscriber`] registered for each event's type in the
//! [`SubscriberRegistry`]. Subscribers may publish further events, which are
//! processed within the same run.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐ publish  ┌──────────────────────────┐
//! │  Caller  ├─────────►│ EventQueue (LIFO, Mutex) │◄──────────┐
//! └──────────┘          └────────────┬─────────────┘           │
//!                                    │ pop                     │ publish
//!                     ┌──────────────┼──────────────┐          │
//!                     ▼              ▼              ▼          │
//!               ┌──────────┐   ┌──────────┐   ┌──────────┐     │
//!               │ Worker 0 │   │ Worker 1 │   │ Worker N │     │
//!               └────┬─────┘   └────┬─────┘   └────┬─────┘     │
//!                    │ lookup       │              │           │
//!                    ▼              ▼              ▼           │
//!               ┌─────────────────────────────────────────┐    │
//!               │ SubscriberRegistry (read-only in a run) ├────┘
//!               └─────────────────────────────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use eventstack::dispatch::{subscriber_fn, EventQueue, ExecutorPool, SubscriberRegistry};
//!
//! let mut registry = SubscriberRegistry::default();
//! registry
//!     .register(3, subscriber_fn(|_payload, queue| {
//!         let _ = queue.publish(2, Some(Box::new(32i32)));
//!     }))
//!     .unwrap();
//!
//! let queue = EventQueue::default();
//! queue.publish(3, None).unwrap();
//!
//! let report = ExecutorPool::default().run(&queue, &registry).unwrap();
//! assert_eq!(report.processed(), 2);
//! assert!(queue.is_empty());
//! ```

mod error;
mod event;
mod executor;
mod queue;
mod registry;

pub use error::{DispatchError, DispatchResult, PublishError};
pub use event::{Event, EventType, Payload};
pub use executor::{
    DrainMode, ExecutorPool, PoolState, RunReport, WorkerReport, WorkerState,
    DEFAULT_WORKER_COUNT,
};
pub use queue::{EventQueue, DEFAULT_PUBLISH_CEILING};
pub use registry::{subscriber_fn, Subscriber, SubscriberRegistry, DEFAULT_EVENT_TYPES};

#[cfg(test)]
mod tests;
