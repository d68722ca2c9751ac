//! ExecutorPool: the multi-worker drain-to-completion loop
//!
//! Each worker repeatedly pops from the shared [`EventQueue`], looks up the
//! subscribers for the event's type and invokes them in order, then drops the
//! event. [`ExecutorPool::run`] blocks until every worker has retired.
//!
//! Worker lifecycle:
//!
//! ```text
//!            queue non-empty             subscribers returned
//! Running ──────────────────► Dispatching ───────────────────► Running
//!    │
//!    │ no more work
//!    ▼
//! Retired
//! ```
//!
//! When a worker retires is governed by [`DrainMode`].

use crate::core::config::EngineConfig;
use crate::dispatch::error::{DispatchError, DispatchResult};
use crate::dispatch::queue::EventQueue;
use crate::dispatch::registry::SubscriberRegistry;
use serde::Deserialize;
use std::thread;
use strum_macros::{Display, EnumString};

/// Default number of worker threads
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Policy deciding when a worker stops looking for work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DrainMode {
    /// Retire the first time the queue is observed empty
    ///
    /// A worker may retire while another worker's subscriber is about to publish
    /// more work. That work is still processed by the publishing worker, which
    /// re-checks the queue after its dispatch, but with less parallelism.
    #[default]
    Snapshot,
    /// Retire only when the queue is empty and no dispatch is in flight
    Quiescent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum WorkerState {
    Running,
    Dispatching,
    Retired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PoolState {
    Running,
    Done,
}

/// Work performed by a single worker during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: usize,
    /// Events popped and dispatched to their subscribers
    pub dispatched: usize,
    /// Individual subscriber calls made
    pub invocations: usize,
    /// Events discarded because their type was out of range
    pub invalid: usize,
}

/// Summary of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub workers: Vec<WorkerReport>,
    /// Publishes refused by the ceiling during the run
    pub dropped: usize,
}

impl RunReport {
    pub fn dispatched(&self) -> usize {
        self.workers.iter().map(|w| w.dispatched).sum()
    }

    pub fn invocations(&self) -> usize {
        self.workers.iter().map(|w| w.invocations).sum()
    }

    pub fn invalid(&self) -> usize {
        self.workers.iter().map(|w| w.invalid).sum()
    }

    /// Events popped, whether dispatched or discarded
    pub fn processed(&self) -> usize {
        self.dispatched() + self.invalid()
    }
}

/// Fixed-size pool of worker threads draining an [`EventQueue`]
#[derive(Debug, Clone)]
pub struct ExecutorPool {
    worker_count: usize,
    drain_mode: DrainMode,
}

impl Default for ExecutorPool {
    fn default() -> Self {
        Self::new(DEFAULT_WORKER_COUNT, DrainMode::default())
    }
}

impl ExecutorPool {
    pub fn new(worker_count: usize, drain_mode: DrainMode) -> Self {
        Self {
            worker_count: worker_count.max(1),
            drain_mode,
        }
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self::new(config.worker_count, config.drain_mode)
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn drain_mode(&self) -> DrainMode {
        self.drain_mode
    }

    /// Drain `queue` with the pool's workers and wait for all of them to retire
    ///
    /// The queue's publish counter is reset first, so events seeded before the
    /// call do not count against this run's ceiling. A subscriber panic is
    /// re-raised here once the remaining workers have been joined.
    pub fn run(
        &self,
        queue: &EventQueue,
        registry: &SubscriberRegistry,
    ) -> DispatchResult<RunReport> {
        queue.reset()?;
        log::info!(
            "Dispatch run starting: {} workers, {} pending events, drain mode {}",
            self.worker_count,
            queue.len(),
            self.drain_mode
        );
        log::trace!("Pool state: {}", PoolState::Running);

        let outcomes = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.worker_count);
            for worker in 0..self.worker_count {
                let spawned = thread::Builder::new()
                    .name(format!("eventstack-worker-{worker}"))
                    .spawn_scoped(scope, move || {
                        run_worker(worker, queue, registry, self.drain_mode)
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(source) => {
                        // Already-spawned workers are joined when the scope ends
                        return vec![Err(DispatchError::WorkerSpawn { worker, source })];
                    }
                }
            }

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(outcome) => outcome,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect::<Vec<_>>()
        });

        let mut report = RunReport::default();
        for outcome in outcomes {
            report.workers.push(outcome?);
        }
        report.dropped = queue.dropped();

        log::trace!("Pool state: {}", PoolState::Done);
        log::info!(
            "Dispatch run finished: {} dispatched, {} invocations, {} invalid, {} dropped",
            report.dispatched(),
            report.invocations(),
            report.invalid(),
            report.dropped
        );
        Ok(report)
    }
}

/// Marks a popped event's dispatch complete, even if a subscriber unwinds
///
/// Without this a panicking subscriber would leave the event counted as in
/// flight and quiescent workers would wait for it forever.
struct InFlight<'a> {
    queue: &'a EventQueue,
    completed: bool,
}

impl<'a> InFlight<'a> {
    fn new(queue: &'a EventQueue) -> Self {
        Self {
            queue,
            completed: false,
        }
    }

    fn complete(mut self) -> DispatchResult<()> {
        self.completed = true;
        self.queue.finish_dispatch()
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.completed {
            let _ = self.queue.finish_dispatch();
        }
    }
}

fn run_worker(
    worker: usize,
    queue: &EventQueue,
    registry: &SubscriberRegistry,
    drain_mode: DrainMode,
) -> DispatchResult<WorkerReport> {
    let mut report = WorkerReport {
        worker,
        ..WorkerReport::default()
    };
    log::trace!("Worker {}: {}", worker, WorkerState::Running);

    while let Some(event) = queue.take_next(drain_mode)? {
        let in_flight = InFlight::new(queue);
        log::trace!("Worker {}: {}", worker, WorkerState::Dispatching);
        match registry.lookup(event.event_type()) {
            Ok(subscribers) => {
                log::debug!(
                    "Worker {} dispatching event of type {} to {} subscribers",
                    worker,
                    event.event_type(),
                    subscribers.len()
                );
                for subscriber in subscribers {
                    subscriber.on_event(event.payload(), queue);
                }
                report.dispatched += 1;
                report.invocations += subscribers.len();
            }
            Err(err) => {
                log::warn!("{}", err);
                report.invalid += 1;
            }
        }
        // Release the payload before accounting the dispatch as complete
        drop(event);
        in_flight.complete()?;
        log::trace!("Worker {}: {}", worker, WorkerState::Running);
    }

    log::trace!("Worker {}: {}", worker, WorkerState::Retired);
    Ok(report)
}
