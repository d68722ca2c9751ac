//! EventQueue: the shared LIFO stack of pending events
//!
//! A single mutex guards the stack and its counters. Publishing and popping are
//! O(1) and never block beyond that critical section, so any worker, subscriber
//! or the seeding caller may publish at any time.
//!
//! The publish counter is cumulative: it is zeroed only by [`EventQueue::reset`],
//! which the executor calls once before each run. Once `ceiling` publish attempts
//! have been accepted, every further attempt is refused until the next reset.

use crate::core::config::EngineConfig;
use crate::core::sync::handle_mutex_poison;
use crate::dispatch::error::{DispatchError, DispatchResult, PublishError};
use crate::dispatch::event::{Event, EventType, Payload};
use crate::dispatch::executor::DrainMode;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Default number of publish attempts accepted per run
pub const DEFAULT_PUBLISH_CEILING: usize = 512;

#[derive(Debug, Default)]
struct QueueState {
    /// Pending events; the last element is the head
    events: Vec<Event>,
    /// Publish attempts since the last reset
    publish_count: usize,
    /// Publishes refused since the last reset
    dropped: usize,
    /// Events popped whose dispatch has not finished yet
    in_flight: usize,
}

/// Concurrency-safe LIFO container of pending events
#[derive(Debug)]
pub struct EventQueue {
    state: Mutex<QueueState>,
    /// Signalled on publish and whenever an in-flight dispatch completes
    activity: Condvar,
    ceiling: usize,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLISH_CEILING)
    }
}

impl EventQueue {
    pub fn new(ceiling: usize) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            activity: Condvar::new(),
            ceiling,
        }
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self::new(config.publish_ceiling)
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    fn lock(&self) -> DispatchResult<MutexGuard<'_, QueueState>> {
        handle_mutex_poison(self.state.lock(), |message| {
            // Workers parked in take_next must wake up to see the poisoned lock
            self.activity.notify_all();
            DispatchError::LockFailure { message }
        })
    }

    /// Read-only view of the state for inspection; tolerates a poisoned lock
    fn peek(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish a new event, taking ownership of its payload
    ///
    /// When the ceiling has been reached the event is refused and handed back
    /// inside the error; the refusal is logged and counted.
    pub fn publish(
        &self,
        event_type: EventType,
        payload: Option<Payload>,
    ) -> Result<(), PublishError> {
        self.publish_event(Event::new(event_type, payload))
    }

    /// Publish an already constructed event
    pub fn publish_event(&self, event: Event) -> Result<(), PublishError> {
        let mut state = match self.lock() {
            Ok(state) => state,
            Err(reason) => return Err(PublishError::new(event, reason)),
        };

        let attempts = state.publish_count;
        state.publish_count = attempts.saturating_add(1);

        if attempts >= self.ceiling {
            state.dropped += 1;
            drop(state);

            log::warn!(
                "Event of type {} could not be published (publish ceiling of {} reached)",
                event.event_type(),
                self.ceiling
            );
            let reason = DispatchError::OverflowDropped {
                event_type: event.event_type(),
                ceiling: self.ceiling,
            };
            return Err(PublishError::new(event, reason));
        }

        state.events.push(event);
        drop(state);
        self.activity.notify_one();
        Ok(())
    }

    /// Detach and return the most recently published event, if any
    pub fn pop(&self) -> DispatchResult<Option<Event>> {
        Ok(self.lock()?.events.pop())
    }

    /// Zero the publish and drop counters ahead of a fresh run
    pub fn reset(&self) -> DispatchResult<()> {
        let mut state = self.lock()?;
        state.publish_count = 0;
        state.dropped = 0;
        state.in_flight = 0;
        Ok(())
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.peek().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peek().events.is_empty()
    }

    /// Publish attempts since the last reset, refused ones included
    pub fn publish_count(&self) -> usize {
        self.peek().publish_count
    }

    /// Publishes refused by the ceiling since the last reset
    pub fn dropped(&self) -> usize {
        self.peek().dropped
    }

    /// Pop the next event on behalf of a worker and mark it in flight
    ///
    /// Returns `None` when the worker should retire. In snapshot mode that is the
    /// first time the stack is observed empty. In quiescent mode the worker waits
    /// while any other dispatch is still in flight, since that dispatch may
    /// publish more work.
    pub(crate) fn take_next(&self, mode: DrainMode) -> DispatchResult<Option<Event>> {
        let mut state = self.lock()?;
        loop {
            if let Some(event) = state.events.pop() {
                state.in_flight += 1;
                return Ok(Some(event));
            }

            match mode {
                DrainMode::Snapshot => return Ok(None),
                DrainMode::Quiescent if state.in_flight == 0 => {
                    drop(state);
                    self.activity.notify_all();
                    return Ok(None);
                }
                DrainMode::Quiescent => {
                    state = handle_mutex_poison(self.activity.wait(state), |message| {
                        DispatchError::LockFailure { message }
                    })?;
                }
            }
        }
    }

    /// Mark a dispatch obtained from [`EventQueue::take_next`] as complete
    pub(crate) fn finish_dispatch(&self) -> DispatchResult<()> {
        let mut state = self.lock()?;
        state.in_flight = state.in_flight.saturating_sub(1);
        let idle = state.in_flight == 0 && state.events.is_empty();
        drop(state);
        if idle {
            self.activity.notify_all();
        }
        Ok(())
    }
}
