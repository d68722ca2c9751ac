//! Event Types for the Dispatch Engine
//!
//! An event is a type identifier plus an optional, exclusively owned payload.
//! The queue owns an event from publish until a worker pops it; the worker then
//! owns it until every subscriber has returned, at which point it is dropped and
//! the payload released.

use std::any::Any;
use std::fmt;

/// Identifier selecting which subscribers receive an event
pub type EventType = u32;

/// Opaque payload carried by an event
pub type Payload = Box<dyn Any + Send>;

/// A single typed unit of work
pub struct Event {
    event_type: EventType,
    payload: Option<Payload>,
}

impl Event {
    pub fn new(event_type: EventType, payload: Option<Payload>) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    /// Event with no payload attached
    pub fn empty(event_type: EventType) -> Self {
        Self::new(event_type, None)
    }

    /// Event carrying `value` as its payload
    pub fn with_value<T: Any + Send>(event_type: EventType, value: T) -> Self {
        Self::new(event_type, Some(Box::new(value)))
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Borrow the payload for dispatch
    pub fn payload(&self) -> Option<&(dyn Any + Send)> {
        self.payload.as_deref()
    }

    /// Borrow the payload as a concrete type, if it is one
    pub fn payload_as<T: Any>(&self) -> Option<&T> {
        self.payload().and_then(|p| p.downcast_ref::<T>())
    }

    /// Move the payload out, consuming the event
    pub fn into_payload(self) -> Option<Payload> {
        self.payload
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("event_type", &self.event_type)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}
