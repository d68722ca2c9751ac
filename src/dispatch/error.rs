//! Dispatch Error Types

use crate::dispatch::event::{Event, EventType};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Event of type {event_type} could not be published (publish ceiling of {ceiling} reached)")]
    OverflowDropped { event_type: EventType, ceiling: usize },

    #[error("Event of type {event_type} is not in valid range {}", valid_range(.event_types))]
    InvalidEventType {
        event_type: EventType,
        /// Size of the registry's type range
        event_types: usize,
    },

    #[error("Lock failure: {message}")]
    LockFailure { message: String },

    #[error("Failed to spawn worker {worker}: {source}")]
    WorkerSpawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl DispatchError {
    /// Whether this condition must stop the process rather than be absorbed
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DispatchError::LockFailure { .. } | DispatchError::WorkerSpawn { .. }
        )
    }

    pub(crate) fn invalid_type(event_type: EventType, event_types: usize) -> Self {
        DispatchError::InvalidEventType {
            event_type,
            event_types,
        }
    }
}

fn valid_range(event_types: &usize) -> String {
    match event_types.checked_sub(1) {
        Some(last) => format!("0-{last}"),
        None => "(no event types configured)".to_string(),
    }
}

impl crate::core::error_handling::ContextualError for DispatchError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, DispatchError::InvalidConfig { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            DispatchError::InvalidConfig { message } => Some(message),
            _ => None,
        }
    }
}

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

/// An event the queue refused to take ownership of
///
/// The rejected event travels back to the publisher inside the error, so the
/// caller decides when its payload is released. Dropping the error releases it.
#[derive(Debug, thiserror::Error)]
#[error("{reason}")]
pub struct PublishError {
    event: Event,
    reason: DispatchError,
}

impl PublishError {
    pub(crate) fn new(event: Event, reason: DispatchError) -> Self {
        Self { event, reason }
    }

    pub fn event_type(&self) -> EventType {
        self.event.event_type()
    }

    pub fn reason(&self) -> &DispatchError {
        &self.reason
    }

    pub fn is_fatal(&self) -> bool {
        self.reason.is_fatal()
    }

    /// Take back ownership of the rejected event
    pub fn into_event(self) -> Event {
        self.event
    }
}

impl From<PublishError> for DispatchError {
    fn from(err: PublishError) -> Self {
        err.reason
    }
}
