//! Subscriber registry keyed by event type
//!
//! Registration is a setup-time operation. During a run the registry is shared
//! immutably between workers, which is what lets the executor borrow it across
//! scoped threads without any locking.

use crate::core::config::EngineConfig;
use crate::dispatch::error::{DispatchError, DispatchResult};
use crate::dispatch::event::EventType;
use crate::dispatch::queue::EventQueue;
use std::any::Any;
use std::sync::Arc;

/// Default size of the valid event type range `[0, EVENT_TYPES)`
pub const DEFAULT_EVENT_TYPES: usize = 26;

/// Handler invoked once for every dispatched event of its registered type
///
/// The payload is lent for the duration of the call. A subscriber may publish
/// follow-up events to `queue`; they are picked up within the same run.
pub trait Subscriber: Send + Sync {
    fn on_event(&self, payload: Option<&(dyn Any + Send)>, queue: &EventQueue);
}

impl<F> Subscriber for F
where
    F: Fn(Option<&(dyn Any + Send)>, &EventQueue) + Send + Sync,
{
    fn on_event(&self, payload: Option<&(dyn Any + Send)>, queue: &EventQueue) {
        self(payload, queue)
    }
}

/// Fix a closure's argument types so it can be registered without annotations
///
/// ```rust
/// use eventstack::dispatch::{subscriber_fn, SubscriberRegistry};
///
/// let mut registry = SubscriberRegistry::default();
/// registry
///     .register(0, subscriber_fn(|_payload, queue| {
///         let _ = queue.publish(1, None);
///     }))
///     .unwrap();
/// ```
pub fn subscriber_fn<F>(f: F) -> F
where
    F: Fn(Option<&(dyn Any + Send)>, &EventQueue) + Send + Sync + 'static,
{
    f
}

/// Maps each event type to its subscribers, most recently registered first
pub struct SubscriberRegistry {
    map: Vec<Vec<Arc<dyn Subscriber>>>,
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_TYPES)
    }
}

impl SubscriberRegistry {
    pub fn new(event_types: usize) -> Self {
        Self {
            map: (0..event_types).map(|_| Vec::new()).collect(),
        }
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self::new(config.event_types)
    }

    /// Size of the valid event type range
    pub fn event_types(&self) -> usize {
        self.map.len()
    }

    /// Register `subscriber` for `event_type`, ahead of any earlier registrations
    pub fn register<S>(&mut self, event_type: EventType, subscriber: S) -> DispatchResult<()>
    where
        S: Subscriber + 'static,
    {
        self.register_shared(event_type, Arc::new(subscriber))
    }

    /// Register an already shared subscriber; the same handler may appear more than once
    pub fn register_shared(
        &mut self,
        event_type: EventType,
        subscriber: Arc<dyn Subscriber>,
    ) -> DispatchResult<()> {
        let event_types = self.map.len();
        let subscribers = self
            .map
            .get_mut(event_type as usize)
            .ok_or_else(|| DispatchError::invalid_type(event_type, event_types))?;
        subscribers.insert(0, subscriber);
        log::debug!(
            "Registered subscriber for event type {} ({} total)",
            event_type,
            subscribers.len()
        );
        Ok(())
    }

    /// Subscribers for `event_type` in dispatch order
    pub fn lookup(&self, event_type: EventType) -> DispatchResult<&[Arc<dyn Subscriber>]> {
        self.map
            .get(event_type as usize)
            .map(Vec::as_slice)
            .ok_or_else(|| DispatchError::invalid_type(event_type, self.map.len()))
    }

    pub fn subscriber_count(&self, event_type: EventType) -> usize {
        self.map.get(event_type as usize).map_or(0, Vec::len)
    }

    /// Drop every registration, keeping the type range
    pub fn clear(&mut self) {
        self.map.iter_mut().for_each(Vec::clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_lookup_unregistered_type_is_empty() {
        let registry = SubscriberRegistry::default();
        assert_eq!(registry.event_types(), 26);
        assert!(registry.lookup(0).unwrap().is_empty());
    }

    #[test]
    fn test_register_out_of_range_fails_without_change() {
        let mut registry = SubscriberRegistry::default();
        let result = registry.register(26, subscriber_fn(|_, _| {}));

        match result {
            Err(DispatchError::InvalidEventType {
                event_type,
                event_types,
            }) => {
                assert_eq!(event_type, 26);
                assert_eq!(event_types, 26);
            }
            other => panic!("Expected InvalidEventType, got {other:?}"),
        }
        assert!((0..26).all(|t| registry.subscriber_count(t) == 0));
    }

    #[test]
    fn test_lookup_out_of_range_is_distinct_from_empty() {
        let registry = SubscriberRegistry::new(4);
        assert!(registry.lookup(3).unwrap().is_empty());
        assert!(matches!(
            registry.lookup(4),
            Err(DispatchError::InvalidEventType { event_type: 4, .. })
        ));
    }

    #[test]
    fn test_registration_prepends() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = SubscriberRegistry::new(2);

        for tag in ["first", "second", "third"] {
            let calls = Arc::clone(&calls);
            registry
                .register(
                    1,
                    subscriber_fn(move |_, _| {
                        calls.lock().unwrap().push(tag);
                    }),
                )
                .unwrap();
        }

        let queue = EventQueue::default();
        for subscriber in registry.lookup(1).unwrap() {
            subscriber.on_event(None, &queue);
        }
        assert_eq!(*calls.lock().unwrap(), vec!["third", "second", "first"]);
    }

    #[test]
    fn test_empty_range_rejects_every_type() {
        let mut registry = SubscriberRegistry::new(0);
        let err = registry.register(0, subscriber_fn(|_, _| {})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Event of type 0 is not in valid range (no event types configured)"
        );
        assert!(registry.lookup(0).is_err());
    }

    #[test]
    fn test_clear_keeps_range() {
        let mut registry = SubscriberRegistry::new(3);
        registry
            .register(2, subscriber_fn(|_, _| {}))
            .unwrap();
        assert_eq!(registry.subscriber_count(2), 1);

        registry.clear();
        assert_eq!(registry.subscriber_count(2), 0);
        assert_eq!(registry.event_types(), 3);
    }
}
