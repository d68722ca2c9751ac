//! Synchronization utilities for lock poisoning
//!
//! A poisoned lock means a thread panicked while holding it, so the guarded
//! invariants can no longer be trusted. Callers turn that into their own error
//! type and treat it as fatal.

use std::sync::LockResult;

/// Convert a poisoned lock result into an application error
///
/// Works for anything returning a `LockResult`, including `Mutex::lock` and
/// `Condvar::wait`.
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use eventstack::core::sync::handle_mutex_poison;
/// use eventstack::dispatch::DispatchError;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(mutex.lock(), |message| DispatchError::LockFailure { message })
///     .unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (mutex poisoned). This indicates a panic occurred while holding a lock. PoisonError: {:?}",
            poison_err
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[derive(Debug, PartialEq)]
    struct TestError {
        message: String,
    }

    #[test]
    fn test_handle_mutex_poison_success() {
        let mutex = Arc::new(Mutex::new(42));
        let result = handle_mutex_poison(mutex.lock(), |msg| TestError { message: msg });

        assert!(result.is_ok());
        assert_eq!(*result.unwrap(), 42);
    }

    #[test]
    fn test_handle_mutex_poison_with_poisoned_mutex() {
        let mutex = Arc::new(Mutex::new(42));
        let mutex_clone = Arc::clone(&mutex);

        let _ = thread::spawn(move || {
            let _guard = mutex_clone.lock().unwrap();
            panic!("Intentional panic to poison mutex");
        })
        .join();

        let result = handle_mutex_poison(mutex.lock(), |msg| TestError { message: msg });

        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(error.message.contains("mutex poisoned"));
        assert!(error.message.contains("panic occurred"));
    }
}
