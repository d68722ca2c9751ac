//! Fatal error reporting
//!
//! Errors that reach the top of the binary are split into user-actionable ones
//! (bad configuration, bad input) whose message is shown as-is, and system
//! failures (lock poisoning, thread spawn failure) where the user sees the
//! operation that failed and the detail goes to the debug log.

/// Errors that can tell user mistakes apart from system failures
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)`; otherwise it should return `None`.
pub trait ContextualError: std::error::Error {
    fn is_user_actionable(&self) -> bool;

    fn user_message(&self) -> Option<&str>;
}

/// Log a fatal error with the level of detail its kind calls for
///
/// # Examples
/// ```rust,no_run
/// # use eventstack::core::error_handling::log_error_with_context;
/// # use eventstack::dispatch::DispatchError;
/// let err = DispatchError::InvalidConfig { message: "worker_count must be at least 1".into() };
/// log_error_with_context(&err, "Configuration loading");
/// // Logs: "FATAL: worker_count must be at least 1"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    log::error!("FATAL: {}", fatal_message(error, operation_context));
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

fn fatal_message<'a, E: ContextualError>(error: &'a E, operation_context: &'a str) -> &'a str {
    if error.is_user_actionable() {
        error.user_message().unwrap_or(operation_context)
    } else {
        operation_context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::DispatchError;

    #[test]
    fn test_config_error_shows_its_message() {
        let error = DispatchError::InvalidConfig {
            message: "publish_ceiling must be at least 1".to_string(),
        };
        assert!(error.is_user_actionable());
        assert_eq!(
            fatal_message(&error, "Configuration loading"),
            "publish_ceiling must be at least 1"
        );
    }

    #[test]
    fn test_lock_failure_uses_generic_context() {
        let error = DispatchError::LockFailure {
            message: "mutex poisoned".to_string(),
        };
        assert!(!error.is_user_actionable());
        assert_eq!(error.user_message(), None);
        assert_eq!(fatal_message(&error, "Dispatch run"), "Dispatch run");
    }
}
