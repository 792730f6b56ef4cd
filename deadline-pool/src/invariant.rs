//! Detection of broken internal invariants.
//!
//! A broken invariant means shared state may already be corrupt, so it is never
//! surfaced as a recoverable error. [`invariant_violation`] reports the message
//! through the error sink and `tracing`, then panics with a `BUG:` prefix.

/// Report a broken internal invariant and panic.
///
/// The `BUG:` line goes to the installed error logger before the panic
/// starts, so it is recorded even when the panic is caught further up.
///
/// # Panics
///
/// Always. The panic unwinds like any other: inside a `tokio::spawn`ed task it
/// ends that task and surfaces as a `JoinError`, and the process keeps
/// running. Build with `panic = "abort"` to make every violation terminate
/// the process.
#[cold]
#[track_caller]
pub fn invariant_violation(message: &str) -> ! {
    crate::log_error!("BUG: {}", message);
    tracing::error!(target: "deadline_pool::invariant", "BUG: {}", message);
    panic!("BUG: {}", message);
}

/// Assert an internal invariant, panicking through [`invariant_violation`] when
/// it does not hold.
///
/// The check runs in release builds too.
#[macro_export]
macro_rules! assert_invariant {
    ($condition:expr, $message:expr) => {
        if !$condition {
            $crate::invariant::invariant_violation($message);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_sink::reset_error_logger;
    use crate::error_sink::test_support::{capture, lock_sink};

    #[test]
    fn test_invariant_holds() {
        assert_invariant!(1 + 1 == 2, "arithmetic");
    }

    #[test]
    #[should_panic(expected = "BUG: timer trapped")]
    fn test_invariant_violation_panics() {
        let _guard = lock_sink();
        assert_invariant!(false, "timer trapped");
    }

    #[test]
    fn test_violation_reaches_error_sink() {
        let _guard = lock_sink();
        let lines = capture();

        let result = std::panic::catch_unwind(|| {
            invariant_violation("idle timer still armed");
        });
        reset_error_logger();

        assert!(result.is_err());
        assert_eq!(
            lines.lock().expect("capture lock").as_slice(),
            ["BUG: idle timer still armed"]
        );
    }
}
