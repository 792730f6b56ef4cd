//! Process-wide pluggable error sink.
//!
//! Every component reports internal faults through [`log_error`] (or the
//! [`log_error!`](crate::log_error!) macro) rather than returning them to a
//! caller that cannot act on them. The function behind the sink starts out as
//! [`stderr_logger`] and can be swapped at any time with [`set_error_logger`].
//!
//! # Ordering
//!
//! Reads and writes of the installed function are synchronized, but a
//! [`log_error`] call that races a [`set_error_logger`] may reach either the
//! old or the new function. Calls that start after the swap returns always
//! reach the new one.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

/// Signature of an error logging function.
pub type LoggerFn = dyn Fn(fmt::Arguments<'_>) + Send + Sync;

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]/[month]/[day] [hour]:[minute]:[second]");

static ERROR_LOGGER: LazyLock<RwLock<Arc<LoggerFn>>> = LazyLock::new(|| {
    let logger: Arc<LoggerFn> = Arc::new(stderr_logger);
    RwLock::new(logger)
});

/// Install `logger` as the process-wide error logging function.
///
/// By default [`stderr_logger`] is used.
pub fn set_error_logger<F>(logger: F)
where
    F: Fn(fmt::Arguments<'_>) + Send + Sync + 'static,
{
    let logger: Arc<LoggerFn> = Arc::new(logger);
    let previous = {
        let mut current = ERROR_LOGGER.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, logger)
    };
    // Dropped outside the lock: a logger may own arbitrary state.
    drop(previous);
}

/// Reinstall [`stderr_logger`] as the error logging function.
pub fn reset_error_logger() {
    set_error_logger(stderr_logger);
}

/// Report an error through the installed logging function.
///
/// The function is invoked outside the sink's lock, so a logger may itself
/// call [`set_error_logger`] or [`log_error`].
pub fn log_error(args: fmt::Arguments<'_>) {
    let logger = ERROR_LOGGER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    logger(args);
}

/// Default logger: one `YYYY/MM/DD HH:MM:SS message` line on stderr.
///
/// Uses the local UTC offset when it can be determined, UTC otherwise. Write
/// failures are ignored.
pub fn stderr_logger(args: fmt::Arguments<'_>) {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let timestamp = now.format(TIMESTAMP_FORMAT).unwrap_or_default();
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{} {}", timestamp, args);
}

/// Logger that forwards every report to `tracing::error!`.
///
/// Install it with `set_error_logger(tracing_logger)` when the process already
/// runs a `tracing` subscriber.
pub fn tracing_logger(args: fmt::Arguments<'_>) {
    tracing::error!(target: "deadline_pool", "{}", args);
}

/// Format a message and report it through the process-wide error sink.
///
/// ```ignore
/// deadline_pool::log_error!("cannot flush {} bytes to {}: {}", len, addr, err);
/// ```
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::error_sink::log_error(::std::format_args!($($arg)*))
    };
}
