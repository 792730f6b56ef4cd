//! # deadline-pool
//!
//! Timing and error-reporting infrastructure for request/response transports.
//!
//! Every in-flight call in an RPC client or server needs a bounded wait, and
//! every internal fault needs to be reported without failing the caller. This
//! crate provides the two pieces underneath:
//!
//! - **Timer pool**: [`TimerPool`] hands out armed [`DeadlineTimer`]s and takes
//!   them back for reuse, draining any fire nobody consumed
//! - **Error sink**: a process-wide, swappable logging function reached through
//!   [`log_error!`] and replaced with [`set_error_logger`]
//! - **Defaults**: the named values clients and servers start from, gathered in
//!   [`RpcConfig`]
//!
//! ## Bounding a call
//!
//! ```ignore
//! use deadline_pool::{acquire_timer, release_timer, DEFAULT_REQUEST_TIMEOUT};
//!
//! let mut timer = acquire_timer(DEFAULT_REQUEST_TIMEOUT);
//! let outcome = tokio::select! {
//!     response = reply => Some(response),
//!     _ = &mut timer => None,
//! };
//! release_timer(timer);
//! ```
//!
//! [`TimerPool::timeout`] wraps the same pattern.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]

/// Configuration for RPC endpoints and timer pools.
pub mod config;

/// Named default values.
pub mod defaults;

/// Error types.
pub mod error;

/// Process-wide pluggable error sink.
pub mod error_sink;

/// Internal invariant checks.
pub mod invariant;

/// Reusable timer pool.
pub mod pool;

/// Single-shot deadline timer.
pub mod timer;

// Configuration exports
pub use config::{RpcConfig, TimerPoolConfig};
pub use defaults::{
    DEFAULT_BUFFER_SIZE, DEFAULT_FLUSH_DELAY, DEFAULT_PENDING_MESSAGES, DEFAULT_REQUEST_TIMEOUT,
};

// Error exports
pub use error::{ConfigError, TimerError};

// Error sink exports
pub use error_sink::{
    log_error, reset_error_logger, set_error_logger, stderr_logger, tracing_logger, LoggerFn,
};

// Timer exports
pub use pool::{acquire_timer, global, release_timer, PoolStats, TimerPool};
pub use timer::DeadlineTimer;
