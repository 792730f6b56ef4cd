//! Error types for deadline-bounded waits and configuration.

use thiserror::Error;

/// Errors returned by bounded waits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// The deadline elapsed before the operation completed.
    #[error("operation timed out")]
    Elapsed,
}

/// Errors found while validating an [`RpcConfig`](crate::RpcConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A field that must be non-zero was zero.
    #[error("{field} must be greater than zero")]
    Zero {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The flush delay is not shorter than the request timeout.
    #[error("flush delay {flush_delay:?} must be shorter than request timeout {request_timeout:?}")]
    FlushDelayTooLong {
        /// Configured flush delay.
        flush_delay: std::time::Duration,
        /// Configured request timeout.
        request_timeout: std::time::Duration,
    },
}
