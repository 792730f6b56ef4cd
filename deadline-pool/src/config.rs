//! Configuration structures for RPC endpoints and the timer pool.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_BUFFER_SIZE, DEFAULT_FLUSH_DELAY, DEFAULT_PENDING_MESSAGES, DEFAULT_REQUEST_TIMEOUT,
};
use crate::error::ConfigError;

/// Settings an RPC client or server reads at startup.
///
/// Every field falls back to its named default, both through [`Default`] and
/// when a field is missing from a deserialized document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Maximum time a client waits for a response
    pub request_timeout: Duration,

    /// Maximum number of messages queued but not yet sent
    pub pending_messages: usize,

    /// Delay between message flushes
    pub flush_delay: Duration,

    /// Size of read and write buffers in bytes
    pub buffer_size: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            pending_messages: DEFAULT_PENDING_MESSAGES,
            flush_delay: DEFAULT_FLUSH_DELAY,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl RpcConfig {
    /// Override the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the pending message capacity.
    pub fn with_pending_messages(mut self, pending: usize) -> Self {
        self.pending_messages = pending;
        self
    }

    /// Override the flush delay.
    ///
    /// `Duration::ZERO` flushes after every message.
    pub fn with_flush_delay(mut self, delay: Duration) -> Self {
        self.flush_delay = delay;
        self
    }

    /// Override the buffer size.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Check that the configuration can drive a client or server.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Zero`] when the request timeout, pending message
    /// capacity or buffer size is zero, and [`ConfigError::FlushDelayTooLong`]
    /// when messages would sit unflushed for longer than a request may wait.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout.is_zero() {
            return Err(ConfigError::Zero {
                field: "request_timeout",
            });
        }
        if self.pending_messages == 0 {
            return Err(ConfigError::Zero {
                field: "pending_messages",
            });
        }
        if self.buffer_size == 0 {
            return Err(ConfigError::Zero {
                field: "buffer_size",
            });
        }
        if self.flush_delay >= self.request_timeout {
            return Err(ConfigError::FlushDelayTooLong {
                flush_delay: self.flush_delay,
                request_timeout: self.request_timeout,
            });
        }
        Ok(())
    }
}

/// Configuration for a [`TimerPool`](crate::TimerPool).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimerPoolConfig {
    /// Maximum number of idle timers kept for reuse.
    /// None keeps every released timer
    pub max_idle: Option<usize>,
}

impl TimerPoolConfig {
    /// Cap the number of idle timers kept for reuse.
    pub fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = Some(max_idle);
        self
    }
}
