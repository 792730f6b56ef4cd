//! Named defaults honored by RPC clients and servers built on this crate.
//!
//! These are documented contracts: a client or server uses them unless its
//! own configuration overrides them. See [`RpcConfig`](crate::RpcConfig).

use std::time::Duration;

/// Default timeout for a client request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Default number of pending messages handled by a client or server.
pub const DEFAULT_PENDING_MESSAGES: usize = 32 * 1024;

/// Default delay between message flushes on a client or server.
pub const DEFAULT_FLUSH_DELAY: Duration = Duration::from_millis(5);

/// Default size in bytes of client and server buffers.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;
