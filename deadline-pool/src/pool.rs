//! Pool of reusable deadline timers.
//!
//! An RPC layer bounds every call with a timer: [`TimerPool::acquire`] when the
//! wait starts, [`TimerPool::release`] when it ends, whether the response
//! arrived, the deadline passed or the caller gave up. Released timers are
//! kept and re-armed for later calls instead of allocating a fresh timer each
//! time.
//!
//! # Invariants
//!
//! - A timer returned by `acquire` is armed and its signal is unconsumed.
//! - A timer in the idle set is stopped and carries no pending signal.
//!
//! Reuse only saves allocations. A fresh timer is always a valid answer to
//! `acquire`, and the idle set may be capped or cleared at any time.
//!
//! # Runtimes
//!
//! A timer is tied to the time driver of the runtime that created it, which
//! may have shut down by the time the timer is reused. `acquire` only reuses
//! idle timers created on the caller's runtime and drops the others. A process
//! that keeps several runtimes alive at once reuses best with one pool per
//! runtime.

use std::future::{poll_fn, Future};
use std::pin::pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::runtime::{self, Handle};

use crate::config::TimerPoolConfig;
use crate::error::TimerError;
use crate::timer::DeadlineTimer;

static GLOBAL_POOL: TimerPool = TimerPool::new();

/// Snapshot of pool activity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Timers constructed because the idle set was empty
    pub created: u64,

    /// Acquisitions served from the idle set
    pub reused: u64,

    /// Timers dropped because the idle set was full or they belonged to
    /// another runtime
    pub discarded: u64,

    /// Timers currently idle
    pub idle: usize,
}

/// Concurrency-safe cache of reusable [`DeadlineTimer`]s.
///
/// `acquire` and `release` hold the pool lock only for a single push or pop
/// and never wait on a deadline.
#[derive(Debug)]
pub struct TimerPool {
    idle: Mutex<Vec<DeadlineTimer>>,
    config: TimerPoolConfig,
    created: AtomicU64,
    reused: AtomicU64,
    discarded: AtomicU64,
}

impl TimerPool {
    /// Create an empty pool that keeps every released timer.
    pub const fn new() -> Self {
        Self::with_config(TimerPoolConfig { max_idle: None })
    }

    /// Create an empty pool with the given configuration.
    pub const fn with_config(config: TimerPoolConfig) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            config,
            created: AtomicU64::new(0),
            reused: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    /// Get the pool configuration.
    pub fn config(&self) -> &TimerPoolConfig {
        &self.config
    }

    /// Get an armed timer that fires `duration` from now.
    ///
    /// `Duration::ZERO` yields a timer that has effectively fired already.
    /// Idle timers created on another runtime are dropped, never reused.
    ///
    /// # Panics
    ///
    /// Panics outside a Tokio runtime, and with a `BUG:` message if an idle
    /// timer turns out to be still armed (see
    /// [`invariant_violation`](crate::invariant::invariant_violation)).
    pub fn acquire(&self, duration: Duration) -> DeadlineTimer {
        let (idle, stale) = self.take_idle(Handle::current().id());
        if !stale.is_empty() {
            self.discarded.fetch_add(stale.len() as u64, Ordering::Relaxed);
            tracing::debug!(count = stale.len(), "dropped idle timers of another runtime");
        }

        let Some(mut timer) = idle else {
            self.created.fetch_add(1, Ordering::Relaxed);
            let timer = DeadlineTimer::new(duration);
            tracing::trace!(timer_id = timer.id(), ?duration, "allocated timer");
            return timer;
        };

        // Two holders would share one timer if this ever fired.
        crate::assert_invariant!(
            !timer.reset(duration),
            "active timer trapped into TimerPool::acquire"
        );
        self.reused.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(timer_id = timer.id(), ?duration, "reused idle timer");
        timer
    }

    /// Return a timer to the pool.
    ///
    /// Stops the countdown and, if the timer fired without anyone consuming
    /// the signal, drains that signal so the next holder cannot observe it.
    /// Never blocks.
    pub fn release(&self, mut timer: DeadlineTimer) {
        if !timer.stop() {
            // Fired (or already consumed) before we got here.
            timer.try_expired();
        }
        debug_assert!(!timer.is_active() && !timer.is_fired());

        let mut idle = self.lock_idle();
        if let Some(max_idle) = self.config.max_idle {
            if idle.len() >= max_idle {
                drop(idle);
                self.discarded.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(timer_id = timer.id(), max_idle, "idle set full, dropping timer");
                return;
            }
        }
        idle.push(timer);
    }

    /// Run `future` to completion unless `duration` elapses first.
    ///
    /// The timer comes from this pool and goes back to it on both outcomes,
    /// and also when the returned future is dropped mid-wait.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::Elapsed`] when the deadline passes first.
    pub async fn timeout<F>(&self, duration: Duration, future: F) -> Result<F::Output, TimerError>
    where
        F: Future,
    {
        let mut timer = ReleaseOnDrop {
            pool: self,
            timer: Some(self.acquire(duration)),
        };
        let mut future = pin!(future);
        poll_fn(|cx| {
            if let Poll::Ready(output) = future.as_mut().poll(cx) {
                return Poll::Ready(Ok(output));
            }
            timer.poll_expired(cx).map(|()| Err(TimerError::Elapsed))
        })
        .await
    }

    /// Number of idle timers ready for reuse.
    pub fn idle_count(&self) -> usize {
        self.lock_idle().len()
    }

    /// Drop every idle timer, returning how many were dropped.
    pub fn clear(&self) -> usize {
        let drained = std::mem::take(&mut *self.lock_idle());
        drained.len()
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.created.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            idle: self.idle_count(),
        }
    }

    /// Pop the most recent idle timer created on `runtime_id`. Foreign timers
    /// popped on the way are returned so the caller drops them outside the
    /// lock.
    fn take_idle(&self, runtime_id: runtime::Id) -> (Option<DeadlineTimer>, Vec<DeadlineTimer>) {
        let mut stale = Vec::new();
        let mut idle = self.lock_idle();
        while let Some(timer) = idle.pop() {
            if timer.runtime_id() == runtime_id {
                return (Some(timer), stale);
            }
            stale.push(timer);
        }
        (None, stale)
    }

    // A panic while holding the lock cannot leave the Vec half-updated.
    fn lock_idle(&self) -> MutexGuard<'_, Vec<DeadlineTimer>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TimerPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns a pool timer on drop, so cancelled waits still recycle it.
struct ReleaseOnDrop<'a> {
    pool: &'a TimerPool,
    timer: Option<DeadlineTimer>,
}

impl ReleaseOnDrop<'_> {
    fn poll_expired(&mut self, cx: &mut Context<'_>) -> Poll<()> {
        match self.timer.as_mut() {
            Some(timer) => timer.poll_expired(cx),
            None => Poll::Pending,
        }
    }
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            self.pool.release(timer);
        }
    }
}

/// The process-wide timer pool.
pub fn global() -> &'static TimerPool {
    &GLOBAL_POOL
}

/// Acquire a timer from the process-wide pool.
///
/// See [`TimerPool::acquire`].
pub fn acquire_timer(duration: Duration) -> DeadlineTimer {
    GLOBAL_POOL.acquire(duration)
}

/// Release a timer into the process-wide pool.
///
/// See [`TimerPool::release`].
pub fn release_timer(timer: DeadlineTimer) {
    GLOBAL_POOL.release(timer);
}
