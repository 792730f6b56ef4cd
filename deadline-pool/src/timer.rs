//! Single-shot deadline timer with an exactly-once readiness signal.
//!
//! A [`DeadlineTimer`] is in one of three phases:
//!
//! ```text
//!            reset()                 deadline passes
//!   ┌──────┐ ───────► ┌───────┐ ──────────────────► ┌───────┐
//!   │ Idle │          │ Armed │                     │ Fired │
//!   └──────┘ ◄─────── └───────┘                     └───┬───┘
//!      ▲      stop()                                    │
//!      └────────────────────────────────────────────────┘
//!          signal delivered (await / try_expired)
//! ```
//!
//! The readiness signal exists only in the `Fired` phase and is consumed by the
//! first observer. `stop()` on a fired timer does not consume it, so whoever
//! recycles the timer must drain it first.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::runtime::{self, Handle};
use tokio::time::{Instant, Sleep};

static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

/// Roughly 30 years, the same clamp tokio applies to unrepresentable sleeps.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Armed,
    Fired,
}

/// A reusable single-shot timer.
///
/// Awaiting the timer (or `&mut timer`) resolves once when the deadline
/// passes. After the signal has been delivered, or after the timer was
/// stopped, further awaits stay pending until the timer is [`reset`].
///
/// A timer is bound to the Tokio runtime it was created on and must not be
/// polled after that runtime shuts down. [`TimerPool`](crate::TimerPool)
/// only hands an idle timer back to callers on the same runtime.
///
/// [`reset`]: DeadlineTimer::reset
#[derive(Debug)]
pub struct DeadlineTimer {
    id: u64,
    runtime: runtime::Id,
    sleep: Pin<Box<Sleep>>,
    deadline: Instant,
    phase: Phase,
}

impl DeadlineTimer {
    /// Create a timer armed to fire `duration` from now.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime with the time driver enabled.
    pub fn new(duration: Duration) -> Self {
        let deadline = deadline_after(duration);
        Self {
            id: NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed),
            runtime: Handle::current().id(),
            sleep: Box::pin(tokio::time::sleep_until(deadline)),
            deadline,
            phase: Phase::Armed,
        }
    }

    /// Process-unique identity of this timer object, stable across reuse.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Identity of the runtime whose time driver backs this timer.
    pub fn runtime_id(&self) -> runtime::Id {
        self.runtime
    }

    /// Instant at which the current countdown fires.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Whether the timer is counting down and has not reached its deadline.
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Armed && Instant::now() < self.deadline
    }

    /// Whether a readiness signal is waiting to be consumed.
    pub fn is_fired(&self) -> bool {
        match self.phase {
            Phase::Idle => false,
            Phase::Armed => Instant::now() >= self.deadline,
            Phase::Fired => true,
        }
    }

    /// Re-arm the timer to fire `duration` from now.
    ///
    /// Returns `true` if the timer was still counting down. An undelivered
    /// signal from the previous countdown is discarded.
    pub fn reset(&mut self, duration: Duration) -> bool {
        self.observe();
        let was_active = self.phase == Phase::Armed;
        self.deadline = deadline_after(duration);
        self.sleep.as_mut().reset(self.deadline);
        self.phase = Phase::Armed;
        was_active
    }

    /// Stop the countdown.
    ///
    /// Returns `true` if the call stopped the timer before it fired, `false`
    /// if it had already fired or was not running. A signal that fired but
    /// was never consumed stays pending.
    pub fn stop(&mut self) -> bool {
        self.observe();
        if self.phase == Phase::Armed {
            self.phase = Phase::Idle;
            true
        } else {
            false
        }
    }

    /// Consume the readiness signal if it is available, without waiting.
    pub fn try_expired(&mut self) -> bool {
        self.observe();
        if self.phase == Phase::Fired {
            self.phase = Phase::Idle;
            true
        } else {
            false
        }
    }

    /// Poll for the readiness signal, registering `cx` for wakeup while the
    /// countdown is running.
    pub fn poll_expired(&mut self, cx: &mut Context<'_>) -> Poll<()> {
        self.observe();
        match self.phase {
            Phase::Idle => Poll::Pending,
            Phase::Fired => {
                self.phase = Phase::Idle;
                Poll::Ready(())
            }
            Phase::Armed => match self.sleep.as_mut().poll(cx) {
                Poll::Ready(()) => {
                    self.phase = Phase::Idle;
                    Poll::Ready(())
                }
                Poll::Pending => Poll::Pending,
            },
        }
    }

    fn observe(&mut self) {
        if self.phase == Phase::Armed && Instant::now() >= self.deadline {
            self.phase = Phase::Fired;
        }
    }
}

impl Future for DeadlineTimer {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.get_mut().poll_expired(cx)
    }
}

fn deadline_after(duration: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(duration).unwrap_or_else(|| now + FAR_FUTURE)
}
