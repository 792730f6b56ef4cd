use std::time::Duration;

use deadline_pool::{TimerError, TimerPool, TimerPoolConfig};
use tokio::time::{advance, Instant};

use super::init_tracing;

#[tokio::test(start_paused = true)]
async fn test_single_caller_reuses_one_timer() {
    init_tracing();
    let pool = TimerPool::new();
    let mut ids = Vec::new();

    for round in 0..10u64 {
        let mut timer = pool.acquire(Duration::from_millis(round));
        ids.push(timer.id());
        if round % 2 == 0 {
            (&mut timer).await;
        }
        pool.release(timer);
    }

    ids.dedup();
    assert_eq!(ids.len(), 1);
    assert_eq!(pool.stats().created, 1);
    assert_eq!(pool.stats().reused, 9);
}

#[tokio::test(start_paused = true)]
async fn test_no_cross_talk_after_late_release() {
    init_tracing();
    let pool = TimerPool::new();

    // The response loses the race: the timer fires but the caller releases
    // it without looking at the signal.
    let timer = pool.acquire(Duration::from_millis(5));
    advance(Duration::from_millis(10)).await;
    pool.release(timer);

    let start = Instant::now();
    let mut timer = pool.acquire(Duration::from_millis(40));
    assert!(!timer.try_expired());

    (&mut timer).await;
    assert!(start.elapsed() >= Duration::from_millis(40));
    pool.release(timer);
}

#[tokio::test(start_paused = true)]
async fn test_early_release_cancels_wait() {
    init_tracing();
    let pool = TimerPool::new();

    let timer = pool.acquire(Duration::from_secs(20));
    let id = timer.id();
    pool.release(timer);

    advance(Duration::from_secs(30)).await;

    let mut timer = pool.acquire(Duration::from_millis(10));
    assert_eq!(timer.id(), id);
    assert!(!timer.try_expired());
    advance(Duration::from_millis(10)).await;
    assert!(timer.try_expired());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_bounds_slow_reply() {
    init_tracing();
    let pool = TimerPool::with_config(TimerPoolConfig::default().with_max_idle(4));
    let (tx, rx) = tokio::sync::oneshot::channel::<u32>();

    let slow = pool.timeout(Duration::from_millis(100), rx).await;
    assert_eq!(slow.map(|r| r.is_ok()), Err(TimerError::Elapsed));

    let (tx2, rx2) = tokio::sync::oneshot::channel::<u32>();
    tx2.send(42).expect("receiver alive");
    let fast = pool.timeout(Duration::from_millis(100), rx2).await;
    assert_eq!(fast.map(|r| r.ok()), Ok(Some(42)));

    drop(tx);
    assert_eq!(pool.stats().created, 1);
    assert_eq!(pool.stats().idle, 1);
}
