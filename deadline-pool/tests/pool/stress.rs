use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use deadline_pool::TimerPool;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::Instant;

use super::init_tracing;

const WORKERS: u64 = 16;
const BUDGET: Duration = Duration::from_millis(500);

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_acquire_release() {
    init_tracing();
    let pool = Arc::new(TimerPool::new());
    let in_use = Arc::new(Mutex::new(HashSet::new()));

    let mut handles = Vec::new();
    for worker in 0..WORKERS {
        let pool = pool.clone();
        let in_use = in_use.clone();
        handles.push(tokio::spawn(async move {
            let mut rng = StdRng::seed_from_u64(worker);
            let stop_at = Instant::now() + BUDGET;
            let mut cycles = 0u64;

            while Instant::now() < stop_at {
                let duration = Duration::from_micros(rng.random_range(0..2_000));
                let start = Instant::now();
                let mut timer = pool.acquire(duration);
                assert!(
                    in_use.lock().expect("in-use lock").insert(timer.id()),
                    "timer {} handed to two callers",
                    timer.id()
                );

                // A quarter of the calls are abandoned before the deadline.
                if !rng.random_bool(0.25) {
                    (&mut timer).await;
                    assert!(start.elapsed() >= duration);
                    assert!(!timer.try_expired(), "signal delivered twice");
                }

                assert!(in_use.lock().expect("in-use lock").remove(&timer.id()));
                pool.release(timer);
                cycles += 1;
            }
            cycles
        }));
    }

    for handle in handles {
        let cycles = handle.await.expect("worker panicked");
        assert!(cycles > 0);
    }

    // Each worker holds at most one timer at a time.
    let stats = pool.stats();
    assert!(stats.created <= WORKERS, "created {} timers", stats.created);
    assert!(stats.reused > 0);
    assert_eq!(stats.idle as u64, stats.created);
}

#[test]
fn test_acquire_release_from_plain_threads() {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_time()
        .build()
        .expect("build runtime");
    let handle = runtime.handle().clone();
    let pool = TimerPool::new();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let pool = &pool;
            let handle = &handle;
            scope.spawn(move || {
                let _guard = handle.enter();
                for i in 0..200u64 {
                    let timer = pool.acquire(Duration::from_micros(i % 50));
                    // Outlive the deadline so release has to drain the fire.
                    if i % 3 == 0 {
                        std::thread::sleep(Duration::from_micros(60));
                    }
                    pool.release(timer);
                }
            });
        }
    });

    let stats = pool.stats();
    assert_eq!(stats.created + stats.reused, 8 * 200);
    assert!(stats.created <= 8);
}
