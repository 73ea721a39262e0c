//! Task queue integration tests
//!
//! Submissions from many tasks at once on a multi-threaded runtime.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anidrop::queue::TaskQueue;
use parking_lot::Mutex;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submitters_share_one_worker() {
    let queue = TaskQueue::new();
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicUsize::new(0));

    let mut submitters = Vec::new();
    for s in 0..8 {
        let queue = queue.clone();
        let active = active.clone();
        let peak = peak.clone();
        let finished = finished.clone();
        submitters.push(tokio::spawn(async move {
            for i in 0..4 {
                let active = active.clone();
                let peak = peak.clone();
                let finished = finished.clone();
                queue.submit(format!("submitter {s} task {i}"), move || async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    finished.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                });
            }
        }));
    }

    for submitter in submitters {
        submitter.await.unwrap();
    }
    queue.wait_idle().await;

    assert_eq!(finished.load(Ordering::SeqCst), 32);
    assert_eq!(peak.load(Ordering::SeqCst), 1);
    assert!(queue.is_idle());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ids_follow_submission_order() {
    let queue = TaskQueue::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let mut ids = Vec::new();
    for i in 0..6 {
        let order = order.clone();
        ids.push(queue.submit(format!("task {i}"), move || async move {
            order.lock().push(i);
            if i == 2 {
                anyhow::bail!("task {i} failed");
            }
            Ok(())
        }));
    }

    queue.wait_idle().await;

    assert!(ids.windows(2).all(|w| w[0].get() < w[1].get()));
    assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4, 5]);
}
