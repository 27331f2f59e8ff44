use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use flow_board::api::ApiError;
use flow_board::cache::{PollingCache, QueryKey, Subscription};

fn remote_error(detail: &str) -> ApiError {
    ApiError::Remote {
        status: 500,
        detail: detail.to_owned(),
    }
}

/// Drive the subscription until `pred` holds, failing after `max` updates.
async fn wait_for<T: Clone>(
    sub: &mut Subscription<T>,
    max: usize,
    pred: impl Fn(&flow_board::cache::QueryState<T>) -> bool,
) {
    for _ in 0..max {
        if pred(&sub.current()) {
            return;
        }
        assert!(sub.changed().await, "driver stopped before condition held");
    }
    panic!("condition not reached after {max} updates");
}

#[tokio::test]
async fn subscribe_fetches_immediately() {
    let cache = PollingCache::new();
    let mut sub = cache.subscribe(QueryKey::Workflows, None, || async {
        Ok::<_, ApiError>(vec![1, 2, 3])
    });

    wait_for(&mut sub, 10, |s| s.data.is_some()).await;
    let state = sub.current();
    assert_eq!(state.data.unwrap(), vec![1, 2, 3]);
    assert!(!state.loading);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn failed_fetch_keeps_snapshot_and_schedule() {
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = PollingCache::new();
    let mut sub = cache.subscribe(QueryKey::Workflows, Some(Duration::from_millis(20)), {
        let calls = Arc::clone(&calls);
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    // Five workflows' worth of data, stand-in values.
                    Ok(vec![10, 20, 30, 40, 50])
                } else {
                    Err(remote_error("connection reset"))
                }
            }
        }
    });

    wait_for(&mut sub, 20, |s| s.error.is_some() && !s.loading).await;

    let state = sub.current();
    // Prior snapshot remains visible alongside the recorded error.
    assert_eq!(state.data.as_ref().unwrap().len(), 5);
    assert!(state.error.as_ref().unwrap().contains("connection reset"));

    // Polling is self-healing: later cycles still fire despite the failures.
    let before = calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(calls.load(Ordering::SeqCst) > before);
}

#[tokio::test]
async fn error_clears_on_next_successful_fetch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = PollingCache::new();
    let mut sub = cache.subscribe(QueryKey::Logs, Some(Duration::from_millis(15)), {
        let calls = Arc::clone(&calls);
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 1 {
                    Err(remote_error("blip"))
                } else {
                    Ok(vec![n])
                }
            }
        }
    });

    wait_for(&mut sub, 20, |s| s.error.is_some()).await;
    wait_for(&mut sub, 20, |s| {
        s.error.is_none() && s.data.as_ref().is_some_and(|d| d[0] >= 2)
    })
    .await;
}

#[tokio::test]
async fn invalidate_refetches_a_manual_only_query() {
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = PollingCache::new();
    let mut sub = cache.subscribe(QueryKey::Integrations, None, {
        let calls = Arc::clone(&calls);
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok::<_, ApiError>(vec![n]) }
        }
    });

    wait_for(&mut sub, 10, |s| s.data.is_some()).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    cache.invalidate(QueryKey::Integrations);
    wait_for(&mut sub, 10, |s| s.data.as_ref().is_some_and(|d| d[0] == 2)).await;

    // Manual-only: nothing else refetches without another invalidate.
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn invalidates_during_an_outstanding_fetch_coalesce() {
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = PollingCache::new();
    let _sub = cache.subscribe(QueryKey::Workflows, None, {
        let calls = Arc::clone(&calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<_, ApiError>(vec![0])
            }
        }
    });

    // Let the first fetch get underway, then pile on invalidations.
    tokio::time::sleep(Duration::from_millis(10)).await;
    cache.invalidate(QueryKey::Workflows);
    cache.invalidate(QueryKey::Workflows);
    cache.invalidate(QueryKey::Workflows);

    tokio::time::sleep(Duration::from_millis(200)).await;
    // Initial fetch plus exactly one coalesced follow-up.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn stale_data_stays_visible_while_revalidating() {
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = PollingCache::new();
    let mut sub = cache.subscribe(QueryKey::Workflows, None, {
        let calls = Arc::clone(&calls);
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n > 0 {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
                Ok::<_, ApiError>(vec![n])
            }
        }
    });

    wait_for(&mut sub, 10, |s| s.data.is_some()).await;
    cache.invalidate(QueryKey::Workflows);
    wait_for(&mut sub, 10, |s| s.loading).await;

    // Mid-revalidation: loading, but the old snapshot is still there.
    let state = sub.current();
    assert!(state.loading);
    assert_eq!(state.data.unwrap(), vec![0]);
}

#[tokio::test]
async fn dropping_the_subscription_stops_polling() {
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = PollingCache::new();
    let mut sub = cache.subscribe(QueryKey::Logs, Some(Duration::from_millis(10)), {
        let calls = Arc::clone(&calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, ApiError>(vec![0]) }
        }
    });

    wait_for(&mut sub, 10, |s| s.data.is_some()).await;
    drop(sub);

    // Allow any in-flight cycle to drain, then the count must hold still.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let settled = calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(calls.load(Ordering::SeqCst), settled);
}
