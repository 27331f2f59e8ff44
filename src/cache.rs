use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{Notify, watch};

use crate::api::ApiError;

// ---------------------------------------------------------------------------
// Query identity and snapshot state
// ---------------------------------------------------------------------------

/// Stable identifier for one polled collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Workflows,
    Logs,
    Integrations,
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Workflows => "workflows",
            Self::Logs => "logs",
            Self::Integrations => "integrations",
        };
        f.write_str(s)
    }
}

/// Latest known state of one polled query.
///
/// `data` is the most recent successful snapshot and survives later fetch
/// failures — the view stays "offline but not blank". `error` holds the
/// message of the most recent failure and clears on the next success.
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> QueryState<T> {
    fn initial() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Periodically refreshes named queries and holds their latest snapshots.
///
/// Each subscription runs one driver task that serializes fetches for its
/// key, so at most one fetch is ever outstanding per key and responses
/// apply in request order. Must be used from within a tokio runtime.
#[derive(Default)]
pub struct PollingCache {
    refreshers: Mutex<HashMap<QueryKey, Arc<Notify>>>,
}

impl PollingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` and start polling it with `fetch`.
    ///
    /// The first fetch is issued immediately. `interval` of `None` means
    /// manual-only: fetch once, then only on [`invalidate`](Self::invalidate).
    /// Subscribing a key again replaces its previous registration; the old
    /// driver winds down once its subscription is dropped.
    pub fn subscribe<T, F, Fut>(
        &self,
        key: QueryKey,
        interval: Option<Duration>,
        fetch: F,
    ) -> Subscription<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(QueryState::initial());
        let refresh = Arc::new(Notify::new());
        self.lock().insert(key, Arc::clone(&refresh));
        tokio::spawn(drive(key, interval, fetch, tx, refresh));
        Subscription { rx }
    }

    /// Request an out-of-cycle fetch for `key`, resetting its poll timer.
    ///
    /// If a fetch for the key is already outstanding, this coalesces into
    /// "fetch again once the current one resolves" — never two concurrent
    /// fetches. Unknown keys are ignored.
    pub fn invalidate(&self, key: QueryKey) {
        if let Some(refresh) = self.lock().get(&key) {
            tracing::debug!("cache: invalidate {key}");
            refresh.notify_one();
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Arc<Notify>>> {
        self.refreshers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to one polled query's snapshot stream.
///
/// Dropping the subscription stops further scheduled refreshes for the key.
/// An already-issued fetch is not cancelled; its result is discarded when
/// the driver observes the closed channel.
pub struct Subscription<T> {
    rx: watch::Receiver<QueryState<T>>,
}

impl<T: Clone> Subscription<T> {
    /// The current snapshot state.
    pub fn current(&self) -> QueryState<T> {
        self.rx.borrow().clone()
    }

    /// Wait until the state changes. Returns `false` once the driver has
    /// stopped and no further updates will arrive.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

async fn drive<T, F, Fut>(
    key: QueryKey,
    interval: Option<Duration>,
    fetch: F,
    tx: watch::Sender<QueryState<T>>,
    refresh: Arc<Notify>,
) where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    loop {
        // Stale-while-revalidate: flag the fetch, keep the previous data.
        tx.send_modify(|state| state.loading = true);
        tracing::debug!("cache: fetching {key}");

        match fetch().await {
            Ok(data) => {
                tx.send_modify(|state| {
                    state.data = Some(data);
                    state.error = None;
                    state.loading = false;
                });
            }
            Err(e) => {
                // Keep the last-known-good snapshot; the next scheduled
                // poll doubles as the retry.
                tracing::debug!("cache: fetch {key} error: {e}");
                tx.send_modify(|state| {
                    state.error = Some(e.to_string());
                    state.loading = false;
                });
            }
        }

        if tx.is_closed() {
            break;
        }

        // Sleep until the next poll is due or an invalidate arrives. The
        // sleep is rebuilt each cycle, so an invalidate resets the timer.
        // `Notify` holds at most one pending permit: invalidations that
        // arrived mid-fetch wake this immediately, several of them as one.
        let wait = async {
            match interval {
                Some(d) => {
                    tokio::select! {
                        () = refresh.notified() => {}
                        () = tokio::time::sleep(d) => {}
                    }
                }
                None => refresh.notified().await,
            }
        };
        tokio::select! {
            () = wait => {}
            () = tx.closed() => break,
        }
    }
    tracing::debug!("cache: driver for {key} stopped");
}
