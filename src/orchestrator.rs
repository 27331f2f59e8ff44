use std::future::Future;
use std::sync::Arc;

use crate::api::ApiError;
use crate::cache::PollingCache;
use crate::tracker::{ActionKey, ActionKind, ActionStateTracker};

/// Executes side-effecting remote calls with busy-flag scoping and cache
/// invalidation.
///
/// One orchestrator serves every view: it owns the wiring between an action
/// succeeding and the dependent snapshots refreshing, so no call site can
/// forget to refetch. It is confirmation-agnostic — callers gate destructive
/// actions before asking.
pub struct MutationOrchestrator {
    tracker: Arc<ActionStateTracker>,
    cache: Arc<PollingCache>,
}

impl MutationOrchestrator {
    pub fn new(tracker: Arc<ActionStateTracker>, cache: Arc<PollingCache>) -> Self {
        Self { tracker, cache }
    }

    /// The tracker backing this orchestrator, for busy-state queries.
    pub fn tracker(&self) -> &ActionStateTracker {
        &self.tracker
    }

    /// Run `call` as the given action on the given resource.
    ///
    /// The action's busy flag is set for exactly the duration of the call
    /// and released on every exit path, including panics and cancellation.
    /// On success the affected query keys are invalidated; on failure no
    /// cached data changes and the error is returned to the caller intact.
    /// Errors are never retried here — the control becomes interactive
    /// again and the user decides.
    pub async fn perform<T, Fut>(
        &self,
        kind: ActionKind,
        resource_id: i64,
        call: Fut,
    ) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let key = ActionKey::new(kind, resource_id);
        let _busy = BusyGuard::begin(&self.tracker, key);
        tracing::debug!("orchestrator: {kind} #{resource_id} started");

        let result = call.await;

        match &result {
            Ok(_) => {
                tracing::debug!("orchestrator: {kind} #{resource_id} ok");
                for &query in kind.invalidates() {
                    self.cache.invalidate(query);
                }
            }
            Err(e) => {
                tracing::debug!("orchestrator: {kind} #{resource_id} error: {e}");
            }
        }

        result
    }
}

/// Scoped busy flag: `end` runs on drop, so the flag clears exactly once on
/// success, failure, panic, or cancellation of the surrounding future.
struct BusyGuard<'a> {
    tracker: &'a ActionStateTracker,
    key: ActionKey,
}

impl<'a> BusyGuard<'a> {
    fn begin(tracker: &'a ActionStateTracker, key: ActionKey) -> Self {
        tracker.begin(key);
        Self { tracker, key }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.tracker.end(self.key);
    }
}
