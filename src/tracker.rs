use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::cache::QueryKey;

// ---------------------------------------------------------------------------
// Action keys
// ---------------------------------------------------------------------------

/// Category of a user-triggered mutation. Scopes both busy-state and the
/// cache invalidation that follows a successful call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Toggle,
    Delete,
    Trigger,
    Configure,
    HealthCheck,
}

impl ActionKind {
    /// Query keys whose snapshots a successful action of this kind affects.
    pub(crate) fn invalidates(self) -> &'static [QueryKey] {
        match self {
            Self::Toggle | Self::Delete => &[QueryKey::Workflows],
            Self::Trigger => &[QueryKey::Workflows, QueryKey::Logs],
            Self::Configure => &[QueryKey::Integrations],
            // Health results are transient; no snapshot changes.
            Self::HealthCheck => &[],
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Toggle => "toggle",
            Self::Delete => "delete",
            Self::Trigger => "trigger",
            Self::Configure => "configure",
            Self::HealthCheck => "health_check",
        };
        f.write_str(s)
    }
}

/// Identifies one in-flight action: which kind, on which resource.
///
/// Structurally comparable — two keys built independently for the same
/// (kind, id) pair are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionKey {
    pub kind: ActionKind,
    pub resource_id: i64,
}

impl ActionKey {
    pub fn new(kind: ActionKind, resource_id: i64) -> Self {
        Self { kind, resource_id }
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Tracks which (action, resource) pairs currently have a call in flight.
///
/// Keying per pair is the point: the delete button for workflow #7 goes
/// inert while every other control stays interactive. Entries are ephemeral
/// and never persisted. All methods are infallible — a poisoned lock is
/// recovered, never propagated.
#[derive(Debug, Default)]
pub struct ActionStateTracker {
    busy: Mutex<HashSet<ActionKey>>,
}

impl ActionStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the key busy. Idempotent if already busy.
    pub fn begin(&self, key: ActionKey) {
        self.lock().insert(key);
    }

    /// Clear the key's busy flag.
    pub fn end(&self, key: ActionKey) {
        self.lock().remove(&key);
    }

    pub fn is_busy(&self, key: ActionKey) -> bool {
        self.lock().contains(&key)
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<ActionKey>> {
        self.busy.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
