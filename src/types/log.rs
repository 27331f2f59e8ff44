use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::workflow::ExecStatus;

/// One execution record, append-only from the client's perspective.
///
/// `completed_at` is `None` while the execution is still running (or when
/// the engine never recorded a completion time).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLog {
    pub id: i64,
    /// Owning workflow. A foreign reference, not ownership — deleting the
    /// workflow does not retract its logs.
    pub workflow_id: i64,
    pub status: ExecStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}
