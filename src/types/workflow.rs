use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Workflow-specific enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    Schedule,
    Manual,
    Webhook,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Schedule => "schedule",
            Self::Manual => "manual",
            Self::Webhook => "webhook",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Outcome of a workflow execution. `Unknown` covers workflows that have
/// never run as well as status strings added by newer engine versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecStatus {
    Success,
    Failed,
    #[serde(other)]
    #[default]
    Unknown,
}

impl fmt::Display for ExecStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Workflow domain type
// ---------------------------------------------------------------------------

/// A workflow as owned by the remote engine.
///
/// The client only ever holds a snapshot of this; any divergence from the
/// server is resolved by full replacement on the next fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub enabled: bool,
    pub trigger_type: TriggerType,
    /// Status of the most recent execution.
    #[serde(default)]
    pub last_status: ExecStatus,
    #[serde(default)]
    pub execution_count: u64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for `POST /workflows`.
#[derive(Debug, Clone, Serialize)]
pub struct NewWorkflow {
    pub name: String,
    pub description: String,
    pub trigger_type: TriggerType,
    pub enabled: bool,
}

/// Acknowledgment returned by `POST /workflows/{id}/trigger`.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerAck {
    pub status: String,
    pub message: String,
}
