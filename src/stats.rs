use crate::types::{ExecStatus, ExecutionLog, Workflow};

/// Headline numbers derived from the workflows and logs snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_workflows: usize,
    pub active_workflows: usize,
    pub total_executions: usize,
    /// Percent of logged executions that succeeded; 0 when there are none.
    pub success_rate: f64,
}

/// Summarize the current snapshots. Pure — recomputed on every render.
pub fn summarize(workflows: &[Workflow], logs: &[ExecutionLog]) -> DashboardStats {
    let succeeded = logs
        .iter()
        .filter(|log| log.status == ExecStatus::Success)
        .count();
    let success_rate = if logs.is_empty() {
        0.0
    } else {
        succeeded as f64 / logs.len() as f64 * 100.0
    };

    DashboardStats {
        total_workflows: workflows.len(),
        active_workflows: workflows.iter().filter(|w| w.enabled).count(),
        total_executions: logs.len(),
        success_rate,
    }
}
