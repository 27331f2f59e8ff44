use crate::types::ExecutionLog;

use super::client::{ApiError, EngineApi};

/// Fetch the execution log stream (most recent first, engine-capped).
pub async fn list(api: &EngineApi) -> Result<Vec<ExecutionLog>, ApiError> {
    api.get_json("/logs").await
}
