use crate::types::{NewWorkflow, TriggerAck, Workflow};

use super::client::{ApiError, EngineApi};

// ---------------------------------------------------------------------------
// Workflow collection endpoints
// ---------------------------------------------------------------------------

/// Fetch all workflows.
pub async fn list(api: &EngineApi) -> Result<Vec<Workflow>, ApiError> {
    api.get_json("/workflows").await
}

/// Fetch a single workflow.
pub async fn get(api: &EngineApi, id: i64) -> Result<Workflow, ApiError> {
    api.get_json(&format!("/workflows/{id}")).await
}

/// Create a workflow.
pub async fn create(api: &EngineApi, workflow: &NewWorkflow) -> Result<Workflow, ApiError> {
    api.post_json("/workflows", Some(workflow)).await
}

/// Enable or disable a workflow. The engine applies the targeted patch and
/// returns the updated workflow.
pub async fn set_enabled(api: &EngineApi, id: i64, enabled: bool) -> Result<Workflow, ApiError> {
    let payload = serde_json::json!({ "enabled": enabled });
    api.patch_json(&format!("/workflows/{id}"), &payload).await
}

/// Delete a workflow.
pub async fn delete(api: &EngineApi, id: i64) -> Result<(), ApiError> {
    api.delete(&format!("/workflows/{id}")).await
}

/// Run a workflow now, outside its normal trigger.
pub async fn trigger(api: &EngineApi, id: i64) -> Result<TriggerAck, ApiError> {
    api.post_json::<(), _>(&format!("/workflows/{id}/trigger"), None)
        .await
}
