use crate::types::{HealthCheckResult, Integration, IntegrationUpdate};

use super::client::{ApiError, EngineApi};

// ---------------------------------------------------------------------------
// Integration collection endpoints
// ---------------------------------------------------------------------------

/// Fetch all integrations.
pub async fn list(api: &EngineApi) -> Result<Vec<Integration>, ApiError> {
    api.get_json("/integrations").await
}

/// Replace an integration's secret configuration. Only the fields relevant
/// for its auth type are sent; the engine returns the updated integration.
pub async fn update(
    api: &EngineApi,
    id: i64,
    update: &IntegrationUpdate,
) -> Result<Integration, ApiError> {
    api.put_json(&format!("/integrations/{id}"), update).await
}

/// Ask the engine to probe the integrated service's connectivity.
pub async fn health_check(api: &EngineApi, id: i64) -> Result<HealthCheckResult, ApiError> {
    api.post_json::<(), _>(&format!("/integrations/{id}/health"), None)
        .await
}
