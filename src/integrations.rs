use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::{self, ApiError, EngineApi};
use crate::orchestrator::MutationOrchestrator;
use crate::tracker::ActionKind;
use crate::types::{AuthType, HealthCheckResult, Integration, IntegrationUpdate};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// `save` was called for an integration with no open form.
    #[error("integration {0} has no open configuration form")]
    NotConfiguring(i64),

    #[error(transparent)]
    Api(#[from] ApiError),
}

// ---------------------------------------------------------------------------
// Flow states
// ---------------------------------------------------------------------------

/// Configure/save flow for one integration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigFlow {
    #[default]
    Idle,
    /// The form is open for editing.
    Configuring { form: IntegrationUpdate },
    /// A save is in flight. On failure the flow returns to `Configuring`
    /// with the submitted form, so nothing typed is lost.
    Saving,
}

/// Health-check flow for one integration.
#[derive(Debug, Clone, Default)]
pub enum HealthFlow {
    #[default]
    Idle,
    Checking,
    /// Latest result, shown until closed or superseded by the next check.
    ResultShown(HealthCheckResult),
}

/// Seed an editable form from the integration's current secrets.
///
/// Which fields the form carries is decided by the server-owned `auth_type`
/// alone; unrecognized types get an empty form.
pub fn seed_form(integration: &Integration) -> IntegrationUpdate {
    let current = |value: &Option<String>| Some(value.clone().unwrap_or_default());
    match integration.auth_type {
        AuthType::ApiKey => IntegrationUpdate {
            api_key: current(&integration.api_key),
            base_url: current(&integration.base_url),
            ..IntegrationUpdate::default()
        },
        AuthType::Oauth => IntegrationUpdate {
            oauth_token: current(&integration.oauth_token),
            oauth_refresh_token: current(&integration.oauth_refresh_token),
            ..IntegrationUpdate::default()
        },
        AuthType::Basic => IntegrationUpdate {
            username: current(&integration.username),
            password: current(&integration.password),
            ..IntegrationUpdate::default()
        },
        AuthType::Webhook => IntegrationUpdate {
            webhook_url: current(&integration.webhook_url),
            ..IntegrationUpdate::default()
        },
        AuthType::None | AuthType::Unknown => IntegrationUpdate::default(),
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Drives the configure/save and health-check/show-result interactions, one
/// independent pair of flows per integration.
///
/// All network calls and busy-flag handling go through the orchestrator, so
/// per-integration controls disable themselves exactly while their own call
/// is in flight.
pub struct IntegrationController {
    api: Arc<EngineApi>,
    orchestrator: Arc<MutationOrchestrator>,
    config_flows: Mutex<HashMap<i64, ConfigFlow>>,
    health_flows: Mutex<HashMap<i64, HealthFlow>>,
}

impl IntegrationController {
    pub fn new(api: Arc<EngineApi>, orchestrator: Arc<MutationOrchestrator>) -> Self {
        Self {
            api,
            orchestrator,
            config_flows: Mutex::new(HashMap::new()),
            health_flows: Mutex::new(HashMap::new()),
        }
    }

    // ---- configure path ----

    /// Open the configuration form, seeded from the integration's current
    /// secret fields. Returns a copy of the seeded form.
    pub fn begin_configure(&self, integration: &Integration) -> IntegrationUpdate {
        let form = seed_form(integration);
        self.lock_config()
            .insert(integration.id, ConfigFlow::Configuring { form: form.clone() });
        form
    }

    /// Replace the open form with the caller's edits. Ignored unless the
    /// flow is in `Configuring`.
    pub fn update_form(&self, id: i64, form: IntegrationUpdate) {
        let mut flows = self.lock_config();
        if let Some(flow @ ConfigFlow::Configuring { .. }) = flows.get_mut(&id) {
            *flow = ConfigFlow::Configuring { form };
        }
    }

    /// Discard the open form.
    pub fn cancel_configure(&self, id: i64) {
        self.lock_config().remove(&id);
    }

    pub fn config_state(&self, id: i64) -> ConfigFlow {
        self.lock_config().get(&id).cloned().unwrap_or_default()
    }

    /// Save the open form. On success the flow returns to idle and the
    /// integrations snapshot is invalidated; on failure the form re-opens
    /// with the submitted values and the error is returned.
    pub async fn save(&self, id: i64) -> Result<Integration, FlowError> {
        let form = {
            let mut flows = self.lock_config();
            match flows.get_mut(&id) {
                Some(flow @ ConfigFlow::Configuring { .. }) => {
                    let ConfigFlow::Configuring { form } =
                        std::mem::replace(flow, ConfigFlow::Saving)
                    else {
                        unreachable!("matched Configuring above");
                    };
                    form
                }
                _ => return Err(FlowError::NotConfiguring(id)),
            }
        };

        let result = self
            .orchestrator
            .perform(
                ActionKind::Configure,
                id,
                api::integrations::update(&self.api, id, &form),
            )
            .await;

        match result {
            Ok(updated) => {
                self.lock_config().remove(&id);
                Ok(updated)
            }
            Err(e) => {
                self.lock_config()
                    .insert(id, ConfigFlow::Configuring { form });
                Err(e.into())
            }
        }
    }

    // ---- health-check path ----

    /// Probe the integration and hold the result for display. A failed call
    /// (transport or engine error) returns the flow to idle; an "unhealthy"
    /// result is still a result and is shown.
    pub async fn check_health(&self, id: i64) -> Result<HealthCheckResult, FlowError> {
        self.lock_health().insert(id, HealthFlow::Checking);

        let result = self
            .orchestrator
            .perform(
                ActionKind::HealthCheck,
                id,
                api::integrations::health_check(&self.api, id),
            )
            .await;

        match result {
            Ok(check) => {
                self.lock_health()
                    .insert(id, HealthFlow::ResultShown(check.clone()));
                Ok(check)
            }
            Err(e) => {
                self.lock_health().remove(&id);
                Err(e.into())
            }
        }
    }

    pub fn health_state(&self, id: i64) -> HealthFlow {
        self.lock_health().get(&id).cloned().unwrap_or_default()
    }

    /// Dismiss the shown result.
    pub fn close_health(&self, id: i64) {
        self.lock_health().remove(&id);
    }

    // ---- private ----

    fn lock_config(&self) -> MutexGuard<'_, HashMap<i64, ConfigFlow>> {
        self.config_flows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_health(&self) -> MutexGuard<'_, HashMap<i64, HealthFlow>> {
        self.health_flows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
