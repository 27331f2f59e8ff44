use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Integration-specific enums
// ---------------------------------------------------------------------------

/// How the engine authenticates against the integrated service.
///
/// Authoritative from the server — the client never derives this locally.
/// It determines which secret fields are relevant when configuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    ApiKey,
    Oauth,
    Basic,
    Webhook,
    #[default]
    None,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ApiKey => "api_key",
            Self::Oauth => "oauth",
            Self::Basic => "basic",
            Self::Webhook => "webhook",
            Self::None => "none",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

// ---------------------------------------------------------------------------
// Integration domain type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Integration {
    pub id: i64,
    /// Stable slug, e.g. `"slack"` or `"google_sheets"`.
    pub service_name: String,
    #[serde(default)]
    pub auth_type: AuthType,
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub oauth_token: Option<String>,
    #[serde(default)]
    pub oauth_refresh_token: Option<String>,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for `PUT /integrations/{id}`.
///
/// Only the fields relevant for the integration's `auth_type` are set;
/// `None` fields are omitted from the wire body entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

/// Result of `POST /integrations/{id}/health`.
///
/// Transient — held only long enough to show a result, superseded by the
/// next check for the same integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    #[serde(default)]
    pub message: Option<String>,
    /// Opaque structured payload from the engine, rendered verbatim.
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl HealthCheckResult {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}
