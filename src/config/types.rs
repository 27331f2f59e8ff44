use serde::Deserialize;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub polling: PollingConfig,
    pub display: DisplayConfig,
}

// ---------------------------------------------------------------------------
// Engine connection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the engine API, without a trailing slash.
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001/api".to_owned(),
            request_timeout_secs: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Polling cadence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub workflows_interval_secs: u64,
    pub logs_interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        // Integrations have no cadence here: they refresh on demand only.
        Self {
            workflows_interval_secs: 5,
            logs_interval_secs: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Log entries per page.
    pub page_size: usize,
    /// `"relative"` or a strftime pattern.
    pub date_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            date_format: "relative".to_owned(),
        }
    }
}
