//! Board configuration types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level board configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// OnLocation API key used for the `Authorization: APIKEY <key>` header.
    #[serde(default)]
    pub api_key: String,

    /// Upstream API base URL (the `/staff` path is appended per request).
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Enable the debug control routes (`/debug/*`).
    #[serde(default)]
    pub debug: bool,

    /// HTTP server parameters.
    #[serde(default)]
    pub server: ServerConfig,

    /// Timing parameters (seconds).
    #[serde(default)]
    pub timing: TimingConfig,

    /// Business-hours schedule.
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// HTTP server parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

/// Timing configuration (all values in seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Sleep between poll cycles.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Max age of the last successful poll before data is considered stale.
    #[serde(default = "default_stale_threshold")]
    pub stale_threshold_secs: u64,

    /// Per-request timeout for the upstream fetch.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

/// Business-hours table keyed by weekday.
///
/// Keys are three-letter weekday names (`mon`..`sun`); each value is an
/// `[open_hour, close_hour]` pair interpreted as a half-open local-time
/// window. A weekday with no entry is closed all day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Fixed UTC offset of the office's local timezone, in hours.
    #[serde(default)]
    pub utc_offset_hours: i32,

    /// Weekday → `[open_hour, close_hour]`.
    #[serde(default = "default_hours")]
    pub hours: BTreeMap<String, [u32; 2]>,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_api_base_url() -> String {
    "https://api.whosonlocation.com/v1".into()
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".into()
}

fn default_poll_interval() -> u64 {
    10
}

fn default_stale_threshold() -> u64 {
    120
}

fn default_fetch_timeout() -> u64 {
    15
}

fn default_hours() -> BTreeMap<String, [u32; 2]> {
    let mut hours = BTreeMap::new();
    for day in ["mon", "tue", "wed", "thu", "fri"] {
        hours.insert(day.to_string(), [5, 21]);
    }
    hours.insert("sat".to_string(), [5, 13]);
    hours
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            stale_threshold_secs: default_stale_threshold(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 0,
            hours: default_hours(),
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: default_api_base_url(),
            debug: false,
            server: ServerConfig::default(),
            timing: TimingConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}
