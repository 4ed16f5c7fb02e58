use std::time::Duration;

use onchat_core::error::{OnchatError, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    #[serde(default)]
    pub connection: ConnectionSection,

    #[serde(default)]
    pub requests: RequestSection,

    #[serde(default)]
    pub account: Option<AccountSection>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: 1,
            connection: ConnectionSection::default(),
            requests: RequestSection::default(),
            account: None,
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(OnchatError::BadRequest(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.connection.validate()?;
        self.requests.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionSection {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_reconnect")]
    pub reconnect: bool,

    #[serde(default = "default_reconnect_min_delay_ms")]
    pub reconnect_min_delay_ms: u64,

    #[serde(default = "default_reconnect_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,

    #[serde(default = "default_reconnect_jitter")]
    pub reconnect_jitter: f64,

    /// `None` retries forever.
    #[serde(default)]
    pub reconnect_max_attempts: Option<u32>,
}

impl Default for ConnectionSection {
    fn default() -> Self {
        Self {
            url: default_url(),
            reconnect: default_reconnect(),
            reconnect_min_delay_ms: default_reconnect_min_delay_ms(),
            reconnect_max_delay_ms: default_reconnect_max_delay_ms(),
            reconnect_jitter: default_reconnect_jitter(),
            reconnect_max_attempts: None,
        }
    }
}

impl ConnectionSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(OnchatError::BadRequest(
                "connection.url must start with ws:// or wss://".into(),
            ));
        }
        if !(1..=60_000).contains(&self.reconnect_min_delay_ms) {
            return Err(OnchatError::BadRequest(
                "connection.reconnect_min_delay_ms must be between 1 and 60000".into(),
            ));
        }
        if !(self.reconnect_min_delay_ms..=600_000).contains(&self.reconnect_max_delay_ms) {
            return Err(OnchatError::BadRequest(
                "connection.reconnect_max_delay_ms must be between reconnect_min_delay_ms and 600000"
                    .into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.reconnect_jitter) {
            return Err(OnchatError::BadRequest(
                "connection.reconnect_jitter must be between 0.0 and 1.0".into(),
            ));
        }
        Ok(())
    }
}

fn default_url() -> String {
    "wss://chat.longapp.site/chat/chat".into()
}
fn default_reconnect() -> bool {
    true
}
fn default_reconnect_min_delay_ms() -> u64 {
    500
}
fn default_reconnect_max_delay_ms() -> u64 {
    8000
}
fn default_reconnect_jitter() -> f64 {
    0.25
}

/// Per-call reply budgets.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestSection {
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub login_timeout_ms: u64,
    #[serde(default = "default_join_timeout_ms")]
    pub join_timeout_ms: u64,
    #[serde(default = "default_history_timeout_ms")]
    pub history_timeout_ms: u64,
    #[serde(default = "default_presence_timeout_ms")]
    pub presence_timeout_ms: u64,
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,
}

impl Default for RequestSection {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
            login_timeout_ms: default_timeout_ms(),
            join_timeout_ms: default_join_timeout_ms(),
            history_timeout_ms: default_history_timeout_ms(),
            presence_timeout_ms: default_presence_timeout_ms(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
        }
    }
}

impl RequestSection {
    pub fn validate(&self) -> Result<()> {
        let all = [
            ("default_timeout_ms", self.default_timeout_ms),
            ("login_timeout_ms", self.login_timeout_ms),
            ("join_timeout_ms", self.join_timeout_ms),
            ("history_timeout_ms", self.history_timeout_ms),
            ("presence_timeout_ms", self.presence_timeout_ms),
            ("lookup_timeout_ms", self.lookup_timeout_ms),
        ];
        for (name, ms) in all {
            if !(1..=120_000).contains(&ms) {
                return Err(OnchatError::BadRequest(format!(
                    "requests.{name} must be between 1 and 120000"
                )));
            }
        }
        Ok(())
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
    pub fn login_timeout(&self) -> Duration {
        Duration::from_millis(self.login_timeout_ms)
    }
    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }
    pub fn history_timeout(&self) -> Duration {
        Duration::from_millis(self.history_timeout_ms)
    }
    pub fn presence_timeout(&self) -> Duration {
        Duration::from_millis(self.presence_timeout_ms)
    }
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}
fn default_join_timeout_ms() -> u64 {
    6000
}
fn default_history_timeout_ms() -> u64 {
    8000
}
fn default_presence_timeout_ms() -> u64 {
    6000
}
fn default_lookup_timeout_ms() -> u64 {
    8000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountSection {
    pub user: String,
    pub pass: String,
}
