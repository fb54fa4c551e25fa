//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What to do when the daemon answers with an `ERROR:` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Log the error and keep the connection open.
    #[default]
    Log,
    /// Drop the connection and reconnect after the retry interval.
    Disconnect,
}

/// Connection settings for [`ReceiverClient`](crate::ReceiverClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Daemon host name or address
    #[serde(default = "default_host")]
    pub host: String,
    /// Daemon TCP port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Delay before retrying a failed connection attempt, in milliseconds
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
    /// How long to wait for the daemon's hello line, in milliseconds
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,
    /// Also ask for the zone 2 power state on connect
    #[serde(default = "default_true")]
    pub query_zone2: bool,
    /// Handling of daemon `ERROR:` responses
    #[serde(default)]
    pub error_policy: ErrorPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            retry_interval_ms: default_retry_interval_ms(),
            handshake_timeout_ms: default_handshake_timeout_ms(),
            query_zone2: true,
            error_policy: ErrorPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Settings for a daemon at `host:port`, everything else default.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port, ..Self::default() }
    }

    /// Delay before retrying a failed connection attempt.
    #[must_use]
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    /// Upper bound on waiting for the hello line.
    #[must_use]
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8701
}

fn default_retry_interval_ms() -> u64 {
    2000
}

fn default_handshake_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}
