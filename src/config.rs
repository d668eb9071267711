//! Router configuration.
//!
//! A `RouterConfig` is built once and never mutated afterwards. Per-call
//! overrides travel on the request itself and are resolved into a
//! [`CallSettings`] snapshot at the start of each call.
//!
//! ```toml
//! mode = "test"
//! port = 8443
//! read_timeout_secs = 30
//! ```

use crate::domain::fields;
use crate::domain::ports::Endpoint;
use crate::domain::request::GatewayRequest;
use crate::error::{GatewayError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const PRODUCTION_HOSTS: [&str; 2] = ["gw-16.paygate.net", "gw-17.paygate.net"];
pub const PRODUCTION_BASE_HOST: &str = "gw.paygate.net";
pub const TEST_HOSTS: [&str; 1] = ["dev-gw.paygate.net"];
pub const TEST_BASE_HOST: &str = "dev-gw.paygate.net";

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    #[default]
    Production,
    Test,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    #[serde(default)]
    pub mode: DeploymentMode,

    /// Replaces the mode's host pool wholesale.
    #[serde(default)]
    pub hosts: Option<Vec<String>>,

    /// DNS name that targeted hosts are derived from.
    #[serde(default)]
    pub base_host: Option<String>,

    #[serde(default = "default_protocol")]
    pub protocol: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            mode: DeploymentMode::default(),
            hosts: None,
            base_host: None,
            protocol: default_protocol(),
            port: default_port(),
            path: default_path(),
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
        }
    }
}

impl RouterConfig {
    pub fn for_mode(mode: DeploymentMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Checks values are usable before any call is made.
    pub fn validate(&self) -> Result<()> {
        if let Some(hosts) = &self.hosts
            && (hosts.is_empty() || hosts.iter().any(|h| h.trim().is_empty()))
        {
            return Err(GatewayError::InvalidConfig(
                "hosts must list at least one non-empty host".to_string(),
            ));
        }
        if self.base_host.as_deref().is_some_and(|h| h.trim().is_empty()) {
            return Err(GatewayError::InvalidConfig(
                "base_host must not be empty".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(GatewayError::InvalidConfig("port must be non-zero".to_string()));
        }
        if !self.path.starts_with('/') {
            return Err(GatewayError::InvalidConfig(
                "path must start with '/'".to_string(),
            ));
        }
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 60 {
            return Err(GatewayError::InvalidConfig(
                "connect_timeout_secs must be between 1 and 60".to_string(),
            ));
        }
        if self.read_timeout_secs == 0 || self.read_timeout_secs > 300 {
            return Err(GatewayError::InvalidConfig(
                "read_timeout_secs must be between 1 and 300".to_string(),
            ));
        }
        Ok(())
    }

    /// Ordered host pool for untargeted calls.
    pub fn host_pool(&self) -> Vec<String> {
        match (&self.hosts, self.mode) {
            (Some(hosts), _) => hosts.clone(),
            (None, DeploymentMode::Production) => {
                PRODUCTION_HOSTS.iter().map(|h| h.to_string()).collect()
            }
            (None, DeploymentMode::Test) => TEST_HOSTS.iter().map(|h| h.to_string()).collect(),
        }
    }

    pub fn base_host(&self) -> &str {
        match (&self.base_host, self.mode) {
            (Some(base), _) => base,
            (None, DeploymentMode::Production) => PRODUCTION_BASE_HOST,
            (None, DeploymentMode::Test) => TEST_BASE_HOST,
        }
    }

    /// Resolves the effective settings for one call.
    ///
    /// Reserved request fields win over configured values. Unparsable
    /// overrides fall back to the configured value.
    pub fn call_settings(&self, request: &GatewayRequest) -> CallSettings {
        let secs = |key: &str, default: u64| {
            request
                .get(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };

        CallSettings {
            server_override: request
                .get(fields::GATEWAY_SERVER)
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_string),
            protocol: request
                .get(fields::GATEWAY_PROTOCOL)
                .unwrap_or(self.protocol.as_str())
                .to_string(),
            port: request
                .get(fields::GATEWAY_PORT)
                .and_then(|v| v.trim().parse::<u16>().ok())
                .filter(|p| *p > 0)
                .unwrap_or(self.port),
            path: request
                .get(fields::GATEWAY_SERVLET)
                .unwrap_or(self.path.as_str())
                .to_string(),
            connect_timeout: Duration::from_secs(secs(
                fields::GATEWAY_CONNECT_TIMEOUT,
                self.connect_timeout_secs,
            )),
            read_timeout: Duration::from_secs(secs(
                fields::GATEWAY_READ_TIMEOUT,
                self.read_timeout_secs,
            )),
        }
    }
}

/// Connection settings frozen for the duration of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSettings {
    pub server_override: Option<String>,
    pub protocol: String,
    pub port: u16,
    pub path: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl CallSettings {
    pub fn endpoint(&self, host: &str) -> Endpoint {
        Endpoint {
            protocol: self.protocol.clone(),
            host: host.to_string(),
            port: self.port,
            path: self.path.clone(),
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
        }
    }
}

fn default_protocol() -> String {
    "https".to_string()
}

fn default_port() -> u16 {
    443
}

fn default_path() -> String {
    "/gateway/servlet/ServiceDispatcherAccess".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_read_timeout_secs() -> u64 {
    90
}
