//! Dashboard configuration: the ordered node list and polling parameters.
//!
//! Configuration is loaded once at startup with the `config` crate from a
//! file (format chosen by extension, JSON by default) layered with
//! `NODEMON_*` environment overrides:
//!
//! ```json
//! {
//!   "interval": "120s",
//!   "timeout": "10s",
//!   "nodes": [
//!     { "name": "node-1", "host": "10.0.0.5", "public_port": 9092, "private_port": 9093 }
//!   ]
//! }
//! ```
//!
//! Node order is significant: it defines the row order of the table.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::duration::parse_duration;

/// Default delay between the end of one polling pass and the start of the next.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(120);

/// Default upper bound for fetching the status of a single node.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_SCHEME: &str = "http";
const DEFAULT_PUBLIC_PORT: u16 = 9092;
const DEFAULT_PRIVATE_PORT: u16 = 9093;

/// Errors that make the configuration unusable. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or did not match the expected shape.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// No nodes were configured.
    #[error("configuration contains no nodes")]
    NoNodes,

    /// A node is missing a required field.
    #[error("node #{index} has an empty `{field}`")]
    EmptyField { index: usize, field: &'static str },

    /// Two nodes share a name.
    #[error("duplicate node name: {0}")]
    DuplicateNode(String),

    /// A duration setting could not be parsed or is zero.
    #[error("invalid `{field}` value {value:?}: {reason}")]
    InvalidDuration {
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// Identity and connection parameters of one monitored node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Display name, unique across the configuration.
    pub name: String,
    /// Hostname or IP address.
    pub host: String,
    /// URL scheme for the node's API gateway.
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Port of the public (node/mesh) API.
    #[serde(default = "default_public_port")]
    pub public_port: u16,
    /// Port of the private (smesher) API.
    #[serde(default = "default_private_port")]
    pub private_port: u16,
}

fn default_scheme() -> String {
    DEFAULT_SCHEME.to_string()
}

fn default_public_port() -> u16 {
    DEFAULT_PUBLIC_PORT
}

fn default_private_port() -> u16 {
    DEFAULT_PRIVATE_PORT
}

impl NodeConfig {
    /// Create a node with default scheme and ports.
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            scheme: default_scheme(),
            public_port: DEFAULT_PUBLIC_PORT,
            private_port: DEFAULT_PRIVATE_PORT,
        }
    }

    /// Base URL of the public API, e.g. `http://10.0.0.5:9092`.
    pub fn public_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.public_port)
    }

    /// Base URL of the private API, e.g. `http://10.0.0.5:9093`.
    pub fn private_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.private_port)
    }
}

/// On-disk shape before validation.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    interval: Option<String>,
    #[serde(default)]
    timeout: Option<String>,
    #[serde(default)]
    nodes: Vec<NodeConfig>,
}

/// Validated dashboard configuration.
///
/// The node list is shared read-only with the polling task and never changes
/// for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub nodes: Arc<[NodeConfig]>,
    pub interval: Duration,
    pub timeout: Duration,
}

impl DashboardConfig {
    /// Load and validate configuration from `path` plus `NODEMON_*` variables.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix("NODEMON"))
            .build()?
            .try_deserialize()?;

        let interval = match raw.interval {
            Some(value) => parse_setting("interval", &value)?,
            None => DEFAULT_INTERVAL,
        };
        let timeout = match raw.timeout {
            Some(value) => parse_setting("timeout", &value)?,
            None => DEFAULT_TIMEOUT,
        };

        Self::new(raw.nodes, interval, timeout)
    }

    /// Build a configuration from an explicit node list.
    pub fn new(
        nodes: Vec<NodeConfig>,
        interval: Duration,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        validate_nodes(&nodes)?;
        check_nonzero("interval", interval)?;
        check_nonzero("timeout", timeout)?;

        Ok(Self {
            nodes: nodes.into(),
            interval,
            timeout,
        })
    }

    /// Override the polling interval (e.g. from the command line).
    pub fn with_interval(mut self, interval: Duration) -> Result<Self, ConfigError> {
        check_nonzero("interval", interval)?;
        self.interval = interval;
        Ok(self)
    }

    /// Override the per-node fetch timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        check_nonzero("timeout", timeout)?;
        self.timeout = timeout;
        Ok(self)
    }
}

/// Parse a duration setting, attributing failures to `field`.
pub fn parse_setting(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let duration = parse_duration(value).map_err(|e| ConfigError::InvalidDuration {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    check_nonzero(field, duration)?;
    Ok(duration)
}

fn check_nonzero(field: &'static str, duration: Duration) -> Result<(), ConfigError> {
    if duration.is_zero() {
        return Err(ConfigError::InvalidDuration {
            field,
            value: format!("{:?}", duration),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

fn validate_nodes(nodes: &[NodeConfig]) -> Result<(), ConfigError> {
    if nodes.is_empty() {
        return Err(ConfigError::NoNodes);
    }

    let mut seen = HashSet::new();
    for (index, node) in nodes.iter().enumerate() {
        if node.name.trim().is_empty() {
            return Err(ConfigError::EmptyField { index, field: "name" });
        }
        if node.host.trim().is_empty() {
            return Err(ConfigError::EmptyField { index, field: "host" });
        }
        if !seen.insert(node.name.as_str()) {
            return Err(ConfigError::DuplicateNode(node.name.clone()));
        }
    }
    Ok(())
}
