//! Daemon configuration with TOML file support.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use anyhow::Context;
use ballot_election::ElectionPolicy;
use ballot_types::Address;
use ballot_utils::LogFormat;
use serde::{Deserialize, Serialize};

/// Configuration for the ballot daemon.
///
/// Loaded from a TOML file via [`DaemonConfig::from_toml_file`]; CLI flags
/// and environment variables override individual fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Identity allowed to register voters, add candidates and change stage.
    #[serde(default = "default_authority")]
    pub authority: Address,

    /// Address the RPC server binds to.
    #[serde(default = "default_bind")]
    pub bind: IpAddr,

    /// RPC port.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Election rules applied when a new election is created.
    #[serde(default)]
    pub policy: ElectionPolicy,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_authority() -> Address {
    Address::new("authority").expect("literal address is valid")
}

fn default_bind() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_rpc_port() -> u16 {
    7077
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn rpc_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.rpc_port)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            authority: default_authority(),
            bind: default_bind(),
            rpc_port: default_rpc_port(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            policy: ElectionPolicy::default(),
        }
    }
}
