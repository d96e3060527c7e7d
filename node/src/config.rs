//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use strand_types::NetworkId;

use crate::NodeError;

/// Configuration for a strand node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Which network to join.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Data directory for ledger storage.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Maximum concurrent elections.
    #[serde(default = "default_max_elections")]
    pub max_elections: usize,

    /// Maximum blocks parked in the unchecked buffer.
    #[serde(default = "default_unchecked_capacity")]
    pub unchecked_capacity: usize,

    /// Unchecked entries older than this are swept (seconds).
    #[serde(default = "default_unchecked_ttl")]
    pub unchecked_ttl_secs: u64,

    /// Block-processor queue ceiling; the network layer stops accepting
    /// publishes past it.
    #[serde(default = "default_block_queue_capacity")]
    pub block_queue_capacity: usize,

    /// Vote intake ceiling; past it, level-based admission sheds votes
    /// from minor representatives first.
    #[serde(default = "default_vote_queue_capacity")]
    pub vote_queue_capacity: usize,

    /// Cementation batch size per write transaction.
    #[serde(default = "default_cement_batch")]
    pub cement_batch_size: usize,

    /// Election announcement interval in milliseconds.
    #[serde(default = "default_announcement_interval")]
    pub announcement_interval_ms: u64,

    /// Online weight sampling interval in seconds.
    #[serde(default = "default_sample_interval")]
    pub online_sample_interval_secs: u64,

    /// Quorum floor: raw online weight below which nothing confirms.
    #[serde(default = "default_online_minimum")]
    pub online_minimum: u128,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl NodeConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, NodeError> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| NodeError::Config(e.to_string()))
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        toml::from_str("").expect("empty config must deserialize via defaults")
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_network() -> NetworkId {
    NetworkId::Dev
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./strand_data")
}

fn default_max_elections() -> usize {
    5000
}

fn default_unchecked_capacity() -> usize {
    65_536
}

fn default_unchecked_ttl() -> u64 {
    8 * 3600
}

fn default_block_queue_capacity() -> usize {
    8192
}

fn default_vote_queue_capacity() -> usize {
    4096
}

fn default_cement_batch() -> usize {
    256
}

fn default_announcement_interval() -> u64 {
    500
}

fn default_sample_interval() -> u64 {
    300
}

fn default_online_minimum() -> u128 {
    60_000_000
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = NodeConfig::default();
        assert_eq!(config.network, NetworkId::Dev);
        assert!(config.max_elections > 0);
        assert!(config.cement_batch_size > 0);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: NodeConfig = toml::from_str("network = \"live\"").unwrap();
        assert_eq!(config.network, NetworkId::Live);
        assert_eq!(config.block_queue_capacity, default_block_queue_capacity());
    }

    #[test]
    fn from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.toml");
        std::fs::write(&path, "online_minimum = 42\nlog_level = \"debug\"").unwrap();
        let config = NodeConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.online_minimum, 42);
        assert_eq!(config.log_level, "debug");
    }
}
