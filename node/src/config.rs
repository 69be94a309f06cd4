// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Node configuration.
//!
//! One JSON document drives all four roles: where the sources keep their
//! inventories, where the hand-off folders live, which base URL each
//! declared source identity maps to, and the polling cadence. Intervals are
//! configurable so tests can run the identical protocol at millisecond
//! scale; attempt counts never change.

use crate::errors::NodeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use voltura_core::policy::SecurityPolicy;
use voltura_core::Version;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Declared source identity -> base URL. The agent resolves download
    /// endpoints through this map using whatever identity an offer claims.
    pub source_urls: BTreeMap<String, String>,
    /// Identities to query during a check, in tie-break order (trusted
    /// source first).
    pub check_order: Vec<String>,

    /// Trusted source inventory.
    pub oem_content_dir: PathBuf,
    /// Adversarial source inventory.
    pub malicious_content_dir: PathBuf,
    /// Receiver's watched inbound folder (agent deposits here).
    pub inbound_dir: PathBuf,
    /// Acknowledgment folder (receiver posts, agent consumes).
    pub ack_dir: PathBuf,
    /// Agent's staging area for in-flight downloads.
    pub download_dir: PathBuf,
    /// Agent's persisted version record.
    pub agent_record_path: PathBuf,

    pub oem_bind: SocketAddr,
    pub malicious_bind: SocketAddr,

    /// One protocol time unit, in milliseconds (ack poll and folder poll).
    pub poll_interval_ms: u64,
    /// Hard bound on ack polling attempts.
    pub ack_attempts: u32,
    /// Delay per simulated flash write step, in milliseconds.
    pub flash_step_ms: u64,
    /// Pause after a role-level fault before the loop resumes.
    pub recovery_pause_ms: u64,

    pub checksum_verification_enabled: bool,
    pub resilience_enabled: bool,

    /// Version the agent starts from when no record exists yet.
    pub initial_version: Version,
}

impl Default for NodeConfig {
    fn default() -> Self {
        let mut source_urls = BTreeMap::new();
        source_urls.insert("oem".to_string(), "http://127.0.0.1:5000".to_string());
        source_urls.insert("malicious".to_string(), "http://127.0.0.1:5001".to_string());
        NodeConfig {
            source_urls,
            check_order: vec!["oem".to_string(), "malicious".to_string()],
            oem_content_dir: PathBuf::from("updates"),
            malicious_content_dir: PathBuf::from("malicious_updates"),
            inbound_dir: PathBuf::from("inbound"),
            ack_dir: PathBuf::from("acks"),
            download_dir: PathBuf::from("downloads"),
            agent_record_path: PathBuf::from("agent_record.json"),
            oem_bind: "127.0.0.1:5000".parse().unwrap(),
            malicious_bind: "127.0.0.1:5001".parse().unwrap(),
            poll_interval_ms: 1000,
            ack_attempts: 30,
            flash_step_ms: 600,
            recovery_pause_ms: 5000,
            checksum_verification_enabled: true,
            resilience_enabled: true,
            initial_version: Version::new(1, 0),
        }
    }
}

impl NodeConfig {
    pub fn load(path: &Path) -> Result<Self, NodeError> {
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|e| NodeError::InvalidInput(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<(), NodeError> {
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| NodeError::InvalidInput(e.to_string()))?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Load `path` if it exists, otherwise write the defaults there first.
    pub fn load_or_init(path: &Path) -> Result<Self, NodeError> {
        if path.exists() {
            NodeConfig::load(path)
        } else {
            let cfg = NodeConfig::default();
            cfg.save(path)?;
            Ok(cfg)
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn flash_step(&self) -> Duration {
        Duration::from_millis(self.flash_step_ms)
    }

    pub fn recovery_pause(&self) -> Duration {
        Duration::from_millis(self.recovery_pause_ms)
    }

    /// Fresh policy handle seeded from the configured flags.
    pub fn policy(&self) -> SecurityPolicy {
        SecurityPolicy::new(self.checksum_verification_enabled, self.resilience_enabled)
    }

    pub fn url_for(&self, source: &str) -> Option<&str> {
        self.source_urls.get(source).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voltura.json");

        let cfg = NodeConfig::load_or_init(&path).unwrap();
        assert!(path.exists());
        let again = NodeConfig::load(&path).unwrap();
        assert_eq!(cfg.check_order, again.check_order);
        assert_eq!(cfg.ack_attempts, 30);
        assert_eq!(again.initial_version, Version::new(1, 0));
    }

    #[test]
    fn test_check_order_puts_trusted_first() {
        let cfg = NodeConfig::default();
        assert_eq!(cfg.check_order[0], "oem");
        assert!(cfg.url_for("oem").is_some());
        assert!(cfg.url_for("unknown").is_none());
    }
}
