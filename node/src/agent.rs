// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Update agent.
//!
//! One check cycle walks the whole client side of the protocol:
//! discover against every configured source (trusted first), select the
//! strictly-highest offer, download from the endpoint the offer's declared
//! identity maps to, optionally verify the digest, hand the image to the
//! receiver's inbound mailbox, then wait out the acknowledgment.
//!
//! The endpoint resolution is the deliberate soft spot: the agent looks up
//! the download URL by the identity the source *claims*, so a spoofed
//! identity routes the download to the spoofing source while the logs show
//! the trusted name.

use crate::config::NodeConfig;
use crate::mailbox::{AckMailbox, ImageMailbox};
use crate::network::SourceClient;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use voltura_core::event::{AgentPhase, EventSink, RoleEvent};
use voltura_core::policy::SecurityPolicy;
use voltura_core::{select_offer, AckOutcome, CoreError, UpdateOffer, Version};

/// The agent's persisted identity: the version it believes it runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentRecord {
    pub current_version: Version,
}

impl AgentRecord {
    pub fn load(path: &Path, initial: Version) -> Result<Self, CoreError> {
        if !path.exists() {
            return Ok(AgentRecord { current_version: initial });
        }
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|e| {
            CoreError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("corrupt agent record: {e}"),
            ))
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_string_pretty(self).map_err(|e| {
            CoreError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
        })?;
        std::fs::write(path, data)?;
        Ok(())
    }
}

/// Result of one externally-triggered check cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Nothing above the current version anywhere.
    NoUpdate,
    /// An image was transferred and acknowledged; the record advanced.
    Updated { version: Version, ack: AckOutcome },
}

/// Commands a coordinator feeds the agent loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentCommand {
    Check,
}

pub struct UpdateAgent {
    config: NodeConfig,
    policy: SecurityPolicy,
    sink: Arc<dyn EventSink>,
    inbound: ImageMailbox,
    acks: AckMailbox,
}

impl UpdateAgent {
    pub fn new(
        config: NodeConfig,
        policy: SecurityPolicy,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, CoreError> {
        let inbound = ImageMailbox::open(&config.inbound_dir)?;
        let acks = AckMailbox::open(&config.ack_dir)?;
        std::fs::create_dir_all(&config.download_dir)?;
        Ok(UpdateAgent { config, policy, sink, inbound, acks })
    }

    pub fn record(&self) -> Result<AgentRecord, CoreError> {
        AgentRecord::load(&self.config.agent_record_path, self.config.initial_version)
    }

    /// One full Idle -> Checking -> ... -> Idle/Success pass. Protocol
    /// failures come back as `Err` and leave the agent idle; they are never
    /// retried within the same cycle.
    pub async fn run_check_cycle(&self) -> Result<CheckOutcome, CoreError> {
        metrics::increment_counter!("voltura_checks_total");
        let mut record = self.record()?;
        let current = record.current_version;

        // Checking
        self.sink.emit(AgentPhase::Checking.event());
        self.sink
            .log(format!("Agent (v{current}) checking for updates..."));

        let mut offers: Vec<UpdateOffer> = Vec::new();
        for identity in &self.config.check_order {
            let Some(url) = self.config.url_for(identity) else { continue };
            if let Some(offer) = SourceClient::new(url.to_string()).check_update().await {
                offers.push(offer);
            }
        }

        let Some(best) = select_offer(current, &offers) else {
            return Ok(CheckOutcome::NoUpdate);
        };
        let best = best.clone();
        self.sink.log(format!("New version found: {}", best.version));

        // Downloading — the endpoint comes from the identity the offer
        // declares, not from where the offer was actually fetched.
        self.sink.emit(AgentPhase::Downloading.event());
        self.sink.emit(RoleEvent::Progress(0.0));

        let url = self
            .config
            .url_for(&best.source)
            .ok_or_else(|| CoreError::NoSourceUrl(best.source.clone()))?;
        let client = SourceClient::new(url.to_string());

        let staged = self.config.download_dir.join(&best.filename);
        let computed = match client
            .download_to(&best.filename, &staged, self.sink.as_ref())
            .await
        {
            Ok(digest) => digest,
            Err(e) => {
                let _ = std::fs::remove_file(&staged);
                return Err(e);
            }
        };
        metrics::increment_counter!("voltura_downloads_total");
        self.sink.log("Download complete.");
        self.sink.emit(RoleEvent::Progress(100.0));

        // Verifying
        self.sink.emit(AgentPhase::Verifying.event());
        self.sink.log("Verifying file integrity...");
        if self.policy.checksum_verification() {
            let declared = best.checksum.clone().unwrap_or_default();
            if computed != declared {
                metrics::increment_counter!("voltura_checksum_failures_total");
                self.sink.log("CHECKSUM MISMATCH! Deleting file.");
                std::fs::remove_file(&staged)?;
                return Err(CoreError::ChecksumMismatch { declared, computed });
            }
            self.sink.log("Checksum match! File is valid.");
        } else {
            self.sink.log("Checksum verification disabled. Skipping.");
        }

        // Transfer
        self.inbound.deposit(&best.filename, &staged)?;
        self.sink
            .log(format!("Transferred '{}' to receiver inbound.", best.filename));

        // AwaitingAck
        self.sink.emit(AgentPhase::AwaitingAck.event());
        self.sink
            .log(format!("Waiting for acknowledgment for {}...", best.filename));
        let ack = self
            .acks
            .wait(&best.filename, self.config.ack_attempts, self.config.poll_interval())
            .await?;
        self.sink.log(format!("ACK received ({ack})."));

        // The record advances on any acknowledgment; the outcome field is
        // not consulted for version bookkeeping.
        record.current_version = best.version;
        record.save(&self.config.agent_record_path)?;

        Ok(CheckOutcome::Updated { version: best.version, ack })
    }
}

/// Command-triggered agent loop. Each cycle runs in its own task so an
/// internal fault surfaces as a crash status and a pause, never as a dead
/// agent.
pub async fn run_agent(agent: Arc<UpdateAgent>, mut commands: mpsc::Receiver<AgentCommand>) {
    agent.sink.emit(AgentPhase::Idle.event());

    while let Some(AgentCommand::Check) = commands.recv().await {
        let worker = agent.clone();
        let result = tokio::spawn(async move { worker.run_check_cycle().await }).await;

        match result {
            Ok(Ok(CheckOutcome::NoUpdate)) => {
                agent.sink.log("No updates available.");
                agent.sink.emit(AgentPhase::Idle.event());
            }
            Ok(Ok(CheckOutcome::Updated { version, ack })) => {
                agent
                    .sink
                    .log(format!("Update successful. Record now at v{version} ({ack})."));
                agent.sink.emit(AgentPhase::Success.event());
            }
            Ok(Err(e)) => {
                agent.sink.log(format!("Update check failed: {e}"));
                agent.sink.emit(AgentPhase::Idle.event());
            }
            Err(fault) => {
                agent.sink.log(format!("AGENT ERROR: {fault}"));
                agent.sink.emit(AgentPhase::Crashed.event());
                tokio::time::sleep(agent.config.recovery_pause()).await;
                agent.sink.emit(AgentPhase::Idle.event());
            }
        }
    }
}
