// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use voltura_node::agent::{run_agent, AgentCommand, UpdateAgent};
use voltura_node::config::NodeConfig;
use voltura_node::events::TracingSink;
use voltura_node::telemetry;

pub fn run(config_path: &Path, once: bool) -> anyhow::Result<()> {
    telemetry::init_telemetry();
    let cfg = NodeConfig::load_or_init(config_path)?;
    let policy = cfg.policy();
    let agent = Arc::new(UpdateAgent::new(
        cfg,
        policy.clone(),
        Arc::new(TracingSink::new("agent")),
    )?);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let (tx, rx) = mpsc::channel(8);
        let worker = tokio::spawn(run_agent(agent, rx));

        if once {
            tx.send(AgentCommand::Check).await.ok();
            drop(tx);
            let _ = worker.await;
            return Ok(());
        }

        // Coordinator interface: one CHECK line per requested cycle. The
        // operator toggles live in the config file, so refresh them before
        // every cycle.
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim() != "CHECK" {
                continue;
            }
            if let Ok(latest) = NodeConfig::load(config_path) {
                policy.set_checksum_verification(latest.checksum_verification_enabled);
                policy.set_resilience(latest.resilience_enabled);
            }
            if tx.send(AgentCommand::Check).await.is_err() {
                break;
            }
        }
        drop(tx);
        let _ = worker.await;
        Ok(())
    })
}
