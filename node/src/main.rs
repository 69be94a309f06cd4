// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Single-process simulation: both sources, the receiver, and the agent as
//! independent tasks sharing nothing but the two hand-off channels and the
//! operator policy toggles. Type `CHECK` on stdin to trigger a cycle;
//! `CHECKSUM ON|OFF` and `RESILIENCE ON|OFF` flip the toggles live.

use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use voltura_core::event::RoleEvent;
use voltura_node::agent::{run_agent, AgentCommand, UpdateAgent};
use voltura_node::config::NodeConfig;
use voltura_node::events::role_sink;
use voltura_node::receiver::Receiver;
use voltura_node::source::{run_source, scan_latest, Conduct, SourceState};
use voltura_node::telemetry;

#[tokio::main]
async fn main() {
    telemetry::init_telemetry();

    let cfg = NodeConfig::load_or_init(Path::new("voltura.json")).expect("load config");
    tracing::info!("Initializing Voltura simulation with config: {:?}", cfg);

    std::fs::create_dir_all(&cfg.oem_content_dir).expect("create oem inventory");
    std::fs::create_dir_all(&cfg.malicious_content_dir).expect("create adversary inventory");

    // First run: give the trusted source something to offer.
    if scan_latest(&cfg.oem_content_dir).expect("scan oem inventory").is_none() {
        std::fs::write(
            cfg.oem_content_dir.join("firmware_v1.1.bin"),
            b"Initial legitimate firmware v1.1.",
        )
        .expect("seed firmware");
        tracing::info!("Seeded 'firmware_v1.1.bin' into the OEM inventory.");
    }

    let policy = cfg.policy();
    let (events_tx, events_rx) = broadcast::channel(256);

    // Trusted source.
    let oem = Arc::new(SourceState {
        identity: "oem".to_string(),
        content_dir: cfg.oem_content_dir.clone(),
        conduct: Conduct::Honest,
        sink: role_sink("source/oem", events_tx.clone()),
    });
    let oem_bind = cfg.oem_bind;
    tokio::spawn(async move {
        if let Err(e) = run_source(oem, oem_bind).await {
            tracing::error!("oem source worker exited: {e}");
        }
    });

    // Adversarial source, claiming the trusted identity.
    let adversary = Arc::new(SourceState {
        identity: "malicious".to_string(),
        content_dir: cfg.malicious_content_dir.clone(),
        conduct: Conduct::Spoofing { claims: "oem".to_string() },
        sink: role_sink("source/malicious", events_tx.clone()),
    });
    let malicious_bind = cfg.malicious_bind;
    tokio::spawn(async move {
        if let Err(e) = run_source(adversary, malicious_bind).await {
            tracing::error!("malicious source worker exited: {e}");
        }
    });

    // Receiver.
    let receiver = Receiver::new(
        cfg.clone(),
        policy.clone(),
        role_sink("receiver", events_tx.clone()),
    )
    .expect("receiver setup");
    tokio::spawn(receiver.run());

    // Agent, command-triggered.
    let agent = Arc::new(
        UpdateAgent::new(cfg.clone(), policy.clone(), role_sink("agent", events_tx.clone()))
            .expect("agent setup"),
    );
    let (cmd_tx, cmd_rx) = mpsc::channel(8);
    tokio::spawn(run_agent(agent, cmd_rx));

    // Minimal embedded coordinator: surface status transitions.
    tokio::spawn(async move {
        let mut stream = BroadcastStream::new(events_rx);
        while let Some(item) = stream.next().await {
            if let Ok((role, event @ RoleEvent::Status { .. })) = item {
                println!("{role}: {event}");
            }
        }
    });

    println!("Simulation ready. Commands: CHECK | CHECKSUM ON|OFF | RESILIENCE ON|OFF");
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match line.trim() {
            "" => {}
            "CHECK" => {
                if cmd_tx.send(AgentCommand::Check).await.is_err() {
                    tracing::error!("agent loop is gone");
                    break;
                }
            }
            "CHECKSUM ON" => policy.set_checksum_verification(true),
            "CHECKSUM OFF" => policy.set_checksum_verification(false),
            "RESILIENCE ON" => policy.set_resilience(true),
            "RESILIENCE OFF" => policy.set_resilience(false),
            other => tracing::warn!("unknown command: {other}"),
        }
    }
}
