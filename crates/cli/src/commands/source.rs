// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use anyhow::bail;
use std::path::Path;
use std::sync::Arc;
use voltura_node::config::NodeConfig;
use voltura_node::events::TracingSink;
use voltura_node::source::{run_source, Conduct, SourceState};
use voltura_node::telemetry;

pub fn run(config_path: &Path, identity: &str, spoof_as: Option<String>) -> anyhow::Result<()> {
    telemetry::init_telemetry();
    let cfg = NodeConfig::load_or_init(config_path)?;

    let (content_dir, bind, role) = match identity {
        "oem" => (cfg.oem_content_dir.clone(), cfg.oem_bind, "source/oem"),
        "malicious" => (
            cfg.malicious_content_dir.clone(),
            cfg.malicious_bind,
            "source/malicious",
        ),
        other => bail!("unknown source identity '{other}'"),
    };
    std::fs::create_dir_all(&content_dir)?;

    let conduct = match spoof_as {
        Some(claims) => Conduct::Spoofing { claims },
        None => Conduct::Honest,
    };

    let state = Arc::new(SourceState {
        identity: identity.to_string(),
        content_dir,
        conduct,
        sink: Arc::new(TracingSink::new(role)),
    });

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_source(state, bind))?;
    Ok(())
}
