// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::path::Path;
use std::sync::Arc;
use voltura_node::config::NodeConfig;
use voltura_node::events::TracingSink;
use voltura_node::receiver::Receiver;
use voltura_node::telemetry;

pub fn run(config_path: &Path) -> anyhow::Result<()> {
    telemetry::init_telemetry();
    let cfg = NodeConfig::load_or_init(config_path)?;
    let policy = cfg.policy();
    let receiver = Receiver::new(
        cfg.clone(),
        policy.clone(),
        Arc::new(TracingSink::new("receiver")),
    )?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        // The resilience toggle lives in the config file; pick up edits
        // between images.
        let refresh_policy = policy.clone();
        let path = config_path.to_path_buf();
        let interval = cfg.poll_interval();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if let Ok(latest) = NodeConfig::load(&path) {
                    refresh_policy.set_checksum_verification(latest.checksum_verification_enabled);
                    refresh_policy.set_resilience(latest.resilience_enabled);
                }
            }
        });

        receiver.run().await;
        Ok(())
    })
}
