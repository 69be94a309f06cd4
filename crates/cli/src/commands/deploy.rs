// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use anyhow::bail;
use std::io;
use std::path::Path;
use voltura_core::Version;
use voltura_node::config::NodeConfig;
use voltura_node::source::scan_latest;

/// One minor release above everything already published anywhere. Both
/// inventories count: the adversary numbers its payloads to outrank the
/// trusted source.
pub fn next_release(dirs: &[&Path]) -> io::Result<Version> {
    let mut latest = Version::ZERO;
    for dir in dirs {
        if let Some((_, version)) = scan_latest(dir)? {
            latest = latest.max(version);
        }
    }
    Ok(latest.next_minor())
}

pub fn run(config_path: &Path, source: &str) -> anyhow::Result<()> {
    let cfg = NodeConfig::load_or_init(config_path)?;

    let (dir, prefix, label) = match source {
        "oem" => (cfg.oem_content_dir.clone(), "firmware", "Firmware"),
        "malicious" => (
            cfg.malicious_content_dir.clone(),
            "malicious_firmware",
            "Tampered firmware",
        ),
        other => bail!("unknown source identity '{other}'"),
    };

    let version = next_release(&[
        cfg.oem_content_dir.as_path(),
        cfg.malicious_content_dir.as_path(),
    ])?;
    let filename = format!("{prefix}_v{version}.bin");

    std::fs::create_dir_all(&dir)?;
    let stamp = chrono::Utc::now().to_rfc3339();
    let payload = format!("{label} build v{version} ({stamp})\n");
    std::fs::write(dir.join(&filename), payload)?;

    println!("Deployed '{filename}' to {}", dir.display());
    Ok(())
}
