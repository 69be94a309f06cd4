// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use chrono::{DateTime, Local};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use std::path::Path;
use voltura_core::Version;
use voltura_node::agent::AgentRecord;
use voltura_node::config::NodeConfig;

pub fn run(config_path: &Path) -> anyhow::Result<()> {
    let cfg = NodeConfig::load_or_init(config_path)?;
    let record = AgentRecord::load(&cfg.agent_record_path, cfg.initial_version)?;

    println!("\nVoltura Pipeline Status");
    println!("-----------------------");
    println!("Agent record: v{}", record.current_version);
    println!(
        "Checksum verification: {} | Resilience: {}",
        on_off(cfg.checksum_verification_enabled),
        on_off(cfg.resilience_enabled)
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Inventory", "File", "Version", "Modified"]);

    for (label, dir) in [
        ("oem", &cfg.oem_content_dir),
        ("malicious", &cfg.malicious_content_dir),
    ] {
        let mut rows = 0;
        if dir.exists() {
            let mut names: Vec<String> = std::fs::read_dir(dir)?
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_file())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            for name in names {
                let version = Version::from_filename(&name);
                let modified = std::fs::metadata(dir.join(&name))
                    .and_then(|m| m.modified())
                    .map(|t| {
                        let local: DateTime<Local> = t.into();
                        local.format("%Y-%m-%d %H:%M:%S").to_string()
                    })
                    .unwrap_or_default();
                table.add_row(vec![label.to_string(), name, format!("v{version}"), modified]);
                rows += 1;
            }
        }
        if rows == 0 {
            table.add_row(vec![label, "(empty)", "", ""]);
        }
    }

    println!("{table}");
    println!(
        "Inbound pending: {} | Acks pending: {}",
        count_files(&cfg.inbound_dir),
        count_files(&cfg.ack_dir)
    );
    Ok(())
}

fn on_off(v: bool) -> &'static str {
    if v {
        "ON"
    } else {
        "OFF"
    }
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|rd| rd.filter_map(|e| e.ok()).filter(|e| e.path().is_file()).count())
        .unwrap_or(0)
}
