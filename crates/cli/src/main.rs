// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use voltura_cli::commands::{agent, deploy, receiver, source, status};

#[derive(Parser)]
#[command(name = "voltura")]
#[command(about = "Voltura OTA pipeline workers", long_about = None)]
struct Cli {
    /// Path to the shared pipeline configuration.
    #[arg(long, default_value = "voltura.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one distribution source as a worker process.
    Source {
        /// Which inventory this source serves: "oem" or "malicious".
        #[arg(long)]
        identity: String,

        /// Declare someone else's identity on the wire (the adversary runs
        /// with `--spoof-as oem`).
        #[arg(long)]
        spoof_as: Option<String>,
    },
    /// Run the update agent. Reads CHECK commands from stdin unless --once.
    Agent {
        /// Perform a single check cycle and exit.
        #[arg(long)]
        once: bool,
    },
    /// Run the A/B receiver.
    Receiver,
    /// Publish the next-version firmware image into a source's inventory.
    Deploy {
        /// Target inventory: "oem" or "malicious".
        #[arg(long)]
        source: String,
    },
    /// Show the agent record and both source inventories.
    Status,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Source { identity, spoof_as } => source::run(&cli.config, &identity, spoof_as),
        Commands::Agent { once } => agent::run(&cli.config, once),
        Commands::Receiver => receiver::run(&cli.config),
        Commands::Deploy { source } => deploy::run(&cli.config, &source),
        Commands::Status => status::run(&cli.config),
    }
}
