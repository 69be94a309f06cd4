// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize telemetry (logs + metrics)
pub fn init_telemetry() {
    // 1. Initialize Tracing (Logs)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "voltura_node=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Initialize Metrics (Prometheus)
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // Store handle for /metrics endpoint
    if PROM_HANDLE.set(handle).is_err() {
        tracing::warn!("Prometheus handle already set. Telemetry re-initialized?");
    }

    metrics::describe_counter!(
        "voltura_discovery_requests_total",
        "Discovery queries answered by a source"
    );
    metrics::describe_counter!(
        "voltura_checks_total",
        "Update checks performed by the agent"
    );
    metrics::describe_counter!(
        "voltura_downloads_total",
        "Firmware payloads downloaded by the agent"
    );
    metrics::describe_counter!(
        "voltura_checksum_failures_total",
        "Downloads discarded for digest mismatch"
    );
    metrics::describe_counter!(
        "voltura_flashes_total",
        "Images flashed by the receiver"
    );
    metrics::describe_counter!(
        "voltura_rollbacks_total",
        "Boot failures recovered by slot rollback"
    );
    metrics::describe_counter!(
        "voltura_bricks_total",
        "Compromised commits with resilience disabled"
    );

    // Ensure at least one metric exists on startup
    metrics::gauge!("voltura_node_up", 1.0);
}

/// Get the Prometheus handle to render metrics
pub fn get_metrics() -> String {
    if let Some(handle) = PROM_HANDLE.get() {
        handle.render()
    } else {
        "# metrics not initialized".to_string()
    }
}
