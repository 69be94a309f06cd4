// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Distribution source server.
//!
//! Each source answers version-discovery queries over its own content
//! directory and serves the raw payload bytes for download. An honest
//! source hashes what it serves and declares its real identity. A spoofing
//! source declares someone else's identity and fabricates the digest —
//! that conduct is the modeled attack surface and stays exactly as lying
//! as it is.

use crate::api::CheckUpdateResponse;
use crate::errors::NodeError;
use axum::body::Body;
use axum::extract::{Path as AxumPath, State};
use axum::http::header;
use axum::response::Response;
use axum::{routing::get, Json, Router};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use voltura_core::event::{EventSink, SourcePhase};
use voltura_core::version::has_version_token;
use voltura_core::{digest, UpdateOffer, Version};

/// How a source behaves at the protocol boundary.
#[derive(Debug, Clone)]
pub enum Conduct {
    /// Real digest, own identity.
    Honest,
    /// Fabricated digest, someone else's identity (also in the empty
    /// response, to maintain cover).
    Spoofing { claims: String },
}

pub struct SourceState {
    pub identity: String,
    pub content_dir: PathBuf,
    pub conduct: Conduct,
    pub sink: Arc<dyn EventSink>,
}

impl SourceState {
    /// The identity this source puts on the wire.
    pub fn declared_identity(&self) -> &str {
        match &self.conduct {
            Conduct::Honest => &self.identity,
            Conduct::Spoofing { claims } => claims,
        }
    }
}

pub type SharedSource = Arc<SourceState>;

pub fn build_router(state: SharedSource) -> Router {
    Router::new()
        .route("/check-update", get(check_update))
        .route("/download/:filename", get(download))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Highest-version firmware file in `dir`, ties broken by scan order.
/// Files without a version token are ignored.
pub fn scan_latest(dir: &Path) -> io::Result<Option<(String, Version)>> {
    if !dir.exists() {
        return Ok(None);
    }
    let mut latest: Option<(String, Version)> = None;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !has_version_token(&name) {
            continue;
        }
        let version = Version::from_filename(&name);
        match &latest {
            Some((_, best)) if version <= *best => {}
            _ => latest = Some((name, version)),
        }
    }
    Ok(latest)
}

async fn check_update(
    State(state): State<SharedSource>,
) -> Result<Json<CheckUpdateResponse>, NodeError> {
    let declared = state.declared_identity().to_string();
    state
        .sink
        .log(format!("Agent connected. Scanning '{}'...", state.content_dir.display()));
    metrics::increment_counter!("voltura_discovery_requests_total");

    let latest = scan_latest(&state.content_dir)?;
    let Some((filename, version)) = latest else {
        state.sink.log("No update files found.");
        return Ok(Json(CheckUpdateResponse::empty(declared)));
    };

    let checksum = match &state.conduct {
        Conduct::Honest => Some(digest::hash_file(&state.content_dir.join(&filename))?),
        Conduct::Spoofing { .. } => Some(digest::forged()),
    };

    state
        .sink
        .log(format!("Latest version available: {filename} (v{version})"));

    Ok(Json(CheckUpdateResponse::available(UpdateOffer {
        version,
        filename,
        checksum,
        source: declared,
    })))
}

async fn download(
    State(state): State<SharedSource>,
    AxumPath(filename): AxumPath<String>,
) -> Result<Response, NodeError> {
    // The path extractor yields one segment; refuse anything that still
    // looks like traversal.
    if filename.contains("..") || filename.contains('/') {
        return Err(NodeError::InvalidInput("bad filename".into()));
    }

    let path = state.content_dir.join(&filename);
    let file = tokio::fs::File::open(&path).await.map_err(|_| NodeError::NotFound)?;
    let len = file.metadata().await?.len();

    state.sink.log(format!("Serving {filename} to agent..."));

    let stream = ReaderStream::new(file);
    let response = Response::builder()
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, len)
        .body(Body::from_stream(stream))
        .map_err(|_| NodeError::Internal)?;
    Ok(response)
}

async fn metrics_handler() -> String {
    crate::telemetry::get_metrics()
}

/// Serve one source until the process stops. Bind failures surface to the
/// caller; request-level faults are answered, not fatal.
pub async fn run_source(state: SharedSource, addr: std::net::SocketAddr) -> Result<(), NodeError> {
    state.sink.emit(SourcePhase::Running.event());
    state
        .sink
        .log(format!("Source '{}' listening on {addr}.", state.identity));

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| NodeError::Core(voltura_core::CoreError::Network(e.to_string())))?;
    Ok(())
}
