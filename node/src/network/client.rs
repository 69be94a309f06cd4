use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use voltura_core::digest::StreamingDigest;
use voltura_core::event::{EventSink, RoleEvent};
use voltura_core::{CoreError, UpdateOffer};

use crate::api::CheckUpdateResponse;

/// Discovery timeout. A source that answers slower than this is treated as
/// absent, not as an error.
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct SourceClient {
    base_url: String,
    client: reqwest::Client,
}

impl SourceClient {
    pub fn new(url: String) -> Self {
        Self {
            base_url: url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query one source for its best offer. Every failure mode — source
    /// down, non-2xx, malformed body — collapses to `None`: an unreachable
    /// source is simply "no offer" and never halts a check.
    pub async fn check_update(&self) -> Option<UpdateOffer> {
        let url = format!("{}/check-update", self.base_url);
        let resp = self
            .client
            .get(&url)
            .timeout(DISCOVERY_TIMEOUT)
            .send()
            .await
            .ok()?
            .error_for_status()
            .ok()?;
        let body: CheckUpdateResponse = resp.json().await.ok()?;
        body.into_offer()
    }

    /// Stream a payload into `dest`, hashing as it arrives. Emits progress
    /// as a percentage of the declared content length (display only, no
    /// protocol meaning). Returns the computed digest of what was written.
    pub async fn download_to(
        &self,
        filename: &str,
        dest: &Path,
        sink: &dyn EventSink,
    ) -> Result<String, CoreError> {
        let url = format!("{}/download/{}", self.base_url, filename);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CoreError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CoreError::Network(format!(
                "download of '{filename}' failed: {}",
                resp.status()
            )));
        }

        let total = resp.content_length().unwrap_or(0);
        let mut file = tokio::fs::File::create(dest).await?;
        let mut hasher = StreamingDigest::new();
        let mut received: u64 = 0;

        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| CoreError::Network(e.to_string()))?;
            file.write_all(&chunk).await?;
            hasher.update(&chunk);
            received += chunk.len() as u64;
            if total > 0 {
                sink.emit(RoleEvent::Progress((received as f32 / total as f32) * 100.0));
            }
        }
        file.flush().await?;

        Ok(hasher.finalize())
    }
}
