// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Single-slot filesystem mailboxes.
//!
//! The two hand-off channels between agent and receiver are folders used as
//! bounded queues of capacity one: the agent deposits exactly one validated
//! image and must not deposit another until the matching acknowledgment has
//! been consumed. The receiver posts one `<filename>.ack` record per image.
//! The folder is the transport; these types are the channel discipline.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use voltura_core::{AckOutcome, CoreError};

/// Inbound image channel (agent -> receiver).
#[derive(Debug, Clone)]
pub struct ImageMailbox {
    dir: PathBuf,
}

/// One image waiting in the mailbox.
#[derive(Debug)]
pub struct PendingImage {
    pub filename: String,
    pub path: PathBuf,
}

impl PendingImage {
    pub fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }

    /// Remove the image from the mailbox. Consumption is unconditional:
    /// a processed image must never be reprocessed.
    pub fn consume(self) -> io::Result<()> {
        fs::remove_file(&self.path)
    }
}

impl ImageMailbox {
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(ImageMailbox { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_empty(&self) -> io::Result<bool> {
        Ok(self.first_entry()?.is_none())
    }

    /// Move a staged file into the mailbox under `filename`. The rename is
    /// atomic on one filesystem; stage downloads next to the mailbox.
    /// Depositing while an image is still pending is a protocol race and is
    /// refused.
    pub fn deposit(&self, filename: &str, staged: &Path) -> Result<(), CoreError> {
        if !self.is_empty()? {
            return Err(CoreError::MailboxOccupied);
        }
        fs::rename(staged, self.dir.join(filename))?;
        Ok(())
    }

    /// Take the pending image, if any. First entry in name order; the
    /// single-slot discipline means there is normally at most one.
    pub fn take(&self) -> io::Result<Option<PendingImage>> {
        Ok(self.first_entry()?.map(|path| PendingImage {
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path,
        }))
    }

    fn first_entry(&self) -> io::Result<Option<PathBuf>> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        Ok(files.into_iter().next())
    }
}

/// Acknowledgment channel (receiver -> agent).
#[derive(Debug, Clone)]
pub struct AckMailbox {
    dir: PathBuf,
}

impl AckMailbox {
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(AckMailbox { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, filename: &str) -> PathBuf {
        self.dir.join(format!("{filename}.ack"))
    }

    /// Post the outcome for one processed image.
    pub fn post(&self, filename: &str, outcome: AckOutcome) -> io::Result<()> {
        fs::write(self.record_path(filename), outcome.as_str())
    }

    /// Non-blocking probe: consume the record if it is there.
    pub fn try_take(&self, filename: &str) -> io::Result<Option<AckOutcome>> {
        let path = self.record_path(filename);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        fs::remove_file(&path)?;
        // Unreadable content still counts as a delivered record; the agent
        // does not branch on the payload anyway.
        Ok(Some(text.parse().unwrap_or(AckOutcome::Failure)))
    }

    /// Blocking receive with a hard bound: `attempts` polls one `interval`
    /// apart, then `AckTimeout`. Blocks only the calling role's worker.
    pub async fn wait(
        &self,
        filename: &str,
        attempts: u32,
        interval: Duration,
    ) -> Result<AckOutcome, CoreError> {
        for _ in 0..attempts {
            if let Some(outcome) = self.try_take(filename)? {
                return Ok(outcome);
            }
            tokio::time::sleep(interval).await;
        }
        Err(CoreError::AckTimeout { filename: filename.to_string() })
    }
}
