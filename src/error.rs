// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.
//!
//! Three recoverable failure classes flow through the pipeline: transport
//! failures (a source unreachable, a download aborted), integrity failures
//! (a digest that does not match its declaration), and protocol timeouts
//! (an acknowledgment that never arrives). None of them is fatal; every
//! role recovers to its idle state.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Transport-level failure while talking to a distribution source.
    #[error("network error: {0}")]
    Network(String),

    /// Downloaded bytes do not hash to the declared checksum.
    #[error("checksum mismatch: declared {declared}, computed {computed}")]
    ChecksumMismatch { declared: String, computed: String },

    /// The acknowledgment never arrived within the polling bound.
    #[error("timed out waiting for acknowledgment of '{filename}'")]
    AckTimeout { filename: String },

    /// The inbound mailbox still holds an unconsumed image.
    #[error("inbound mailbox already holds an image")]
    MailboxOccupied,

    /// An offer declared a source identity with no configured endpoint.
    #[error("no URL configured for source '{0}'")]
    NoSourceUrl(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Transient failures abort the current check cycle; they are retried
    /// only by the next externally-triggered check.
    pub fn is_transient(&self) -> bool {
        matches!(self, CoreError::Network(_) | CoreError::Io(_))
    }
}
