// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Operator-controlled security toggles.
//!
//! Two booleans a human can flip while the pipeline runs: whether the agent
//! verifies download digests, and whether the receiver rolls back on a
//! failed boot attestation. Roles read the latest value at the start of
//! each decision point; there is no transactional consistency and none is
//! needed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Flags {
    checksum_verification: AtomicBool,
    resilience: AtomicBool,
}

/// Cheaply cloneable handle shared by every role in one process.
#[derive(Debug, Clone)]
pub struct SecurityPolicy {
    inner: Arc<Flags>,
}

impl SecurityPolicy {
    pub fn new(checksum_verification: bool, resilience: bool) -> Self {
        SecurityPolicy {
            inner: Arc::new(Flags {
                checksum_verification: AtomicBool::new(checksum_verification),
                resilience: AtomicBool::new(resilience),
            }),
        }
    }

    pub fn checksum_verification(&self) -> bool {
        self.inner.checksum_verification.load(Ordering::Relaxed)
    }

    pub fn set_checksum_verification(&self, enabled: bool) {
        self.inner.checksum_verification.store(enabled, Ordering::Relaxed);
    }

    pub fn resilience(&self) -> bool {
        self.inner.resilience.load(Ordering::Relaxed)
    }

    pub fn set_resilience(&self, enabled: bool) {
        self.inner.resilience.store(enabled, Ordering::Relaxed);
    }
}

impl Default for SecurityPolicy {
    /// Both protections on.
    fn default() -> Self {
        SecurityPolicy::new(true, true)
    }
}
