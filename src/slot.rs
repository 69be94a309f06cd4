// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! A/B partition state machine.
//!
//! The receiver owns two firmware slots. Exactly one is active (booted);
//! the other is the target of the next update. An update is flashed to the
//! inactive slot, boot-attested, and only then either committed (the active
//! slot switches) or rolled back (the bank is left as if the update never
//! started, with the failed slot's image marked bad).
//!
//! The outcome table below is the security property of the whole system:
//!
//! | attestation | resilience | active slot | target image | ack       |
//! |-------------|-----------|-------------|--------------|-----------|
//! | clean       | any       | target      | new version  | SUCCESS   |
//! | failed      | on        | unchanged   | new, tainted | FAILURE   |
//! | failed      | off       | target      | new version  | SUCCESS   |
//!
//! The last row is the bricked device: it commits to the compromised slot
//! and still reports success upstream.

use crate::ack::AckOutcome;
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker substring that stands in for a failed boot-time attestation.
pub const MALICIOUS_MARKER: &str = "malicious";

/// Number of simulated write steps when flashing a slot.
pub const FLASH_WRITE_STEPS: u32 = 3;

/// Slot identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    /// Get the other slot.
    pub fn other(&self) -> Slot {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::A => f.write_str("A"),
            Slot::B => f.write_str("B"),
        }
    }
}

/// What one slot currently holds. `tainted` records a rejected flash; the
/// image stays in the slot but is never booted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotImage {
    pub version: Version,
    pub tainted: bool,
}

impl SlotImage {
    pub fn clean(version: Version) -> Self {
        SlotImage { version, tainted: false }
    }

    pub fn empty() -> Self {
        SlotImage { version: Version::ZERO, tainted: false }
    }
}

impl fmt::Display for SlotImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tainted {
            write!(f, "{} (BAD)", self.version)
        } else {
            write!(f, "{}", self.version)
        }
    }
}

/// Boot-attestation result for a flashed image.
///
/// In this model the verdict comes from a marker substring in the filename;
/// a faithful target would derive it from attestation at boot. The trigger
/// condition is part of the observable contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootVerdict {
    Clean,
    AttestationFailed,
}

/// Classify an inbound image by its filename signal.
pub fn classify_image(filename: &str) -> BootVerdict {
    if filename.to_ascii_lowercase().contains(MALICIOUS_MARKER) {
        BootVerdict::AttestationFailed
    } else {
        BootVerdict::Clean
    }
}

/// Decision for one processed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Whether the bank commits the switch to the target slot.
    pub committed: bool,
    /// What gets written into the acknowledgment record.
    pub ack: AckOutcome,
}

/// The outcome table. Resilience only matters when attestation fails:
/// enabled keeps the bank on the known-good slot; disabled commits to the
/// compromised slot and acknowledges success anyway.
pub fn decide(verdict: BootVerdict, resilience_enabled: bool) -> UpdateOutcome {
    match (verdict, resilience_enabled) {
        (BootVerdict::Clean, _) => UpdateOutcome { committed: true, ack: AckOutcome::Success },
        (BootVerdict::AttestationFailed, true) => {
            UpdateOutcome { committed: false, ack: AckOutcome::Failure }
        }
        (BootVerdict::AttestationFailed, false) => {
            UpdateOutcome { committed: true, ack: AckOutcome::Success }
        }
    }
}

/// The receiver's persistent identity: which slot is booted and what each
/// slot holds. A real target keeps this in NVRAM; here it is an owned value
/// mutated only through [`BankState::apply_outcome`], strictly one image at
/// a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankState {
    pub active: Slot,
    pub slot_a: SlotImage,
    pub slot_b: SlotImage,
}

impl BankState {
    pub fn new(active: Slot, slot_a: SlotImage, slot_b: SlotImage) -> Self {
        BankState { active, slot_a, slot_b }
    }

    /// Factory state: booted from A at 1.0, B empty.
    pub fn factory() -> Self {
        BankState {
            active: Slot::A,
            slot_a: SlotImage::clean(Version::new(1, 0)),
            slot_b: SlotImage::empty(),
        }
    }

    pub fn image(&self, slot: Slot) -> &SlotImage {
        match slot {
            Slot::A => &self.slot_a,
            Slot::B => &self.slot_b,
        }
    }

    fn image_mut(&mut self, slot: Slot) -> &mut SlotImage {
        match slot {
            Slot::A => &mut self.slot_a,
            Slot::B => &mut self.slot_b,
        }
    }

    /// The slot the next update is flashed to (the inactive one).
    pub fn target_slot(&self) -> Slot {
        self.active.other()
    }

    pub fn active_image(&self) -> &SlotImage {
        self.image(self.active)
    }

    /// Record the decision for an image flashed to `target`. Called strictly
    /// after classification; flashing and booting have no effect on the bank
    /// until this point, so a rollback leaves the prior state untouched
    /// except for the target slot's tainted image.
    pub fn apply_outcome(&mut self, target: Slot, version: Version, outcome: &UpdateOutcome) {
        *self.image_mut(target) = SlotImage { version, tainted: !outcome.committed };
        if outcome.committed {
            self.active = target;
        }
    }
}

impl Default for BankState {
    fn default() -> Self {
        BankState::factory()
    }
}

/// Post-flash checksum over the written image. The simulated write never
/// corrupts, so verification always passes; the value only feeds the log.
pub fn flash_crc(payload: &[u8]) -> u32 {
    crc32fast::hash(payload)
}
