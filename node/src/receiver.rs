// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Receiver worker.
//!
//! Watches the inbound mailbox and runs the A/B flash-boot-verify cycle for
//! each image, strictly one at a time. Flashing and booting are simulated:
//! discrete write steps, a post-write CRC that always passes, then the boot
//! attestation verdict drives the outcome table in `voltura_core::slot`.
//! The bank is only mutated after the verdict is in, so a rollback leaves
//! the persistent state as if the update never started.

use crate::config::NodeConfig;
use crate::mailbox::{AckMailbox, ImageMailbox, PendingImage};
use std::sync::Arc;
use voltura_core::event::{EventSink, ReceiverPhase};
use voltura_core::policy::SecurityPolicy;
use voltura_core::slot::{classify_image, decide, flash_crc, BootVerdict, FLASH_WRITE_STEPS};
use voltura_core::{BankState, CoreError, Version};

pub struct Receiver {
    config: NodeConfig,
    policy: SecurityPolicy,
    sink: Arc<dyn EventSink>,
    inbound: ImageMailbox,
    acks: AckMailbox,
    bank: BankState,
}

impl Receiver {
    pub fn new(
        config: NodeConfig,
        policy: SecurityPolicy,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, CoreError> {
        let inbound = ImageMailbox::open(&config.inbound_dir)?;
        let acks = AckMailbox::open(&config.ack_dir)?;
        Ok(Receiver {
            config,
            policy,
            sink,
            inbound,
            acks,
            bank: BankState::factory(),
        })
    }

    /// Replace the starting bank state (a device that has already taken
    /// updates does not boot from the factory image).
    pub fn with_bank(mut self, bank: BankState) -> Self {
        self.bank = bank;
        self
    }

    pub fn bank(&self) -> &BankState {
        &self.bank
    }

    /// Poll once: process the pending image if there is one. Returns
    /// whether an image was processed.
    pub async fn step(&mut self) -> Result<bool, CoreError> {
        let Some(image) = self.inbound.take()? else {
            return Ok(false);
        };
        self.process(image).await?;
        Ok(true)
    }

    async fn process(&mut self, image: PendingImage) -> Result<(), CoreError> {
        let filename = image.filename.clone();
        let verdict = classify_image(&filename);
        let new_version = Version::from_filename(&filename);
        let current = self.bank.active;
        let target = self.bank.target_slot();

        self.sink.emit(ReceiverPhase::Updating.event());
        self.sink.log("----------------------------------------");
        self.sink.log(format!("New firmware detected: {filename}"));
        self.sink
            .log(format!("Active Slot: {current} | Target Slot: {target}"));

        // Simulated write to the inactive partition.
        self.sink.emit(ReceiverPhase::Flashing(target).event());
        self.sink.log(format!("Writing image to Partition {target}..."));
        for block in 1..=FLASH_WRITE_STEPS {
            self.sink
                .log(format!("[Slot {target}] Writing block {block}/{FLASH_WRITE_STEPS}..."));
            tokio::time::sleep(self.config.flash_step()).await;
        }
        let payload = image.read()?;
        let crc = flash_crc(&payload);
        self.sink
            .log(format!("[Slot {target}] Post-write check passed (crc32 {crc:08x})."));
        metrics::increment_counter!("voltura_flashes_total");

        // Swap-and-boot attempt.
        self.sink.emit(ReceiverPhase::Booting(target).event());
        self.sink
            .log(format!("Swapping active partition to Slot {target}..."));
        tokio::time::sleep(self.config.flash_step()).await;
        self.sink.log(format!("Rebooting into Slot {target}..."));
        tokio::time::sleep(self.config.flash_step()).await;

        // Resilience is read here, at the decision point, so an operator
        // toggle between images takes effect on the next one.
        let resilience = self.policy.resilience();
        let outcome = decide(verdict, resilience);

        match verdict {
            BootVerdict::Clean => {
                self.sink.log(format!(
                    "Boot successful. System running on Slot {target} (v{new_version})."
                ));
                self.sink.emit(ReceiverPhase::Success.event());
            }
            BootVerdict::AttestationFailed => {
                self.sink.emit(ReceiverPhase::Compromised.event());
                self.sink
                    .log("BOOT ERROR: MALICIOUS CODE DETECTED IN STARTUP.");
                if resilience {
                    self.sink.emit(ReceiverPhase::RollingBack.event());
                    self.sink.log("Watchdog: boot failure detected.");
                    self.sink
                        .log(format!("Switching back to known good Slot {current}..."));
                    metrics::increment_counter!("voltura_rollbacks_total");
                } else {
                    self.sink.log("WATCHDOG DISABLED. SYSTEM HANG.");
                    self.sink.log(format!("Stuck on corrupt Slot {target}."));
                    metrics::increment_counter!("voltura_bricks_total");
                }
            }
        }

        // Bank mutation strictly after the verdict.
        self.bank.apply_outcome(target, new_version, &outcome);
        if !outcome.committed {
            self.sink.log(format!(
                "Recovered. Running on Slot {} (v{}).",
                self.bank.active,
                self.bank.active_image()
            ));
        }

        self.acks.post(&filename, outcome.ack)?;
        self.sink.log("----------------------------------------");

        // Consumed regardless of outcome; an image is never reprocessed.
        image.consume()?;

        let bricked = verdict == BootVerdict::AttestationFailed && !resilience;
        if !bricked {
            self.sink
                .emit(ReceiverPhase::SlotActive(self.bank.active).event());
        }
        Ok(())
    }

    /// Receiver loop: announce, then poll forever. Faults pause the worker
    /// and the loop resumes; nothing here terminates the process.
    pub async fn run(mut self) {
        self.sink.emit(ReceiverPhase::Listening.event());
        self.sink.log(format!(
            "[o] Receiver online. Booted from Slot {} (v{}).",
            self.bank.active,
            self.bank.active_image()
        ));

        loop {
            if let Err(e) = self.step().await {
                self.sink.log(format!("RECEIVER CRITICAL ERROR: {e}"));
                self.sink.emit(ReceiverPhase::Crashed.event());
                tokio::time::sleep(self.config.recovery_pause()).await;
                self.sink.emit(ReceiverPhase::Listening.event());
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }
}
