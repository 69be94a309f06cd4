use std::path::Path;
use std::sync::Arc;
use voltura_core::event::NullSink;
use voltura_core::policy::SecurityPolicy;
use voltura_core::{Slot, Version};
use voltura_node::config::NodeConfig;
use voltura_node::receiver::Receiver;

fn fast_config(root: &Path) -> NodeConfig {
    let mut cfg = NodeConfig::default();
    cfg.inbound_dir = root.join("inbound");
    cfg.ack_dir = root.join("acks");
    cfg.download_dir = root.join("downloads");
    cfg.agent_record_path = root.join("agent_record.json");
    cfg.oem_content_dir = root.join("updates");
    cfg.malicious_content_dir = root.join("malicious_updates");
    cfg.poll_interval_ms = 5;
    cfg.flash_step_ms = 1;
    cfg.recovery_pause_ms = 5;
    cfg
}

/// Drop one image into the inbound folder, run one receiver step, return
/// the receiver and the ack text.
async fn process_one(filename: &str, resilience: bool, root: &Path) -> (Receiver, String) {
    let cfg = fast_config(root);
    let policy = SecurityPolicy::new(true, resilience);
    let mut receiver = Receiver::new(cfg.clone(), policy, Arc::new(NullSink)).unwrap();

    std::fs::write(cfg.inbound_dir.join(filename), b"image payload").unwrap();
    assert!(receiver.step().await.unwrap());

    // The image is consumed regardless of outcome.
    assert!(!cfg.inbound_dir.join(filename).exists());

    let ack = std::fs::read_to_string(cfg.ack_dir.join(format!("{filename}.ack"))).unwrap();
    (receiver, ack)
}

#[tokio::test]
async fn test_idle_step_processes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = fast_config(tmp.path());
    let mut receiver =
        Receiver::new(cfg, SecurityPolicy::default(), Arc::new(NullSink)).unwrap();
    assert!(!receiver.step().await.unwrap());
}

#[tokio::test]
async fn test_benign_image_commits_to_target_slot() {
    let tmp = tempfile::tempdir().unwrap();
    let (receiver, ack) = process_one("firmware_v1.1.bin", true, tmp.path()).await;

    let bank = receiver.bank();
    assert_eq!(bank.active, Slot::B);
    assert_eq!(bank.slot_b.version, Version::new(1, 1));
    assert!(!bank.slot_b.tainted);
    assert_eq!(bank.slot_a.version, Version::new(1, 0));
    assert_eq!(ack, "SUCCESS");
}

#[tokio::test]
async fn test_benign_image_commits_even_without_resilience() {
    let tmp = tempfile::tempdir().unwrap();
    let (receiver, ack) = process_one("firmware_v1.1.bin", false, tmp.path()).await;

    assert_eq!(receiver.bank().active, Slot::B);
    assert_eq!(ack, "SUCCESS");
}

#[tokio::test]
async fn test_malicious_image_with_resilience_rolls_back() {
    let tmp = tempfile::tempdir().unwrap();
    let (receiver, ack) = process_one("malicious_firmware_v1.2.bin", true, tmp.path()).await;

    let bank = receiver.bank();
    // Prior state preserved exactly: still on A at 1.0.
    assert_eq!(bank.active, Slot::A);
    assert_eq!(bank.slot_a.version, Version::new(1, 0));
    assert!(!bank.slot_a.tainted);
    // Only the target slot gained the bad marker.
    assert_eq!(bank.slot_b.version, Version::new(1, 2));
    assert!(bank.slot_b.tainted);
    assert_eq!(bank.slot_b.to_string(), "1.2 (BAD)");
    assert_eq!(ack, "FAILURE");
}

#[tokio::test]
async fn test_malicious_image_without_resilience_bricks_and_lies() {
    let tmp = tempfile::tempdir().unwrap();
    let (receiver, ack) = process_one("malicious_firmware_v1.2.bin", false, tmp.path()).await;

    let bank = receiver.bank();
    // Committed to the compromised slot, no bad marker, and the ack claims
    // success while the device is actually hung.
    assert_eq!(bank.active, Slot::B);
    assert_eq!(bank.slot_b.version, Version::new(1, 2));
    assert!(!bank.slot_b.tainted);
    assert_eq!(ack, "SUCCESS");
}

#[tokio::test]
async fn test_images_process_strictly_one_at_a_time() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = fast_config(tmp.path());
    let policy = SecurityPolicy::default();
    let mut receiver = Receiver::new(cfg.clone(), policy, Arc::new(NullSink)).unwrap();

    std::fs::write(cfg.inbound_dir.join("firmware_v1.1.bin"), b"first").unwrap();
    assert!(receiver.step().await.unwrap());
    assert_eq!(receiver.bank().active, Slot::B);

    // The second update lands in the now-inactive slot A.
    std::fs::write(cfg.inbound_dir.join("firmware_v1.2.bin"), b"second").unwrap();
    assert!(receiver.step().await.unwrap());

    let bank = receiver.bank();
    assert_eq!(bank.active, Slot::A);
    assert_eq!(bank.slot_a.version, Version::new(1, 2));
    assert_eq!(bank.slot_b.version, Version::new(1, 1));
}

#[tokio::test]
async fn test_resilience_toggle_is_read_per_image() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = fast_config(tmp.path());
    let policy = SecurityPolicy::new(true, true);
    let mut receiver = Receiver::new(cfg.clone(), policy.clone(), Arc::new(NullSink)).unwrap();

    std::fs::write(cfg.inbound_dir.join("malicious_firmware_v1.1.bin"), b"x").unwrap();
    receiver.step().await.unwrap();
    assert_eq!(receiver.bank().active, Slot::A); // rolled back

    // Operator flips the toggle between images; the next image sees it.
    policy.set_resilience(false);
    std::fs::write(cfg.inbound_dir.join("malicious_firmware_v1.2.bin"), b"y").unwrap();
    receiver.step().await.unwrap();
    assert_eq!(receiver.bank().active, Slot::B); // committed to the bad slot
}
