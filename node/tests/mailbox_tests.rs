use std::time::Duration;
use voltura_core::{AckOutcome, CoreError};
use voltura_node::mailbox::{AckMailbox, ImageMailbox};

#[test]
fn test_single_slot_discipline() {
    let tmp = tempfile::tempdir().unwrap();
    let staging = tmp.path().join("staging");
    std::fs::create_dir_all(&staging).unwrap();
    let mailbox = ImageMailbox::open(tmp.path().join("inbound")).unwrap();

    // 1. First deposit goes through
    let first = staging.join("firmware_v1.1.bin");
    std::fs::write(&first, b"one").unwrap();
    mailbox.deposit("firmware_v1.1.bin", &first).unwrap();
    assert!(!mailbox.is_empty().unwrap());
    assert!(!first.exists()); // moved, not copied

    // 2. Second deposit is refused while the first is unconsumed
    let second = staging.join("firmware_v1.2.bin");
    std::fs::write(&second, b"two").unwrap();
    let err = mailbox.deposit("firmware_v1.2.bin", &second).unwrap_err();
    assert!(matches!(err, CoreError::MailboxOccupied));
    assert!(second.exists()); // a refused deposit leaves the staged file alone

    // 3. Consume, then the slot frees up
    let pending = mailbox.take().unwrap().unwrap();
    assert_eq!(pending.filename, "firmware_v1.1.bin");
    assert_eq!(pending.read().unwrap(), b"one");
    pending.consume().unwrap();
    assert!(mailbox.is_empty().unwrap());

    mailbox.deposit("firmware_v1.2.bin", &second).unwrap();
}

#[test]
fn test_ack_record_is_literal_text() {
    let tmp = tempfile::tempdir().unwrap();
    let acks = AckMailbox::open(tmp.path().join("acks")).unwrap();

    acks.post("firmware_v1.1.bin", AckOutcome::Success).unwrap();
    let raw = std::fs::read_to_string(tmp.path().join("acks").join("firmware_v1.1.bin.ack")).unwrap();
    assert_eq!(raw, "SUCCESS");

    acks.post("malicious_firmware_v1.2.bin", AckOutcome::Failure).unwrap();
    let raw =
        std::fs::read_to_string(tmp.path().join("acks").join("malicious_firmware_v1.2.bin.ack"))
            .unwrap();
    assert_eq!(raw, "FAILURE");
}

#[tokio::test]
async fn test_ack_wait_consumes_record_once() {
    let tmp = tempfile::tempdir().unwrap();
    let acks = AckMailbox::open(tmp.path().join("acks")).unwrap();
    acks.post("firmware_v1.1.bin", AckOutcome::Failure).unwrap();

    let outcome = acks
        .wait("firmware_v1.1.bin", 5, Duration::from_millis(5))
        .await
        .unwrap();
    assert_eq!(outcome, AckOutcome::Failure);

    // One-shot: the record is gone after receipt.
    assert!(acks.try_take("firmware_v1.1.bin").unwrap().is_none());
}

#[tokio::test]
async fn test_ack_wait_times_out_after_bound() {
    let tmp = tempfile::tempdir().unwrap();
    let acks = AckMailbox::open(tmp.path().join("acks")).unwrap();

    let err = acks
        .wait("never.bin", 3, Duration::from_millis(5))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::AckTimeout { .. }));
}

#[tokio::test]
async fn test_ack_wait_matches_filename() {
    let tmp = tempfile::tempdir().unwrap();
    let acks = AckMailbox::open(tmp.path().join("acks")).unwrap();
    acks.post("other.bin", AckOutcome::Success).unwrap();

    // A record for a different image does not satisfy the wait.
    let err = acks
        .wait("mine.bin", 3, Duration::from_millis(5))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::AckTimeout { .. }));
    assert_eq!(acks.try_take("other.bin").unwrap(), Some(AckOutcome::Success));
}
