use pktgen_core::{Batch, Packet, PktgenError, Status, BATCH_CAPACITY, PACKET_CAPACITY};

#[test]
fn test_default_batch_is_zeroed() {
    let batch = Batch::default();
    assert_eq!(batch.count, 0);
    assert_eq!(batch.packets.len(), BATCH_CAPACITY);
    assert!(batch.packets.iter().all(|p| p.len == 0 && p.data.iter().all(|b| *b == 0)));
    assert!(batch.packets().is_empty());
}

#[test]
fn test_meaningful_prefix() {
    let mut batch = Batch::default();
    batch.count = 3;
    batch.packets[0].len = 4;
    batch.packets[0].data[..4].copy_from_slice(&[1, 2, 3, 4]);

    assert_eq!(batch.packets().len(), 3);
    assert_eq!(batch.packets()[0].payload(), &[1, 2, 3, 4]);
    assert!(batch.packets()[1].payload().is_empty());
}

#[test]
fn test_payload_ignores_corrupt_len() {
    // A C caller may hand back garbage; never slice past the buffer.
    let mut pkt = Packet::default();
    pkt.len = u16::MAX;
    assert_eq!(pkt.payload().len(), PACKET_CAPACITY);

    let mut batch = Batch::default();
    batch.count = u8::MAX;
    assert_eq!(batch.packets().len(), BATCH_CAPACITY);
}

#[test]
fn test_clear_wipes_all_slots() {
    let mut batch = Batch::default();
    batch.count = 2;
    batch.packets[BATCH_CAPACITY - 1].len = 10;
    batch.packets[BATCH_CAPACITY - 1].data[0] = 0xAA;

    batch.clear();
    assert_eq!(batch.count, 0);
    assert_eq!(batch.packets[BATCH_CAPACITY - 1].len, 0);
    assert_eq!(batch.packets[BATCH_CAPACITY - 1].data[0], 0x00, "Data Remanence Detected!");
}

#[test]
fn test_status_codes() {
    assert_eq!(Status::Success.code(), 0);
    assert_eq!(Status::from_code(0), Some(Status::Success));
    assert_eq!(Status::from_code(1), Some(Status::InvalidHandle));
    assert_eq!(Status::from_code(42), None);

    assert!(PktgenError::check(0).is_ok());
    assert_eq!(PktgenError::check(1), Err(PktgenError::InvalidHandle));
    assert_eq!(PktgenError::check(42), Err(PktgenError::Status(42)));
}
