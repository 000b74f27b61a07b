//! Event codec integration tests

use weft_core::{
    hash_blake3, BlockVotes, EpochVote, EventId, EventLocator, Hash, KeyPair, MisbehaviourProof,
    Payload, Proposal, ProposalSyncState, SecretKey, SignedEventLocator, Transaction,
};
use weft_event::codec::Writer;
use weft_event::{
    empty_payload_hash, Event, EventBuilder, EventContent, EventError, EventHeader, GasPowerLeft,
    LlrContent, MAX_EXTRA_SIZE, MAX_PARENTS,
};

fn signed_tx(key: &SecretKey, nonce: u64, data: Vec<u8>) -> Transaction {
    let mut tx = Transaction::new(key.public_key(), nonce, 50_000, 3, None, 1_000, data);
    tx.sign(key).unwrap();
    tx
}

/// Builder with only the fields every event needs
fn minimal(epoch: u32, content: EventContent) -> EventBuilder {
    let mut builder = EventBuilder::new();
    builder
        .set_epoch(epoch)
        .set_seq(1)
        .set_frame(1)
        .set_creator(1)
        .set_lamport(1)
        .set_content(content);
    builder
}

/// Builder with every optional header field populated
fn maximal(epoch: u32, content: EventContent) -> EventBuilder {
    let parents = (1..=5u32)
        .map(|i| EventId::from_parts(epoch, 100 - i * 7, &[i as u8; 24]))
        .collect();
    let mut builder = EventBuilder::new();
    if content.version() > 0 {
        builder.set_net_fork_id(u16::MAX);
    }
    builder
        .set_epoch(epoch)
        .set_seq(u32::MAX)
        .set_frame(u32::MAX)
        .set_creator(u32::MAX)
        .set_lamport(100)
        .set_parents(parents)
        .set_creation_time(u64::MAX)
        .set_median_time(1)
        .set_prev_epoch_hash(Some(hash_blake3(b"previous epoch")))
        .set_gas_power_left(GasPowerLeft::new(u64::MAX, 7))
        .set_gas_power_used(u64::MAX)
        .set_extra(vec![0xab; 300])
        .set_content(content);
    builder
}

fn double_sign_proof(keys: &KeyPair) -> MisbehaviourProof {
    let locator = |seq| EventLocator {
        base_hash: hash_blake3(&[seq as u8]),
        net_fork_id: 0,
        epoch: 300,
        seq,
        lamport: 4,
        creator: 9,
        payload_hash: Hash::ZERO,
    };
    let signed = |l: EventLocator| SignedEventLocator {
        locator: l,
        signature: keys.secret.sign_hash(&l.hash()),
    };
    MisbehaviourProof::EventsDoublesign {
        pair: [signed(locator(2)), signed(locator(3))],
    }
}

fn full_llr(keys: &KeyPair) -> LlrContent {
    LlrContent::new(
        vec![signed_tx(&keys.secret, 1, vec![1; 64]), signed_tx(&keys.secret, 2, vec![])],
        vec![double_sign_proof(keys)],
        Some(EpochVote {
            epoch: 299,
            vote: hash_blake3(b"epoch 299"),
        }),
        Some(BlockVotes {
            start: 1_000,
            epoch: 300,
            votes: vec![hash_blake3(b"b1000"), hash_blake3(b"b1001")],
        }),
    )
    .unwrap()
}

fn full_payload(keys: &KeyPair) -> Payload {
    Payload {
        sync_state: ProposalSyncState {
            last_seen_proposal_turn: 11,
            last_seen_proposal_frame: 40,
        },
        proposal: Some(Proposal {
            number: 77,
            parent_hash: hash_blake3(b"block 76"),
            time: 1_700_000_000_000_000_000,
            randao_reveal: keys.secret.sign(b"randao"),
            transactions: vec![signed_tx(&keys.secret, 5, vec![9; 10])],
        }),
    }
}

fn assert_roundtrip(event: &Event) {
    let bytes = event.encode().unwrap();
    assert_eq!(bytes.len(), event.size());

    let decoded = Event::decode(&bytes).unwrap();
    assert_eq!(&decoded, event);
    assert_eq!(decoded.id(), event.id());
    assert_eq!(decoded.locator_hash(), event.locator_hash());
    assert_eq!(decoded.base_hash(), event.base_hash());
    assert_eq!(decoded.payload_hash(), event.payload_hash());
    assert_eq!(decoded.size(), event.size());
    assert_eq!(decoded.encode().unwrap(), bytes);
}

/// Replace the single occurrence of `from` in `bytes` with `to`
fn replace_once(bytes: &mut [u8], from: &Hash, to: &Hash) {
    let positions: Vec<usize> = bytes
        .windows(32)
        .enumerate()
        .filter(|(_, w)| *w == from.as_bytes())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(positions.len(), 1);
    bytes[positions[0]..positions[0] + 32].copy_from_slice(to.as_bytes());
}

/// A version 2 header up to and including the parent count
fn v2_header_prefix(parent_count: u32) -> Writer {
    let mut w = Writer::new();
    w.bits(2, 0);
    w.u8(2);
    w.u16(0);
    for v in [300u32, 10, 1, 1, 1] {
        w.u32(v);
    }
    w.u64(1);
    w.i64(0);
    w.u64(0);
    w.u64(0);
    w.u64(0);
    w.u32(parent_count);
    w
}

/// A complete version 3 envelope with the given presence bits and payload
fn v3_envelope(any_transactions: bool, has_proposal: bool, payload: &Payload) -> Vec<u8> {
    let mut w = Writer::new();
    w.bits(2, 0);
    w.u8(3);
    w.u16(0);
    for v in [300u32, 10, 1, 1, 1] {
        w.u32(v);
    }
    w.u64(1);
    w.i64(0);
    w.u64(0);
    w.u64(0);
    w.u64(0);
    w.u32(0);
    w.bool(false);
    w.bool(any_transactions);
    w.bool(has_proposal);
    w.fixed_bytes(payload.hash().unwrap().as_bytes());
    w.slice_bytes(&[]);
    w.fixed_bytes(&[0; 64]);
    w.slice_bytes(&payload.encode().unwrap());
    w.finish()
}

#[test]
fn test_roundtrip_empty_events() {
    for content in [
        EventContent::V0(vec![]),
        EventContent::V1(LlrContent::default()),
        EventContent::V2(vec![]),
        EventContent::V3(Payload::default()),
    ] {
        let event = minimal(256, content).build().unwrap();
        assert_roundtrip(&event);
    }
}

#[test]
fn test_roundtrip_minimal_events() {
    let keys = KeyPair::generate();
    let tx = signed_tx(&keys.secret, 1, vec![]);
    for content in [
        EventContent::V0(vec![tx.clone()]),
        EventContent::V1(LlrContent::with_transactions(vec![tx.clone()])),
        EventContent::V2(vec![tx]),
        EventContent::V3(Payload {
            sync_state: ProposalSyncState {
                last_seen_proposal_turn: 1,
                last_seen_proposal_frame: 1,
            },
            proposal: None,
        }),
    ] {
        let event = minimal(1_000, content).build_signed(&keys.secret).unwrap();
        assert_roundtrip(&event);
        assert!(event.verify_signature(&keys.public).is_ok());
    }
}

#[test]
fn test_roundtrip_maximal_events() {
    let keys = KeyPair::generate();
    let txs: Vec<Transaction> = (0..20)
        .map(|n| signed_tx(&keys.secret, n, vec![n as u8; 200]))
        .collect();
    for content in [
        EventContent::V0(txs.clone()),
        EventContent::V1(full_llr(&keys)),
        EventContent::V2(txs),
        EventContent::V3(full_payload(&keys)),
    ] {
        let event = maximal(u32::MAX, content)
            .build_signed(&keys.secret)
            .unwrap();
        assert_roundtrip(&event);
    }
}

#[test]
fn test_header_roundtrip() {
    let keys = KeyPair::generate();
    let event = maximal(700, EventContent::V1(full_llr(&keys)))
        .build()
        .unwrap();
    let bytes = event.header().encode().unwrap();
    let header = EventHeader::decode(&bytes).unwrap();
    assert_eq!(&header, event.header());
    assert_eq!(hash_blake3(&bytes), event.base_hash());
}

#[test]
fn test_median_time_after_creation_time() {
    let mut builder = minimal(300, EventContent::default());
    builder.set_creation_time(10).set_median_time(500);
    let event = builder.build().unwrap();
    assert_roundtrip(&event);
    assert_eq!(event.header().median_time(), 500);
}

#[test]
fn test_explicit_version_zero_rejected() {
    let mut w = Writer::new();
    w.bits(2, 0);
    w.u8(0);
    w.u32(300);
    assert!(matches!(
        Event::decode(&w.finish()),
        Err(EventError::NonCanonical(_))
    ));
}

#[test]
fn test_unknown_version_rejected() {
    let mut w = Writer::new();
    w.bits(2, 0);
    w.u8(4);
    w.u16(0);
    assert!(matches!(
        Event::decode(&w.finish()),
        Err(EventError::UnknownVersion(4))
    ));
}

#[test]
fn test_v2_empty_hash_with_payload_rejected() {
    let keys = KeyPair::generate();
    let event = minimal(300, EventContent::V2(vec![signed_tx(&keys.secret, 1, vec![])]))
        .build()
        .unwrap();
    assert!(event.header().any_transactions());

    let mut bytes = event.encode().unwrap();
    replace_once(&mut bytes, &event.payload_hash(), &empty_payload_hash(2).unwrap());

    let err = Event::decode(&bytes).unwrap_err();
    assert!(matches!(err, EventError::Malformed(_)));
    assert!(err.is_malformed());
}

#[test]
fn test_v3_empty_hash_without_proposal_accepted() {
    let event = minimal(300, EventContent::V3(Payload::default()))
        .build()
        .unwrap();
    assert_eq!(event.payload_hash(), empty_payload_hash(3).unwrap());
    assert!(!event.header().has_proposal());

    let decoded = Event::decode(&event.encode().unwrap()).unwrap();
    assert_eq!(decoded.payload_hash(), empty_payload_hash(3).unwrap());
}

#[test]
fn test_tampered_payload_hash_rejected() {
    let keys = KeyPair::generate();
    let event = minimal(300, EventContent::V3(full_payload(&keys)))
        .build()
        .unwrap();
    let mut bytes = event.encode().unwrap();
    replace_once(&mut bytes, &event.payload_hash(), &hash_blake3(b"forged"));

    assert!(matches!(
        Event::decode(&bytes),
        Err(EventError::Malformed(_))
    ));
}

#[test]
fn test_parent_lamport_must_increase() {
    let mut builder = minimal(300, EventContent::default());
    builder
        .set_lamport(5)
        .set_parents(vec![EventId::from_parts(300, 5, &[0; 24])]);
    assert!(matches!(
        builder.build(),
        Err(EventError::ParentLamport {
            lamport: 5,
            parent_lamport: 5
        })
    ));

    let mut builder = minimal(300, EventContent::default());
    builder
        .set_lamport(5)
        .set_parents(vec![EventId::from_parts(300, 4, &[0; 24])]);
    assert!(builder.build().is_ok());
}

#[test]
fn test_zero_lamport_delta_rejected() {
    let mut w = v2_header_prefix(1);
    w.u32(0);
    w.fixed_bytes(&[0; 24]);
    assert!(matches!(
        Event::decode(&w.finish()),
        Err(EventError::ParentLamport { .. })
    ));
}

#[test]
fn test_too_many_parents_rejected() {
    let w = v2_header_prefix(MAX_PARENTS as u32 + 1);
    assert!(matches!(
        Event::decode(&w.finish()),
        Err(EventError::TooLarge { what: "parents", .. })
    ));
}

#[test]
fn test_parent_count_beyond_input_rejected() {
    let w = v2_header_prefix(1_000);
    assert!(matches!(
        Event::decode(&w.finish()),
        Err(EventError::Truncated)
    ));
}

#[test]
fn test_oversized_extra_rejected() {
    let mut w = v2_header_prefix(0);
    w.bool(false);
    w.bool(false);
    w.u32(MAX_EXTRA_SIZE as u32 + 1);
    assert!(matches!(
        Event::decode(&w.finish()),
        Err(EventError::TooLarge { what: "extra", .. })
    ));
}

#[test]
fn test_truncated_event_rejected() {
    let keys = KeyPair::generate();
    let event = maximal(300, EventContent::V3(full_payload(&keys)))
        .build()
        .unwrap();
    let bytes = event.encode().unwrap();
    for cut in [1, 10, bytes.len() / 2, bytes.len() - 1] {
        assert!(Event::decode(&bytes[..cut]).is_err());
    }
}

#[test]
fn test_shifted_bytes_rejected() {
    let event = minimal(300, EventContent::default()).build().unwrap();
    let mut bytes = event.encode().unwrap();
    bytes.insert(0, 0);
    assert!(Event::decode(&bytes).is_err());
}

#[test]
fn test_ids_sort_by_epoch_then_lamport() {
    let mut ids: Vec<EventId> = [(301, 1), (300, 9), (300, 2)]
        .into_iter()
        .map(|(epoch, lamport)| {
            let mut b = minimal(epoch, EventContent::default());
            b.set_lamport(lamport);
            b.build().unwrap().id()
        })
        .collect();
    ids.sort();
    let order: Vec<(u32, u32)> = ids.iter().map(|id| (id.epoch(), id.lamport())).collect();
    assert_eq!(order, vec![(300, 2), (300, 9), (301, 1)]);
}

#[test]
fn test_v3_handwritten_envelope_accepted() {
    let event = Event::decode(&v3_envelope(false, false, &Payload::default())).unwrap();
    assert_eq!(event.version(), 3);
    assert_eq!(event.payload_hash(), empty_payload_hash(3).unwrap());
}

#[test]
fn test_v3_transactions_bit_rejected() {
    let raw = v3_envelope(true, false, &Payload::default());
    assert!(matches!(
        Event::decode(&raw),
        Err(EventError::Malformed(_))
    ));
}

#[test]
fn test_v3_proposal_flag_mismatch_rejected() {
    // flag claims a proposal the payload does not carry
    let raw = v3_envelope(false, true, &Payload::default());
    assert!(matches!(
        Event::decode(&raw),
        Err(EventError::Malformed(_))
    ));

    // payload carries a proposal the flag does not announce
    let keys = KeyPair::generate();
    let raw = v3_envelope(false, false, &full_payload(&keys));
    assert!(matches!(
        Event::decode(&raw),
        Err(EventError::Malformed(_))
    ));
}
