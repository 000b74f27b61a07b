//! Decoding arbitrary input must fail cleanly, never panic

use proptest::prelude::*;
use weft_core::{KeyPair, Payload, ProposalSyncState};
use weft_event::{Event, EventBuilder, EventContent, EventHeader};

fn sample_encoding() -> Vec<u8> {
    let keys = KeyPair::generate();
    let mut builder = EventBuilder::new();
    builder
        .set_epoch(400)
        .set_seq(1)
        .set_frame(2)
        .set_creator(3)
        .set_lamport(4)
        .set_creation_time(5)
        .set_content(EventContent::V3(Payload {
            sync_state: ProposalSyncState {
                last_seen_proposal_turn: 6,
                last_seen_proposal_frame: 1,
            },
            proposal: None,
        }));
    builder.build_signed(&keys.secret).unwrap().encode().unwrap()
}

proptest! {
    #[test]
    fn decode_arbitrary_bytes(raw in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = Event::decode(&raw);
        let _ = EventHeader::decode(&raw);
    }

    #[test]
    fn decode_mutated_event(index in any::<prop::sample::Index>(), byte in any::<u8>()) {
        let mut raw = sample_encoding();
        let i = index.index(raw.len());
        let original = raw[i];
        raw[i] = byte;
        let result = Event::decode(&raw);
        if byte == original {
            prop_assert!(result.is_ok());
        }
    }
}
