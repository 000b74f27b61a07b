//! Content commitments and identity hashes of events.
//!
//! Everything here is a pure function of its inputs; nodes agree on event
//! identities only because these functions agree bit for bit.

use weft_core::{
    hash_blake3, hash_parts, misbehaviour_proofs_hash, transactions_hash, BlockVotes, CoreError,
    EpochVote, EventId, EventLocator, Hash, MisbehaviourProof, Payload, Transaction,
};

use crate::content::EventContent;

/// Commitment to an event's payload, by payload model.
///
/// * version 1: `H(H(txs || proofs) || H(epoch vote || block votes))`
/// * version 3: the structured payload's own hash
/// * otherwise: the transaction list hash
pub fn payload_hash(content: &EventContent) -> Result<Hash, CoreError> {
    match content {
        EventContent::V1(llr) => llr_payload_hash(
            llr.transactions(),
            llr.misbehaviour_proofs(),
            &llr.epoch_vote().copied().unwrap_or_default(),
            &llr.block_votes().cloned().unwrap_or_default(),
        ),
        EventContent::V3(payload) => payload.hash(),
        EventContent::V0(txs) | EventContent::V2(txs) => transactions_hash(txs),
    }
}

/// The payload hash of an event of `version` with nothing in it.
///
/// The value differs per version, so decoders compare against the one for
/// the version they are reading.
pub fn empty_payload_hash(version: u8) -> Result<Hash, CoreError> {
    match version {
        1 => llr_payload_hash(&[], &[], &EpochVote::default(), &BlockVotes::default()),
        3 => Payload::default().hash(),
        _ => transactions_hash(&[]),
    }
}

fn llr_payload_hash(
    txs: &[Transaction],
    proofs: &[MisbehaviourProof],
    epoch_vote: &EpochVote,
    block_votes: &BlockVotes,
) -> Result<Hash, CoreError> {
    let content = hash_parts(&[
        transactions_hash(txs)?.as_bytes(),
        misbehaviour_proofs_hash(proofs)?.as_bytes(),
    ]);
    let votes = hash_parts(&[epoch_vote.hash().as_bytes(), block_votes.hash().as_bytes()]);
    Ok(hash_parts(&[content.as_bytes(), votes.as_bytes()]))
}

/// Hash of an encoded header
pub fn base_hash(header_bytes: &[u8]) -> Hash {
    hash_blake3(header_bytes)
}

/// Event id: epoch and lamport in front of the locator hash prefix
pub fn event_id(locator: &EventLocator) -> EventId {
    EventId::from_locator_hash(locator.epoch, locator.lamport, &locator.hash())
}
