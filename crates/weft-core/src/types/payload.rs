//! The structured payload of version 3 events.

use serde::{Deserialize, Serialize};

use crate::crypto::{hash_parts, Hash, Sig};
use crate::error::CoreError;
use crate::serialize;
use crate::types::ids::{Frame, Timestamp, Turn};
use crate::types::transaction::{transactions_hash, Transaction};

/// The most recent proposal an event's creator knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ProposalSyncState {
    pub last_seen_proposal_turn: Turn,
    pub last_seen_proposal_frame: Frame,
}

impl ProposalSyncState {
    /// Component-wise maximum of two states.
    ///
    /// Turns and frames only ever grow along DAG edges, so merging the
    /// knowledge of two parents keeps the larger value of each.
    pub fn join(self, other: ProposalSyncState) -> ProposalSyncState {
        ProposalSyncState {
            last_seen_proposal_turn: self
                .last_seen_proposal_turn
                .max(other.last_seen_proposal_turn),
            last_seen_proposal_frame: self
                .last_seen_proposal_frame
                .max(other.last_seen_proposal_frame),
        }
    }
}

/// A block proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Number of the proposed block
    pub number: u64,
    pub parent_hash: Hash,
    pub time: Timestamp,
    /// Proposer's signature over the parent's randomness
    pub randao_reveal: Sig,
    pub transactions: Vec<Transaction>,
}

impl Proposal {
    pub fn hash(&self) -> Result<Hash, CoreError> {
        Ok(hash_parts(&[
            &self.number.to_be_bytes(),
            self.parent_hash.as_bytes(),
            &self.time.to_be_bytes(),
            self.randao_reveal.as_bytes(),
            transactions_hash(&self.transactions)?.as_bytes(),
        ]))
    }
}

/// Version 3 event payload: the creator's proposal view plus an optional
/// proposal of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Payload {
    pub sync_state: ProposalSyncState,
    pub proposal: Option<Proposal>,
}

impl Payload {
    pub fn has_proposal(&self) -> bool {
        self.proposal.is_some()
    }

    pub fn hash(&self) -> Result<Hash, CoreError> {
        let proposal_hash = match &self.proposal {
            Some(proposal) => Some(proposal.hash()?),
            None => None,
        };
        let turn = self.sync_state.last_seen_proposal_turn.to_be_bytes();
        let frame = self.sync_state.last_seen_proposal_frame.to_be_bytes();

        Ok(match proposal_hash {
            Some(h) => hash_parts(&[&turn, &frame, &[1u8], h.as_bytes()]),
            None => hash_parts(&[&turn, &frame, &[0u8]]),
        })
    }

    /// Structured encoding used inside event envelopes
    pub fn encode(&self) -> Result<Vec<u8>, CoreError> {
        serialize::to_bytes(self)
    }

    /// Decode a payload blob; `limit` bounds the memory the decoder may use
    pub fn decode(bytes: &[u8], limit: u64) -> Result<Self, CoreError> {
        serialize::from_bytes(bytes, limit)
    }
}
