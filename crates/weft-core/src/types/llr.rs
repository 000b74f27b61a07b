//! Fast-lane votes and misbehaviour proofs carried by version 1 events.

use serde::{Deserialize, Serialize};

use crate::crypto::{hash_blake3, hash_parts, Hash};
use crate::error::CoreError;
use crate::serialize;
use crate::types::ids::Epoch;
use crate::types::locator::SignedEventLocator;

/// A validator's vote for the state hash sealed at the end of an epoch.
///
/// `epoch == 0` is the empty vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EpochVote {
    pub epoch: Epoch,
    pub vote: Hash,
}

impl EpochVote {
    pub fn is_empty(&self) -> bool {
        self.epoch == 0
    }

    pub fn hash(&self) -> Hash {
        hash_parts(&[&self.epoch.to_be_bytes(), self.vote.as_bytes()])
    }
}

/// Votes for a contiguous run of blocks starting at `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockVotes {
    pub start: u64,
    pub epoch: Epoch,
    pub votes: Vec<Hash>,
}

impl BlockVotes {
    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Block number of the last vote, if any
    pub fn last_block(&self) -> Option<u64> {
        if self.votes.is_empty() {
            return None;
        }
        self.start.checked_add(self.votes.len() as u64 - 1)
    }

    pub fn hash(&self) -> Hash {
        let start = self.start.to_be_bytes();
        let epoch = self.epoch.to_be_bytes();
        let mut parts: Vec<&[u8]> = Vec::with_capacity(self.votes.len() + 2);
        parts.push(&start);
        parts.push(&epoch);
        parts.extend(self.votes.iter().map(|v| v.as_bytes().as_slice()));
        hash_parts(&parts)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEpochVote {
    pub signed: SignedEventLocator,
    pub vote: EpochVote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBlockVotes {
    pub signed: SignedEventLocator,
    pub votes: BlockVotes,
}

/// Evidence that a validator signed two conflicting statements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MisbehaviourProof {
    /// Two different events at the same epoch and seq
    EventsDoublesign { pair: [SignedEventLocator; 2] },
    /// Two different votes for the same block
    BlockVoteDoublesign {
        block: u64,
        pair: [SignedBlockVotes; 2],
    },
    /// Two different votes for the same epoch
    EpochVoteDoublesign { pair: [SignedEpochVote; 2] },
}

impl MisbehaviourProof {
    pub fn hash(&self) -> Result<Hash, CoreError> {
        Ok(hash_blake3(&serialize::to_bytes(self)?))
    }
}

/// Commitment to a list of misbehaviour proofs: `H(count || proof hashes)`
pub fn misbehaviour_proofs_hash(proofs: &[MisbehaviourProof]) -> Result<Hash, CoreError> {
    let count = (proofs.len() as u32).to_be_bytes();
    let hashes = proofs
        .iter()
        .map(|p| p.hash())
        .collect::<Result<Vec<_>, _>>()?;

    let mut parts: Vec<&[u8]> = Vec::with_capacity(hashes.len() + 1);
    parts.push(&count);
    parts.extend(hashes.iter().map(|h| h.as_bytes().as_slice()));
    Ok(hash_parts(&parts))
}
