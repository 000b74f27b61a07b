use serde::{Deserialize, Serialize};

use crate::crypto::{hash_parts, Hash, PublicKey, Sig};
use crate::error::CoreError;
use crate::types::ids::{Epoch, Lamport, NetForkId, Seq, ValidatorId};

/// The record a creator signs for an event.
///
/// It binds the full header (through `base_hash`) and the content (through
/// `payload_hash`) while repeating the positional fields, so a locator alone
/// is enough to prove that a validator signed two different events at the
/// same position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLocator {
    pub base_hash: Hash,
    pub net_fork_id: NetForkId,
    pub epoch: Epoch,
    pub seq: Seq,
    pub lamport: Lamport,
    pub creator: ValidatorId,
    pub payload_hash: Hash,
}

impl EventLocator {
    /// Hash of the fixed-width big-endian encoding of every field
    pub fn hash(&self) -> Hash {
        hash_parts(&[
            self.base_hash.as_bytes(),
            &self.net_fork_id.to_be_bytes(),
            &self.epoch.to_be_bytes(),
            &self.seq.to_be_bytes(),
            &self.lamport.to_be_bytes(),
            &self.creator.to_be_bytes(),
            self.payload_hash.as_bytes(),
        ])
    }
}

/// A locator together with its creator's signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEventLocator {
    pub locator: EventLocator,
    pub signature: Sig,
}

impl SignedEventLocator {
    pub fn verify(&self, creator_key: &PublicKey) -> Result<(), CoreError> {
        creator_key.verify_hash(&self.locator.hash(), &self.signature)
    }
}
