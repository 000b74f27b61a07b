use weft_core::{
    Epoch, EventId, EventLocator, Frame, Hash, Lamport, NetForkId, Seq, Timestamp, ValidatorId,
};

use crate::codec;
use crate::error::EventError;

/// Index of the short-term slot in [`GasPowerLeft`]
pub const SHORT_TERM_GAS: usize = 0;
/// Index of the long-term slot in [`GasPowerLeft`]
pub const LONG_TERM_GAS: usize = 1;

/// Remaining gas budget of the creator, per refill window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GasPowerLeft {
    pub gas: [u64; 2],
}

impl GasPowerLeft {
    pub fn new(short_term: u64, long_term: u64) -> Self {
        GasPowerLeft {
            gas: [short_term, long_term],
        }
    }

    pub fn min(&self) -> u64 {
        self.gas[SHORT_TERM_GAS].min(self.gas[LONG_TERM_GAS])
    }

    pub fn max(&self) -> u64 {
        self.gas[SHORT_TERM_GAS].max(self.gas[LONG_TERM_GAS])
    }
}

/// Which parts of the payload an event carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresenceFlags {
    pub any_transactions: bool,
    pub any_misbehaviour_proofs: bool,
    pub any_epoch_vote: bool,
    pub any_block_votes: bool,
    pub has_proposal: bool,
}

impl PresenceFlags {
    /// Whether any pre-version-3 payload part is present
    pub fn any_payload(&self) -> bool {
        self.any_transactions
            || self.any_misbehaviour_proofs
            || self.any_epoch_vote
            || self.any_block_votes
    }
}

/// The signed part of an event without its payload bodies.
///
/// Headers are what the base hash commits to and can be exchanged on their
/// own. The payload is represented only by its hash and presence flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventHeader {
    pub(crate) version: u8,
    pub(crate) net_fork_id: NetForkId,
    pub(crate) epoch: Epoch,
    pub(crate) seq: Seq,
    pub(crate) frame: Frame,
    pub(crate) creator: ValidatorId,
    pub(crate) lamport: Lamport,
    pub(crate) parents: Vec<EventId>,
    pub(crate) creation_time: Timestamp,
    pub(crate) median_time: Timestamp,
    pub(crate) prev_epoch_hash: Option<Hash>,
    pub(crate) gas_power_left: GasPowerLeft,
    pub(crate) gas_power_used: u64,
    pub(crate) extra: Vec<u8>,
    pub(crate) flags: PresenceFlags,
    pub(crate) payload_hash: Hash,
}

impl EventHeader {
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn net_fork_id(&self) -> NetForkId {
        self.net_fork_id
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn seq(&self) -> Seq {
        self.seq
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn creator(&self) -> ValidatorId {
        self.creator
    }

    pub fn lamport(&self) -> Lamport {
        self.lamport
    }

    pub fn parents(&self) -> &[EventId] {
        &self.parents
    }

    /// The parent created by the same validator, which by convention comes first
    pub fn self_parent(&self) -> Option<&EventId> {
        if self.seq <= 1 {
            return None;
        }
        self.parents.first()
    }

    pub fn creation_time(&self) -> Timestamp {
        self.creation_time
    }

    pub fn median_time(&self) -> Timestamp {
        self.median_time
    }

    pub fn prev_epoch_hash(&self) -> Option<&Hash> {
        self.prev_epoch_hash.as_ref()
    }

    pub fn gas_power_left(&self) -> GasPowerLeft {
        self.gas_power_left
    }

    pub fn gas_power_used(&self) -> u64 {
        self.gas_power_used
    }

    pub fn extra(&self) -> &[u8] {
        &self.extra
    }

    pub fn flags(&self) -> PresenceFlags {
        self.flags
    }

    pub fn any_transactions(&self) -> bool {
        self.flags.any_transactions
    }

    pub fn any_misbehaviour_proofs(&self) -> bool {
        self.flags.any_misbehaviour_proofs
    }

    pub fn any_epoch_vote(&self) -> bool {
        self.flags.any_epoch_vote
    }

    pub fn any_block_votes(&self) -> bool {
        self.flags.any_block_votes
    }

    pub fn has_proposal(&self) -> bool {
        self.flags.has_proposal
    }

    pub fn payload_hash(&self) -> Hash {
        self.payload_hash
    }

    /// The locator this header produces for a given base hash
    pub fn locator(&self, base_hash: Hash) -> EventLocator {
        EventLocator {
            base_hash,
            net_fork_id: self.net_fork_id,
            epoch: self.epoch,
            seq: self.seq,
            lamport: self.lamport,
            creator: self.creator,
            payload_hash: self.payload_hash,
        }
    }

    /// Header-only wire encoding; its hash is the event's base hash
    pub fn encode(&self) -> Result<Vec<u8>, EventError> {
        codec::encode_header(self)
    }

    pub fn decode(raw: &[u8]) -> Result<Self, EventError> {
        codec::decode_header(raw)
    }
}
