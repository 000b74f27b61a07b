use weft_core::{
    Epoch, EventId, Frame, Hash, Lamport, NetForkId, SecretKey, Seq, Sig, Timestamp, ValidatorId,
};

use crate::content::EventContent;
use crate::error::EventError;
use crate::event::Event;
use crate::hashing;
use crate::header::{EventHeader, GasPowerLeft};

/// Mutable event under construction.
///
/// Owned by the producer that fills it in. The version and presence flags
/// follow from the content, so there is no setter for them.
#[derive(Debug, Clone, Default)]
pub struct EventBuilder {
    net_fork_id: NetForkId,
    epoch: Epoch,
    seq: Seq,
    frame: Frame,
    creator: ValidatorId,
    lamport: Lamport,
    parents: Vec<EventId>,
    creation_time: Timestamp,
    median_time: Timestamp,
    prev_epoch_hash: Option<Hash>,
    gas_power_left: GasPowerLeft,
    gas_power_used: u64,
    extra: Vec<u8>,
    content: EventContent,
    signature: Sig,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_event(event: &Event) -> Self {
        let h = event.header();
        EventBuilder {
            net_fork_id: h.net_fork_id(),
            epoch: h.epoch(),
            seq: h.seq(),
            frame: h.frame(),
            creator: h.creator(),
            lamport: h.lamport(),
            parents: h.parents().to_vec(),
            creation_time: h.creation_time(),
            median_time: h.median_time(),
            prev_epoch_hash: h.prev_epoch_hash().copied(),
            gas_power_left: h.gas_power_left(),
            gas_power_used: h.gas_power_used(),
            extra: h.extra().to_vec(),
            content: event.content().clone(),
            signature: *event.signature(),
        }
    }

    /// Version implied by the current content
    pub fn version(&self) -> u8 {
        self.content.version()
    }

    /// Only written on the wire for versions above 0
    pub fn set_net_fork_id(&mut self, net_fork_id: NetForkId) -> &mut Self {
        self.net_fork_id = net_fork_id;
        self
    }

    pub fn set_epoch(&mut self, epoch: Epoch) -> &mut Self {
        self.epoch = epoch;
        self
    }

    pub fn set_seq(&mut self, seq: Seq) -> &mut Self {
        self.seq = seq;
        self
    }

    pub fn set_frame(&mut self, frame: Frame) -> &mut Self {
        self.frame = frame;
        self
    }

    pub fn set_creator(&mut self, creator: ValidatorId) -> &mut Self {
        self.creator = creator;
        self
    }

    pub fn set_lamport(&mut self, lamport: Lamport) -> &mut Self {
        self.lamport = lamport;
        self
    }

    /// Self-parent first, when there is one
    pub fn set_parents(&mut self, parents: Vec<EventId>) -> &mut Self {
        self.parents = parents;
        self
    }

    pub fn set_creation_time(&mut self, time: Timestamp) -> &mut Self {
        self.creation_time = time;
        self
    }

    pub fn set_median_time(&mut self, time: Timestamp) -> &mut Self {
        self.median_time = time;
        self
    }

    pub fn set_prev_epoch_hash(&mut self, hash: Option<Hash>) -> &mut Self {
        self.prev_epoch_hash = hash;
        self
    }

    pub fn set_gas_power_left(&mut self, gas: GasPowerLeft) -> &mut Self {
        self.gas_power_left = gas;
        self
    }

    pub fn set_gas_power_used(&mut self, gas: u64) -> &mut Self {
        self.gas_power_used = gas;
        self
    }

    pub fn set_extra(&mut self, extra: Vec<u8>) -> &mut Self {
        self.extra = extra;
        self
    }

    /// Replace the payload; this also selects the event version
    pub fn set_content(&mut self, content: EventContent) -> &mut Self {
        self.content = content;
        self
    }

    pub fn set_signature(&mut self, signature: Sig) -> &mut Self {
        self.signature = signature;
        self
    }

    /// Freeze into an immutable event.
    ///
    /// Fails when the fields cannot be encoded: a version 0 event in a
    /// reserved epoch, a parent that is not below this event's lamport or
    /// belongs to another epoch, or a payload the sub-codecs reject.
    pub fn build(self) -> Result<Event, EventError> {
        let payload_hash = hashing::payload_hash(&self.content)?;
        let header = EventHeader {
            version: self.content.version(),
            net_fork_id: self.net_fork_id,
            epoch: self.epoch,
            seq: self.seq,
            frame: self.frame,
            creator: self.creator,
            lamport: self.lamport,
            parents: self.parents,
            creation_time: self.creation_time,
            median_time: self.median_time,
            prev_epoch_hash: self.prev_epoch_hash,
            gas_power_left: self.gas_power_left,
            gas_power_used: self.gas_power_used,
            extra: self.extra,
            flags: self.content.presence_flags(),
            payload_hash,
        };
        Event::assemble(header, self.signature, self.content, None)
    }

    /// Build and sign the locator hash with the creator's key
    pub fn build_signed(self, secret_key: &SecretKey) -> Result<Event, EventError> {
        let mut event = self.build()?;
        let signature = secret_key.sign_hash(&event.locator_hash());
        event.set_signature(signature);
        Ok(event)
    }
}
