use tracing::debug;
use weft_core::{
    CoreError, Epoch, EventId, EventLocator, Frame, Hash, Lamport, PublicKey, Seq, Sig,
    ValidatorId,
};

use crate::builder::EventBuilder;
use crate::codec;
use crate::content::EventContent;
use crate::error::EventError;
use crate::hashing;
use crate::header::EventHeader;

/// An immutable DAG event.
///
/// Produced by [`EventBuilder::build`] or [`Event::decode`]. The identity
/// hashes and the encoded size are computed once on construction and never
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    header: EventHeader,
    signature: Sig,
    content: EventContent,
    base_hash: Hash,
    locator_hash: Hash,
    id: EventId,
    size: usize,
}

impl Event {
    /// Freeze a header and its content, deriving the identity hashes.
    ///
    /// `size` is the length of the encoding the event was read from; when
    /// absent the event is encoded once to measure it, which also surfaces
    /// every encoding error at construction time.
    pub(crate) fn assemble(
        header: EventHeader,
        signature: Sig,
        content: EventContent,
        size: Option<usize>,
    ) -> Result<Self, EventError> {
        let base_hash = codec::base_hash(&header)?;
        let locator = header.locator(base_hash);
        let mut event = Event {
            id: hashing::event_id(&locator),
            locator_hash: locator.hash(),
            header,
            signature,
            content,
            base_hash,
            size: 0,
        };
        event.size = match size {
            Some(size) => size,
            None => codec::encode_event(&event)?.len(),
        };
        Ok(event)
    }

    pub(crate) fn set_signature(&mut self, signature: Sig) {
        self.signature = signature;
    }

    /// Canonical wire encoding
    pub fn encode(&self) -> Result<Vec<u8>, EventError> {
        codec::encode_event(self)
    }

    /// Decode an event received from a peer.
    ///
    /// Any error is final for these bytes; nothing is partially accepted.
    pub fn decode(raw: &[u8]) -> Result<Self, EventError> {
        let result = codec::decode_event(raw).and_then(|(header, sig, content)| {
            Event::assemble(header, sig, content, Some(raw.len()))
        });
        if let Err(e) = &result {
            debug!("Rejected event encoding of {} bytes: {}", raw.len(), e);
        }
        result
    }

    /// Check the creator's signature over the locator hash
    pub fn verify_signature(&self, creator_key: &PublicKey) -> Result<(), CoreError> {
        creator_key.verify_hash(&self.locator_hash, &self.signature)
    }

    /// Start a mutable copy of this event
    pub fn to_builder(&self) -> EventBuilder {
        EventBuilder::from_event(self)
    }

    pub fn header(&self) -> &EventHeader {
        &self.header
    }

    pub fn signature(&self) -> &Sig {
        &self.signature
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    pub fn content(&self) -> &EventContent {
        &self.content
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn locator(&self) -> EventLocator {
        self.header.locator(self.base_hash)
    }

    /// The hash the creator signs
    pub fn locator_hash(&self) -> Hash {
        self.locator_hash
    }

    pub fn base_hash(&self) -> Hash {
        self.base_hash
    }

    pub fn payload_hash(&self) -> Hash {
        self.header.payload_hash()
    }

    /// Length of the canonical encoding in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn version(&self) -> u8 {
        self.header.version()
    }

    pub fn epoch(&self) -> Epoch {
        self.header.epoch()
    }

    pub fn seq(&self) -> Seq {
        self.header.seq()
    }

    pub fn frame(&self) -> Frame {
        self.header.frame()
    }

    pub fn lamport(&self) -> Lamport {
        self.header.lamport()
    }

    pub fn creator(&self) -> ValidatorId {
        self.header.creator()
    }

    pub fn parents(&self) -> &[EventId] {
        self.header.parents()
    }
}
