//! Canonical wire encoding of events.

mod header;
mod payload;
pub mod stream;

use weft_core::{EventId, Hash, Sig};

use crate::content::EventContent;
use crate::error::EventError;
use crate::event::Event;
use crate::header::EventHeader;

pub use stream::{Reader, Writer};

/// Highest event version this codec understands
pub const MAX_EVENT_VERSION: u8 = 3;

/// Largest protocol message; bounds every length read from the wire
pub const MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Each parent costs at least its 24-byte id suffix on the wire
pub const MAX_PARENTS: usize = MAX_MESSAGE_SIZE / EventId::SUFFIX_LEN;

pub const MAX_EXTRA_SIZE: usize = MAX_MESSAGE_SIZE;

pub(crate) fn encode_header(header: &EventHeader) -> Result<Vec<u8>, EventError> {
    let mut w = Writer::new();
    header::write(&mut w, header)?;
    Ok(w.finish())
}

pub(crate) fn decode_header(raw: &[u8]) -> Result<EventHeader, EventError> {
    let mut r = Reader::new(raw)?;
    let header = header::read(&mut r)?;
    r.finish()?;
    Ok(header)
}

pub(crate) fn encode_event(event: &Event) -> Result<Vec<u8>, EventError> {
    let mut w = Writer::new();
    header::write(&mut w, event.header())?;
    w.fixed_bytes(event.signature().as_bytes());
    payload::write(&mut w, event.content())?;
    Ok(w.finish())
}

/// Decode a full event and check that its content matches its header.
pub(crate) fn decode_event(raw: &[u8]) -> Result<(EventHeader, Sig, EventContent), EventError> {
    let mut r = Reader::new(raw)?;
    let header = header::read(&mut r)?;
    let signature = Sig(r.fixed_bytes::<{ Sig::LEN }>()?);
    let content = payload::read(&mut r, &header)?;
    r.finish()?;

    if content.presence_flags() != header.flags() {
        return Err(EventError::Malformed(
            "presence flags do not match the payload".into(),
        ));
    }
    let computed = crate::hashing::payload_hash(&content)
        .map_err(|e| EventError::Malformed(format!("payload cannot be hashed: {e}")))?;
    if computed != header.payload_hash() {
        return Err(EventError::Malformed(
            "payload hash does not match the payload".into(),
        ));
    }
    Ok((header, signature, content))
}

/// Hash of the header-only encoding
pub(crate) fn base_hash(header: &EventHeader) -> Result<Hash, EventError> {
    Ok(crate::hashing::base_hash(&encode_header(header)?))
}
