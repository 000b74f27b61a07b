use thiserror::Error;
use weft_core::{CoreError, Lamport};

/// Why an event could not be built, encoded or decoded.
///
/// Every variant is final for the event at hand. Callers use the variant to
/// decide how to treat the peer that sent it.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Malformed event: {0}")]
    Malformed(String),

    #[error("Version 0 events need epoch >= 256, got {0}")]
    ReservedEpoch(u32),

    #[error("Lamport {lamport} is not above parent lamport {parent_lamport}")]
    ParentLamport {
        lamport: Lamport,
        parent_lamport: Lamport,
    },

    #[error("Unknown event version {0}")]
    UnknownVersion(u8),

    #[error("Non-canonical encoding: {0}")]
    NonCanonical(&'static str),

    #[error("{what} too large: {len} exceeds limit {limit}")]
    TooLarge {
        what: &'static str,
        len: u64,
        limit: u64,
    },

    #[error("Unexpected end of input")]
    Truncated,

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl EventError {
    /// True for errors that describe the envelope contents rather than its
    /// byte representation.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            EventError::Malformed(_)
                | EventError::ReservedEpoch(_)
                | EventError::ParentLamport { .. }
        )
    }
}
