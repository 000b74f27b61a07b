use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::Hash;
use crate::error::CoreError;

pub type Epoch = u32;
pub type Seq = u32;
pub type Lamport = u32;
pub type Frame = u32;
pub type ValidatorId = u32;
pub type Turn = u32;
pub type NetForkId = u16;
/// Nanoseconds since the Unix epoch
pub type Timestamp = u64;

/// Identity of a DAG event.
///
/// Layout: `epoch (4, BE) || lamport (4, BE) || suffix (24)`. The suffix comes
/// from the event's locator hash; the prefix makes ids sort by epoch and then
/// lamport, so storage layers can range-scan one epoch in causal order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct EventId(pub [u8; 32]);

impl EventId {
    pub const SUFFIX_LEN: usize = 24;

    pub fn from_parts(epoch: Epoch, lamport: Lamport, suffix: &[u8; 24]) -> Self {
        let mut id = [0u8; 32];
        id[0..4].copy_from_slice(&epoch.to_be_bytes());
        id[4..8].copy_from_slice(&lamport.to_be_bytes());
        id[8..].copy_from_slice(suffix);
        EventId(id)
    }

    /// Derive the id from a locator hash: its first 24 bytes become the suffix.
    pub fn from_locator_hash(epoch: Epoch, lamport: Lamport, locator: &Hash) -> Self {
        let mut suffix = [0u8; 24];
        suffix.copy_from_slice(&locator.as_bytes()[..24]);
        Self::from_parts(epoch, lamport, &suffix)
    }

    pub fn epoch(&self) -> Epoch {
        Epoch::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn lamport(&self) -> Lamport {
        Lamport::from_be_bytes([self.0[4], self.0[5], self.0[6], self.0[7]])
    }

    pub fn suffix(&self) -> &[u8] {
        &self.0[8..]
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        Ok(EventId(Hash::from_hex(s)?.0))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EventId({}:{}:{})",
            self.epoch(),
            self.lamport(),
            hex::encode(&self.0[8..14])
        )
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash_blake3;

    #[test]
    fn test_event_id_prefix() {
        let locator = hash_blake3(b"locator");
        let id = EventId::from_locator_hash(0x0102_0304, 7, &locator);
        assert_eq!(&id.0[0..4], &[1, 2, 3, 4]);
        assert_eq!(id.epoch(), 0x0102_0304);
        assert_eq!(id.lamport(), 7);
        assert_eq!(id.suffix(), &locator.as_bytes()[..24]);
    }

    #[test]
    fn test_event_ids_sort_by_epoch_then_lamport() {
        let high_hash = Hash([0xff; 32]);
        let low_hash = Hash::ZERO;
        let a = EventId::from_locator_hash(1, 9, &high_hash);
        let b = EventId::from_locator_hash(1, 10, &low_hash);
        let c = EventId::from_locator_hash(2, 1, &high_hash);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_event_id_hex_roundtrip() {
        let id = EventId::from_locator_hash(5, 6, &hash_blake3(b"x"));
        assert_eq!(EventId::from_hex(&id.to_hex()).unwrap(), id);
    }
}
