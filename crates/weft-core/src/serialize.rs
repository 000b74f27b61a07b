use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Serialize to deterministic bincode bytes
pub fn to_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CoreError> {
    bincode::serialize(value).map_err(|e| CoreError::Serialization(e.to_string()))
}

/// Deserialize bincode bytes produced by [`to_bytes`].
///
/// `limit` caps the total number of bytes the decoder may allocate, so
/// length prefixes read from untrusted input cannot request more memory than
/// the input could possibly describe. Trailing bytes are rejected.
pub fn from_bytes<'a, T: Deserialize<'a>>(bytes: &'a [u8], limit: u64) -> Result<T, CoreError> {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(limit)
        .deserialize(bytes)
        .map_err(|e| CoreError::Deserialization(e.to_string()))
}
