//! Weft Core - Hashes, keys, identifiers and payload types
//!
//! This crate provides the leaf types shared by the event envelope and the
//! turn scheduler: hashing, ed25519 signing, DAG identifiers, the transaction
//! sub-codec and the payload models carried by events.

pub mod crypto;
pub mod error;
pub mod serialize;
pub mod types;

pub use crypto::{hash_blake3, hash_parts, Hash, KeyPair, PublicKey, SecretKey, Sig};
pub use error::CoreError;
pub use types::*;
