//! Weft Event - The DAG event envelope and its wire codec
//!
//! This crate provides the immutable event type, the builder that produces
//! it, the identity hashes derived from it and the canonical compact
//! encoding exchanged between peers.

pub mod builder;
pub mod codec;
pub mod content;
pub mod error;
pub mod event;
pub mod hashing;
pub mod header;
pub mod validation;

pub use builder::EventBuilder;
pub use codec::{MAX_EVENT_VERSION, MAX_EXTRA_SIZE, MAX_MESSAGE_SIZE, MAX_PARENTS};
pub use content::{EventContent, LlrContent};
pub use error::EventError;
pub use event::Event;
pub use hashing::{empty_payload_hash, payload_hash};
pub use header::{EventHeader, GasPowerLeft, PresenceFlags};
pub use validation::{check_basic, BasicCheckError, MAX_EXTRA_DATA};
