//! Weft Consensus - Proposer selection and turn scheduling
//!
//! This crate decides which validator may attach a block proposal to its
//! event, and checks that proposal metadata found in events follows the
//! turn schedule.

pub mod error;
pub mod proposal;
pub mod proposer;
pub mod turn;
pub mod validators;

pub use error::ConsensusError;
pub use proposal::{incoming_sync_state, validate_proposal};
pub use proposer::proposer_for_turn;
pub use turn::{
    current_turn, is_allowed_to_propose, is_valid_turn_progression, ProposalSummary,
    TURN_TIMEOUT_FRAMES,
};
pub use validators::{Validators, Weight};
