use primitive_types::{U256, U512};
use sha2::{Digest, Sha256};
use tracing::trace;
use weft_core::{Turn, ValidatorId};

use crate::error::ConsensusError;
use crate::validators::Validators;

/// Pick the validator allowed to propose in `turn`.
///
/// The turn's SHA-256 hash is read as a fraction `h / 2^256` of the total
/// weight, and the first validator (by id) whose cumulative weight reaches
/// that point is selected. The comparison `cumulative * 2^256 >= h * total`
/// is exact in 512 bits, so every node agrees bit for bit.
pub fn proposer_for_turn(
    turn: Turn,
    validators: &Validators,
) -> Result<ValidatorId, ConsensusError> {
    if validators.is_empty() {
        return Err(ConsensusError::EmptyValidatorSet);
    }

    let digest = Sha256::digest(turn.to_be_bytes());
    let limit = U256::from_big_endian(&digest).full_mul(U256::from(validators.total_weight()));

    let mut cumulative: u64 = 0;
    let mut selected = None;
    for (id, weight) in validators.iter() {
        // cannot overflow: the set rejects totals above u64::MAX
        cumulative += weight;
        if U512::from(cumulative) << 256 >= limit {
            selected = Some(id);
            break;
        }
    }

    // h < 2^256, so the full weight always reaches the limit
    let proposer = selected
        .or_else(|| validators.ids().last().copied())
        .ok_or(ConsensusError::EmptyValidatorSet)?;
    trace!("Turn {} goes to validator {}", turn, proposer);
    Ok(proposer)
}
