//! Turn progression.
//!
//! Turns are numbered proposal slots. A validator that misses its turn is
//! skipped once enough frames have passed, so the schedule keeps moving when
//! proposers are offline. The predicates here are pure; the last accepted
//! proposal is state kept by the caller.

use weft_core::{Frame, ProposalSyncState, Turn, ValidatorId};

use crate::error::ConsensusError;
use crate::proposer::proposer_for_turn;
use crate::validators::Validators;

/// Frames a turn stays open before the next one may take over
pub const TURN_TIMEOUT_FRAMES: u64 = 8;

/// Turn and frame of a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProposalSummary {
    pub turn: Turn,
    pub frame: Frame,
}

impl ProposalSummary {
    pub fn new(turn: Turn, frame: Frame) -> Self {
        ProposalSummary { turn, frame }
    }
}

impl From<ProposalSyncState> for ProposalSummary {
    fn from(state: ProposalSyncState) -> Self {
        ProposalSummary {
            turn: state.last_seen_proposal_turn,
            frame: state.last_seen_proposal_frame,
        }
    }
}

/// Whether a proposal in `next` may follow the accepted proposal `last`.
///
/// The immediate successor turn needs any later frame. Each skipped turn
/// costs [`TURN_TIMEOUT_FRAMES`] frames.
pub fn is_valid_turn_progression(last: ProposalSummary, next: ProposalSummary) -> bool {
    if next.turn <= last.turn {
        return false;
    }
    let frame_gap = next.frame as i64 - last.frame as i64;
    let skipped = (next.turn - last.turn - 1) as u64;
    if skipped == 0 {
        return frame_gap > 0;
    }
    frame_gap >= (skipped * TURN_TIMEOUT_FRAMES) as i64
}

/// The latest turn a proposal at `frame` may claim after `last`.
///
/// `None` when no turn is open yet, which is the case up to and including
/// the frame of the last proposal, or when the turn number would not fit.
pub fn current_turn(last: ProposalSummary, frame: Frame) -> Option<Turn> {
    if frame <= last.frame {
        return None;
    }
    let elapsed = (frame - last.frame) as u64;
    let turn = last.turn as u64 + 1 + elapsed / TURN_TIMEOUT_FRAMES;
    Turn::try_from(turn).ok()
}

/// Whether `validator` owns the turn open at `frame`
pub fn is_allowed_to_propose(
    validator: ValidatorId,
    validators: &Validators,
    last: ProposalSummary,
    frame: Frame,
) -> Result<bool, ConsensusError> {
    let Some(turn) = current_turn(last, frame) else {
        return Ok(false);
    };
    Ok(proposer_for_turn(turn, validators)? == validator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(turn: Turn, frame: Frame) -> ProposalSummary {
        ProposalSummary::new(turn, frame)
    }

    #[test]
    fn test_next_turn_needs_later_frame() {
        assert!(is_valid_turn_progression(summary(1, 1), summary(2, 2)));
        assert!(is_valid_turn_progression(summary(1, 1), summary(2, 100)));
        assert!(!is_valid_turn_progression(summary(1, 5), summary(2, 5)));
        assert!(!is_valid_turn_progression(summary(1, 5), summary(2, 4)));
    }

    #[test]
    fn test_skipped_turn_boundary() {
        let last = summary(1, 1);
        let timeout = TURN_TIMEOUT_FRAMES as u32;
        assert!(is_valid_turn_progression(last, summary(3, 1 + timeout)));
        assert!(!is_valid_turn_progression(last, summary(3, timeout)));
        assert!(is_valid_turn_progression(last, summary(4, 1 + 2 * timeout)));
        assert!(!is_valid_turn_progression(last, summary(4, 2 * timeout)));
    }

    #[test]
    fn test_turn_must_increase() {
        assert!(!is_valid_turn_progression(summary(1, 1), summary(1, 2)));
        assert!(!is_valid_turn_progression(summary(5, 1), summary(4, 100)));
        assert!(!is_valid_turn_progression(
            summary(u32::MAX, 1),
            summary(0, u32::MAX)
        ));
    }

    #[test]
    fn test_extreme_values() {
        assert!(!is_valid_turn_progression(summary(0, 1), summary(u32::MAX, 2)));
        assert!(!is_valid_turn_progression(
            summary(0, u32::MAX),
            summary(u32::MAX, 0)
        ));
        assert!(is_valid_turn_progression(
            summary(u32::MAX - 1, 0),
            summary(u32::MAX, u32::MAX)
        ));
    }

    #[test]
    fn test_current_turn() {
        let last = summary(10, 20);
        assert_eq!(current_turn(last, 20), None);
        assert_eq!(current_turn(last, 21), Some(11));
        assert_eq!(current_turn(last, 27), Some(11));
        assert_eq!(current_turn(last, 28), Some(12));
        assert_eq!(current_turn(summary(u32::MAX, 0), 1), None);
    }

    #[test]
    fn test_current_turn_is_valid_progression() {
        let last = summary(3, 7);
        for frame in 8..200 {
            let turn = current_turn(last, frame).unwrap();
            assert!(is_valid_turn_progression(last, summary(turn, frame)));
            assert!(!is_valid_turn_progression(last, summary(turn + 1, frame)));
        }
    }

    #[test]
    fn test_allowed_to_propose() {
        let validators = Validators::new([(1, 1), (2, 1), (3, 1)]).unwrap();
        let last = summary(0, 0);
        let turn = current_turn(last, 1).unwrap();
        let owner = proposer_for_turn(turn, &validators).unwrap();
        for id in 1..=3 {
            assert_eq!(
                is_allowed_to_propose(id, &validators, last, 1),
                Ok(id == owner)
            );
        }
        assert_eq!(is_allowed_to_propose(owner, &validators, last, 0), Ok(false));
    }
}
