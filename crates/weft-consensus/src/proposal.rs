use tracing::warn;
use weft_core::ProposalSyncState;
use weft_event::Event;

use crate::error::ConsensusError;
use crate::proposer::proposer_for_turn;
use crate::turn::{is_valid_turn_progression, ProposalSummary};
use crate::validators::Validators;

/// The proposal state an event inherits from its parents
pub fn incoming_sync_state<'a, I>(parent_states: I) -> ProposalSyncState
where
    I: IntoIterator<Item = &'a ProposalSyncState>,
{
    parent_states
        .into_iter()
        .fold(ProposalSyncState::default(), |acc, state| acc.join(*state))
}

/// Check the proposal metadata of a version 3 event.
///
/// `incoming` is the state joined from the event's parents. An event without
/// a proposal must repeat it unchanged. An event with a proposal must record
/// its own frame and a turn that validly follows `incoming`, and its creator
/// must own that turn.
pub fn validate_proposal(
    event: &Event,
    incoming: ProposalSyncState,
    validators: &Validators,
) -> Result<(), ConsensusError> {
    let result = check_proposal(event, incoming, validators);
    if let Err(e) = &result {
        warn!(
            "Event {} of validator {} has invalid proposal metadata: {}",
            event.id(),
            event.creator(),
            e
        );
    }
    result
}

fn check_proposal(
    event: &Event,
    incoming: ProposalSyncState,
    validators: &Validators,
) -> Result<(), ConsensusError> {
    let payload = event
        .content()
        .payload()
        .ok_or(ConsensusError::NotStructuredPayload(event.version()))?;
    let state = payload.sync_state;

    if !payload.has_proposal() {
        if state != incoming {
            return Err(ConsensusError::SyncStateMismatch {
                expected_turn: incoming.last_seen_proposal_turn,
                expected_frame: incoming.last_seen_proposal_frame,
                got_turn: state.last_seen_proposal_turn,
                got_frame: state.last_seen_proposal_frame,
            });
        }
        return Ok(());
    }

    if state.last_seen_proposal_frame != event.frame() {
        return Err(ConsensusError::ProposalFrameMismatch {
            event_frame: event.frame(),
            proposal_frame: state.last_seen_proposal_frame,
        });
    }

    let last = ProposalSummary::from(incoming);
    let next = ProposalSummary::from(state);
    if !is_valid_turn_progression(last, next) {
        return Err(ConsensusError::InvalidTurnProgression {
            last: last.turn,
            last_frame: last.frame,
            next: next.turn,
            next_frame: next.frame,
        });
    }

    let expected = proposer_for_turn(next.turn, validators)?;
    if expected != event.creator() {
        return Err(ConsensusError::WrongProposer {
            turn: next.turn,
            expected,
            got: event.creator(),
        });
    }
    Ok(())
}
