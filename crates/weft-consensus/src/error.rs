use thiserror::Error;
use weft_core::{Frame, Turn, ValidatorId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsensusError {
    #[error("Validator set is empty")]
    EmptyValidatorSet,

    #[error("Validator {0} listed twice")]
    DuplicateValidator(ValidatorId),

    #[error("Total validator weight overflows")]
    WeightOverflow,

    #[error("Version {0} events carry no proposal metadata")]
    NotStructuredPayload(u8),

    #[error("Sync state ({got_turn}, {got_frame}) is not the inherited ({expected_turn}, {expected_frame})")]
    SyncStateMismatch {
        expected_turn: Turn,
        expected_frame: Frame,
        got_turn: Turn,
        got_frame: Frame,
    },

    #[error("Proposal recorded at frame {proposal_frame} in an event of frame {event_frame}")]
    ProposalFrameMismatch {
        event_frame: Frame,
        proposal_frame: Frame,
    },

    #[error("Turn {next} at frame {next_frame} does not follow turn {last} at frame {last_frame}")]
    InvalidTurnProgression {
        last: Turn,
        last_frame: Frame,
        next: Turn,
        next_frame: Frame,
    },

    #[error("Turn {turn} belongs to validator {expected}, not {got}")]
    WrongProposer {
        turn: Turn,
        expected: ValidatorId,
        got: ValidatorId,
    },
}
