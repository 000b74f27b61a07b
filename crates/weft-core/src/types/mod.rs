pub mod ids;
pub mod llr;
pub mod locator;
pub mod payload;
pub mod transaction;

pub use ids::{Epoch, EventId, Frame, Lamport, NetForkId, Seq, Timestamp, Turn, ValidatorId};
pub use llr::{
    misbehaviour_proofs_hash, BlockVotes, EpochVote, MisbehaviourProof, SignedBlockVotes,
    SignedEpochVote,
};
pub use locator::{EventLocator, SignedEventLocator};
pub use payload::{Payload, Proposal, ProposalSyncState};
pub use transaction::{transactions_hash, Transaction, MAX_TX_DATA_SIZE};
