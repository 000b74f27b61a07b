use weft_core::{BlockVotes, EpochVote, MisbehaviourProof, Payload, Transaction};

use crate::error::EventError;
use crate::header::PresenceFlags;

/// The payload of an event, one variant per protocol version.
///
/// The version of an event is the version of its content, and the presence
/// flags written on the wire are derived from it, so a locally built event
/// cannot advertise parts it does not carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventContent {
    /// Legacy events: transactions only
    V0(Vec<Transaction>),
    /// Transactions plus fast-lane votes and misbehaviour proofs
    V1(LlrContent),
    /// Transactions only, with an explicit version byte
    V2(Vec<Transaction>),
    /// Structured payload with an optional block proposal
    V3(Payload),
}

impl Default for EventContent {
    fn default() -> Self {
        EventContent::V3(Payload::default())
    }
}

impl EventContent {
    pub fn version(&self) -> u8 {
        match self {
            EventContent::V0(_) => 0,
            EventContent::V1(_) => 1,
            EventContent::V2(_) => 2,
            EventContent::V3(_) => 3,
        }
    }

    pub fn presence_flags(&self) -> PresenceFlags {
        match self {
            EventContent::V0(txs) | EventContent::V2(txs) => PresenceFlags {
                any_transactions: !txs.is_empty(),
                ..PresenceFlags::default()
            },
            EventContent::V1(llr) => PresenceFlags {
                any_transactions: !llr.transactions.is_empty(),
                any_misbehaviour_proofs: !llr.misbehaviour_proofs.is_empty(),
                any_epoch_vote: llr.epoch_vote.is_some(),
                any_block_votes: llr.block_votes.is_some(),
                has_proposal: false,
            },
            EventContent::V3(payload) => PresenceFlags {
                has_proposal: payload.has_proposal(),
                ..PresenceFlags::default()
            },
        }
    }

    /// Transactions carried directly by the event.
    ///
    /// Version 3 events carry transactions only inside their proposal, see
    /// [`EventContent::payload`].
    pub fn transactions(&self) -> &[Transaction] {
        match self {
            EventContent::V0(txs) | EventContent::V2(txs) => txs,
            EventContent::V1(llr) => &llr.transactions,
            EventContent::V3(_) => &[],
        }
    }

    pub fn llr(&self) -> Option<&LlrContent> {
        match self {
            EventContent::V1(llr) => Some(llr),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            EventContent::V3(payload) => Some(payload),
            _ => None,
        }
    }
}

/// Version 1 payload: transactions, misbehaviour proofs and fast-lane votes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LlrContent {
    transactions: Vec<Transaction>,
    misbehaviour_proofs: Vec<MisbehaviourProof>,
    epoch_vote: Option<EpochVote>,
    block_votes: Option<BlockVotes>,
}

impl LlrContent {
    /// Votes are optional; a present vote must not be empty, otherwise its
    /// presence flag would claim content that is not there.
    pub fn new(
        transactions: Vec<Transaction>,
        misbehaviour_proofs: Vec<MisbehaviourProof>,
        epoch_vote: Option<EpochVote>,
        block_votes: Option<BlockVotes>,
    ) -> Result<Self, EventError> {
        if epoch_vote.is_some_and(|v| v.is_empty()) {
            return Err(EventError::Malformed("epoch vote for epoch 0".into()));
        }
        if block_votes.as_ref().is_some_and(|v| v.is_empty()) {
            return Err(EventError::Malformed("block votes without votes".into()));
        }
        Ok(LlrContent {
            transactions,
            misbehaviour_proofs,
            epoch_vote,
            block_votes,
        })
    }

    pub fn with_transactions(transactions: Vec<Transaction>) -> Self {
        LlrContent {
            transactions,
            ..LlrContent::default()
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn misbehaviour_proofs(&self) -> &[MisbehaviourProof] {
        &self.misbehaviour_proofs
    }

    pub fn epoch_vote(&self) -> Option<&EpochVote> {
        self.epoch_vote.as_ref()
    }

    pub fn block_votes(&self) -> Option<&BlockVotes> {
        self.block_votes.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::{Hash, Proposal, Sig};

    #[test]
    fn test_versions() {
        assert_eq!(EventContent::V0(vec![]).version(), 0);
        assert_eq!(EventContent::V1(LlrContent::default()).version(), 1);
        assert_eq!(EventContent::V2(vec![]).version(), 2);
        assert_eq!(EventContent::default().version(), 3);
    }

    #[test]
    fn test_llr_rejects_empty_votes() {
        assert!(LlrContent::new(vec![], vec![], Some(EpochVote::default()), None).is_err());
        assert!(LlrContent::new(vec![], vec![], None, Some(BlockVotes::default())).is_err());
    }

    #[test]
    fn test_llr_flags() {
        let llr = LlrContent::new(
            vec![],
            vec![],
            Some(EpochVote {
                epoch: 4,
                vote: Hash::ZERO,
            }),
            None,
        )
        .unwrap();
        let flags = EventContent::V1(llr).presence_flags();
        assert!(flags.any_epoch_vote);
        assert!(!flags.any_block_votes);
        assert!(!flags.any_transactions);
        assert!(flags.any_payload());
    }

    #[test]
    fn test_v3_flags_follow_proposal() {
        let mut payload = Payload::default();
        assert!(!EventContent::V3(payload.clone()).presence_flags().has_proposal);

        payload.proposal = Some(Proposal {
            number: 1,
            parent_hash: Hash::ZERO,
            time: 1,
            randao_reveal: Sig::default(),
            transactions: vec![],
        });
        let flags = EventContent::V3(payload).presence_flags();
        assert!(flags.has_proposal);
        assert!(!flags.any_payload());
    }
}
