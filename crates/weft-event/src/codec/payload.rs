use serde::de::DeserializeOwned;
use weft_core::{serialize, BlockVotes, EpochVote, MisbehaviourProof, Payload, Transaction};

use super::stream::{Reader, Writer};
use super::MAX_MESSAGE_SIZE;
use crate::content::{EventContent, LlrContent};
use crate::error::EventError;
use crate::header::EventHeader;

pub(super) fn write(w: &mut Writer, content: &EventContent) -> Result<(), EventError> {
    match content {
        EventContent::V0(txs) | EventContent::V2(txs) => {
            if !txs.is_empty() {
                write_transactions(w, txs)?;
            }
        }
        EventContent::V1(llr) => {
            if !llr.transactions().is_empty() {
                write_transactions(w, llr.transactions())?;
            }
            if !llr.misbehaviour_proofs().is_empty() {
                let blob = serialize::to_bytes(&llr.misbehaviour_proofs())?;
                write_blob(w, "misbehaviour proofs", &blob)?;
            }
            if let Some(vote) = llr.epoch_vote() {
                write_blob(w, "epoch vote", &serialize::to_bytes(vote)?)?;
            }
            if let Some(votes) = llr.block_votes() {
                write_blob(w, "block votes", &serialize::to_bytes(votes)?)?;
            }
        }
        EventContent::V3(payload) => {
            write_blob(w, "payload", &payload.encode()?)?;
        }
    }
    Ok(())
}

/// Both sides bound the transaction count by the same limit, so the encoder
/// never emits a list its own decoder refuses.
fn check_transaction_count(count: usize) -> Result<(), EventError> {
    if count > MAX_MESSAGE_SIZE {
        return Err(EventError::TooLarge {
            what: "transactions",
            len: count as u64,
            limit: MAX_MESSAGE_SIZE as u64,
        });
    }
    Ok(())
}

fn write_transactions(w: &mut Writer, txs: &[Transaction]) -> Result<(), EventError> {
    check_transaction_count(txs.len())?;
    w.u32(txs.len() as u32);
    for tx in txs {
        write_blob(w, "transaction", &tx.encode()?)?;
    }
    Ok(())
}

fn write_blob(w: &mut Writer, what: &'static str, blob: &[u8]) -> Result<(), EventError> {
    if blob.len() > MAX_MESSAGE_SIZE {
        return Err(EventError::TooLarge {
            what,
            len: blob.len() as u64,
            limit: MAX_MESSAGE_SIZE as u64,
        });
    }
    w.slice_bytes(blob);
    Ok(())
}

pub(super) fn read(r: &mut Reader<'_>, header: &EventHeader) -> Result<EventContent, EventError> {
    let flags = header.flags();
    let transactions = if flags.any_transactions {
        read_transactions(r)?
    } else {
        Vec::new()
    };

    match header.version() {
        0 => Ok(EventContent::V0(transactions)),
        2 => Ok(EventContent::V2(transactions)),
        1 => {
            let misbehaviour_proofs = if flags.any_misbehaviour_proofs {
                let proofs: Vec<MisbehaviourProof> = read_structured(r, "misbehaviour proofs")?;
                if proofs.is_empty() {
                    return Err(EventError::Malformed(
                        "misbehaviour proofs flagged but list is empty".into(),
                    ));
                }
                proofs
            } else {
                Vec::new()
            };
            let epoch_vote = if flags.any_epoch_vote {
                Some(read_structured::<EpochVote>(r, "epoch vote")?)
            } else {
                None
            };
            let block_votes = if flags.any_block_votes {
                Some(read_structured::<BlockVotes>(r, "block votes")?)
            } else {
                None
            };
            let llr = LlrContent::new(transactions, misbehaviour_proofs, epoch_vote, block_votes)?;
            Ok(EventContent::V1(llr))
        }
        3 => {
            let blob = r.slice_bytes("payload", MAX_MESSAGE_SIZE)?;
            let payload = Payload::decode(blob, MAX_MESSAGE_SIZE as u64)
                .map_err(|e| EventError::Malformed(format!("payload: {e}")))?;
            if payload.has_proposal() != flags.has_proposal {
                return Err(EventError::Malformed(
                    "proposal flag does not match the payload".into(),
                ));
            }
            Ok(EventContent::V3(payload))
        }
        v => Err(EventError::UnknownVersion(v)),
    }
}

fn read_transactions(r: &mut Reader<'_>) -> Result<Vec<Transaction>, EventError> {
    let count = r.u32()? as usize;
    if count == 0 {
        return Err(EventError::Malformed(
            "transactions flagged but list is empty".into(),
        ));
    }
    check_transaction_count(count)?;
    // every transaction needs at least its length byte
    if count > r.remaining() {
        return Err(EventError::Truncated);
    }

    let mut txs = Vec::with_capacity(count);
    for _ in 0..count {
        let blob = r.slice_bytes("transaction", MAX_MESSAGE_SIZE)?;
        let tx = Transaction::decode(blob)
            .map_err(|e| EventError::Malformed(format!("transaction: {e}")))?;
        txs.push(tx);
    }
    Ok(txs)
}

fn read_structured<T: DeserializeOwned>(
    r: &mut Reader<'_>,
    what: &'static str,
) -> Result<T, EventError> {
    let blob = r.slice_bytes(what, MAX_MESSAGE_SIZE)?;
    serialize::from_bytes(blob, MAX_MESSAGE_SIZE as u64)
        .map_err(|e| EventError::Malformed(format!("{what}: {e}")))
}
