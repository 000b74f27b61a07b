use tracing::trace;
use weft_core::{EventId, Hash};

use super::stream::{Reader, Writer};
use super::{MAX_EVENT_VERSION, MAX_EXTRA_SIZE, MAX_PARENTS};
use crate::error::EventError;
use crate::hashing::empty_payload_hash;
use crate::header::{EventHeader, GasPowerLeft, PresenceFlags};

/// Epochs below this value are reserved: with an implicit version 0 the
/// epoch's size bits are the first bits of the stream, and they must not be
/// zero, which is the explicit-version marker.
const MIN_IMPLICIT_VERSION_EPOCH: u32 = 256;

/// Bytes a parent occupies in the byte stream at minimum
const MIN_PARENT_BYTES: usize = 1 + EventId::SUFFIX_LEN;

pub(super) fn write(w: &mut Writer, h: &EventHeader) -> Result<(), EventError> {
    if h.version > MAX_EVENT_VERSION {
        return Err(EventError::UnknownVersion(h.version));
    }
    if h.version > 0 {
        w.bits(2, 0);
        w.u8(h.version);
        w.u16(h.net_fork_id);
    } else if h.epoch < MIN_IMPLICIT_VERSION_EPOCH {
        return Err(EventError::ReservedEpoch(h.epoch));
    } else if h.net_fork_id != 0 {
        return Err(EventError::Malformed(
            "version 0 events have no net fork id".into(),
        ));
    }

    w.u32(h.epoch);
    w.u32(h.lamport);
    w.u32(h.creator);
    w.u32(h.seq);
    w.u32(h.frame);
    w.u64(h.creation_time);
    w.i64(h.creation_time.wrapping_sub(h.median_time) as i64);
    w.u64(h.gas_power_used);
    w.u64(h.gas_power_left.gas[0]);
    w.u64(h.gas_power_left.gas[1]);

    if h.parents.len() > MAX_PARENTS {
        return Err(EventError::TooLarge {
            what: "parents",
            len: h.parents.len() as u64,
            limit: MAX_PARENTS as u64,
        });
    }
    w.u32(h.parents.len() as u32);
    for parent in &h.parents {
        if parent.epoch() != h.epoch {
            return Err(EventError::Malformed(format!(
                "parent from epoch {} in epoch {}",
                parent.epoch(),
                h.epoch
            )));
        }
        if parent.lamport() >= h.lamport {
            return Err(EventError::ParentLamport {
                lamport: h.lamport,
                parent_lamport: parent.lamport(),
            });
        }
        w.u32(h.lamport - parent.lamport());
        w.fixed_bytes(parent.suffix());
    }

    w.bool(h.prev_epoch_hash.is_some());
    if let Some(hash) = &h.prev_epoch_hash {
        w.fixed_bytes(hash.as_bytes());
    }

    w.bool(h.flags.any_transactions);
    if h.version == 1 {
        w.bool(h.flags.any_misbehaviour_proofs);
        w.bool(h.flags.any_epoch_vote);
        w.bool(h.flags.any_block_votes);
    }
    if h.version == 3 {
        w.bool(h.flags.has_proposal);
    }

    if h.version == 3 || h.flags.any_payload() {
        w.fixed_bytes(h.payload_hash.as_bytes());
    }

    if h.extra.len() > MAX_EXTRA_SIZE {
        return Err(EventError::TooLarge {
            what: "extra",
            len: h.extra.len() as u64,
            limit: MAX_EXTRA_SIZE as u64,
        });
    }
    w.slice_bytes(&h.extra);
    Ok(())
}

pub(super) fn read(r: &mut Reader<'_>) -> Result<EventHeader, EventError> {
    let version = if r.peek_bits(2)? == 0 {
        r.bits(2)?;
        let version = r.u8()?;
        if version == 0 {
            return Err(EventError::NonCanonical("explicit version 0"));
        }
        if version > MAX_EVENT_VERSION {
            return Err(EventError::UnknownVersion(version));
        }
        version
    } else {
        0
    };
    let net_fork_id = if version > 0 { r.u16()? } else { 0 };

    let epoch = r.u32()?;
    let lamport = r.u32()?;
    let creator = r.u32()?;
    let seq = r.u32()?;
    let frame = r.u32()?;
    let creation_time = r.u64()?;
    let median_time = creation_time.wrapping_sub(r.i64()? as u64);
    let gas_power_used = r.u64()?;
    let gas_power_left = GasPowerLeft {
        gas: [r.u64()?, r.u64()?],
    };

    let parent_count = r.u32()? as usize;
    if parent_count > MAX_PARENTS {
        return Err(EventError::TooLarge {
            what: "parents",
            len: parent_count as u64,
            limit: MAX_PARENTS as u64,
        });
    }
    if parent_count.saturating_mul(MIN_PARENT_BYTES) > r.remaining() {
        return Err(EventError::Truncated);
    }
    let mut parents = Vec::with_capacity(parent_count);
    for _ in 0..parent_count {
        let diff = r.u32()?;
        if diff == 0 {
            return Err(EventError::ParentLamport {
                lamport,
                parent_lamport: lamport,
            });
        }
        let parent_lamport = lamport
            .checked_sub(diff)
            .ok_or_else(|| EventError::Malformed("parent lamport below zero".into()))?;
        let suffix = r.fixed_bytes::<{ EventId::SUFFIX_LEN }>()?;
        parents.push(EventId::from_parts(epoch, parent_lamport, &suffix));
    }

    let prev_epoch_hash = if r.bool()? {
        Some(Hash(r.fixed_bytes::<32>()?))
    } else {
        None
    };

    let any_transactions = r.bool()?;
    let (any_misbehaviour_proofs, any_epoch_vote, any_block_votes) = if version == 1 {
        (r.bool()?, r.bool()?, r.bool()?)
    } else {
        (false, false, false)
    };
    let has_proposal = version == 3 && r.bool()?;
    let flags = PresenceFlags {
        any_transactions,
        any_misbehaviour_proofs,
        any_epoch_vote,
        any_block_votes,
        has_proposal,
    };

    if version == 3 && flags.any_payload() {
        return Err(EventError::Malformed(
            "version 3 events carry transactions only inside proposals".into(),
        ));
    }

    let empty_hash = empty_payload_hash(version)?;
    let payload_hash = if version == 3 || flags.any_payload() {
        let hash = Hash(r.fixed_bytes::<32>()?);
        // Before version 3 the hash is only written for non-empty payloads,
        // so the empty-payload hash here contradicts the presence flags.
        // Version 3 always writes it and an empty payload is ordinary.
        if version != 3 && hash == empty_hash {
            return Err(EventError::Malformed(
                "payload flagged as present but hash commits to an empty payload".into(),
            ));
        }
        hash
    } else {
        empty_hash
    };

    let extra = r.slice_bytes("extra", MAX_EXTRA_SIZE)?.to_vec();

    trace!("Decoded v{} header {}:{}:{}", version, epoch, creator, seq);

    Ok(EventHeader {
        version,
        net_fork_id,
        epoch,
        seq,
        frame,
        creator,
        lamport,
        parents,
        creation_time,
        median_time,
        prev_epoch_hash,
        gas_power_left,
        gas_power_used,
        extra,
        flags,
        payload_hash,
    })
}
