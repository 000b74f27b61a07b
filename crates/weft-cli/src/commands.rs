use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use tracing::{info, warn};
use weft_consensus::{
    current_turn, is_allowed_to_propose, proposer_for_turn, ProposalSummary, Validators,
};
use weft_core::{
    EventId, Hash, Payload, Proposal, ProposalSyncState, SecretKey, Timestamp, Turn, ValidatorId,
};
use weft_event::{check_basic, Event, EventBuilder, EventContent};

use crate::config::ToolConfig;

/// Position of a new event in the DAG
#[derive(Debug, Clone)]
pub struct EmitParams {
    pub epoch: u32,
    pub seq: u32,
    pub frame: u32,
    pub lamport: u32,
    pub parents: Vec<EventId>,
    pub incoming: ProposalSyncState,
    pub block: u64,
    pub time: Timestamp,
}

/// Build a signed version 3 event for the local validator.
///
/// A proposal is attached when the validator owns the turn open at the
/// event's frame; otherwise the incoming sync state is carried forward.
pub fn emit_event(config: &ToolConfig, params: EmitParams) -> Result<Event> {
    let (creator, secret) = config.local_validator()?;
    let validators = config.to_validators()?;
    let payload = build_payload(creator, &secret, &validators, &params)?;

    let mut builder = EventBuilder::new();
    builder
        .set_net_fork_id(config.net_fork_id)
        .set_epoch(params.epoch)
        .set_seq(params.seq)
        .set_frame(params.frame)
        .set_creator(creator)
        .set_lamport(params.lamport)
        .set_parents(params.parents)
        .set_creation_time(params.time)
        .set_median_time(params.time)
        .set_content(EventContent::V3(payload));
    let event = builder.build_signed(&secret)?;

    check_basic(&event)?;
    info!(
        "Emitted event {} ({} bytes, proposal: {})",
        event.id(),
        event.size(),
        event.header().has_proposal()
    );
    Ok(event)
}

fn build_payload(
    creator: ValidatorId,
    secret: &SecretKey,
    validators: &Validators,
    params: &EmitParams,
) -> Result<Payload> {
    let last = ProposalSummary::from(params.incoming);
    if !is_allowed_to_propose(creator, validators, last, params.frame)? {
        return Ok(Payload {
            sync_state: params.incoming,
            proposal: None,
        });
    }

    let turn = current_turn(last, params.frame)
        .ok_or_else(|| anyhow!("no turn is open at frame {}", params.frame))?;
    let randao_seed = [&turn.to_be_bytes()[..], &params.epoch.to_be_bytes()[..]].concat();
    Ok(Payload {
        sync_state: ProposalSyncState {
            last_seen_proposal_turn: turn,
            last_seen_proposal_frame: params.frame,
        },
        proposal: Some(Proposal {
            number: params.block,
            parent_hash: Hash::ZERO,
            time: params.time,
            randao_reveal: secret.sign(&randao_seed),
            transactions: Vec::new(),
        }),
    })
}

/// Decode an event and report its fields as JSON.
///
/// The signature is checked when the config knows the creator's key.
pub fn inspect_event(raw: &[u8], config: Option<&ToolConfig>) -> Result<Value> {
    let event = Event::decode(raw)?;

    let signature = match config.map(|c| c.pubkey_of(event.creator())).transpose()? {
        Some(Some(pubkey)) => match event.verify_signature(&pubkey) {
            Ok(()) => "valid",
            Err(_) => {
                warn!("Invalid signature on event {}", event.id());
                "invalid"
            }
        },
        _ => "unknown",
    };
    let basic_check = match check_basic(&event) {
        Ok(()) => "ok".to_string(),
        Err(e) => e.to_string(),
    };

    let h = event.header();
    let payload = event.content().payload().map(|p| {
        json!({
            "last_seen_proposal_turn": p.sync_state.last_seen_proposal_turn,
            "last_seen_proposal_frame": p.sync_state.last_seen_proposal_frame,
            "proposal": p.proposal.as_ref().map(|proposal| json!({
                "number": proposal.number,
                "parent_hash": proposal.parent_hash.to_hex(),
                "time": proposal.time,
                "transactions": proposal.transactions.len(),
            })),
        })
    });

    Ok(json!({
        "id": event.id().to_hex(),
        "version": event.version(),
        "net_fork_id": h.net_fork_id(),
        "epoch": event.epoch(),
        "seq": event.seq(),
        "frame": event.frame(),
        "lamport": event.lamport(),
        "creator": event.creator(),
        "parents": event.parents().iter().map(|p| p.to_hex()).collect::<Vec<_>>(),
        "creation_time": h.creation_time(),
        "median_time": h.median_time(),
        "prev_epoch_hash": h.prev_epoch_hash().map(|hash| hash.to_hex()),
        "gas_power_left": h.gas_power_left().gas,
        "gas_power_used": h.gas_power_used(),
        "extra": hex::encode(h.extra()),
        "transactions": event.content().transactions().len(),
        "payload": payload,
        "payload_hash": event.payload_hash().to_hex(),
        "locator_hash": event.locator_hash().to_hex(),
        "size": event.size(),
        "signature": signature,
        "basic_check": basic_check,
    }))
}

/// Proposer of each turn in `from..from + count`, stopping at the last turn
pub fn schedule(
    validators: &Validators,
    from: Turn,
    count: u32,
) -> Result<Vec<(Turn, ValidatorId)>> {
    (from..=from.saturating_add(count.saturating_sub(1)))
        .take(count as usize)
        .map(|turn| Ok((turn, proposer_for_turn(turn, validators)?)))
        .collect()
}
