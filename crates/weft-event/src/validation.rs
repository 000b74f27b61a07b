use std::collections::HashSet;

use crate::event::Event;

/// Values at or above this are rejected so that counters can be incremented
/// many times without overflow.
pub const MAX_REASONABLE_VALUE: u32 = (i32::MAX / 2) as u32;

/// Largest `extra` accepted from the network.
///
/// Much smaller than what the codec can carry; the codec bound only guards
/// allocation.
pub const MAX_EXTRA_DATA: usize = 128;

/// Context-free checks failed by an event
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BasicCheckError {
    #[error("Event is not initialized: {0} is zero")]
    NotInitialized(&'static str),

    #[error("Event with seq {0} has no parents")]
    NoParents(u32),

    #[error("Too large {what}: {value}")]
    HugeValue { what: &'static str, value: u32 },

    #[error("Event has zero creation time")]
    ZeroTime,

    #[error("Extra data of {0} bytes exceeds {MAX_EXTRA_DATA}")]
    TooLargeExtra(usize),

    #[error("Event has duplicate parents")]
    DuplicateParents,
}

/// Checks that need nothing but the event itself.
///
/// Run before anything that touches the DAG. Lamport ordering against parents
/// and parent epochs are already guaranteed by the codec.
pub fn check_basic(event: &Event) -> Result<(), BasicCheckError> {
    let fields = [
        ("epoch", event.epoch()),
        ("seq", event.seq()),
        ("frame", event.frame()),
        ("lamport", event.lamport()),
    ];

    // 1. Initialized and not huge
    for (what, value) in fields {
        if value == 0 {
            return Err(BasicCheckError::NotInitialized(what));
        }
        if value >= MAX_REASONABLE_VALUE {
            return Err(BasicCheckError::HugeValue { what, value });
        }
    }

    // 2. Only the first event of a creator may be parentless
    if event.seq() > 1 && event.parents().is_empty() {
        return Err(BasicCheckError::NoParents(event.seq()));
    }

    // 3. Time and extra
    if event.header().creation_time() == 0 {
        return Err(BasicCheckError::ZeroTime);
    }
    let extra = event.header().extra().len();
    if extra > MAX_EXTRA_DATA {
        return Err(BasicCheckError::TooLargeExtra(extra));
    }

    // 4. Parents
    let mut seen = HashSet::with_capacity(event.parents().len());
    for parent in event.parents() {
        if !seen.insert(parent) {
            return Err(BasicCheckError::DuplicateParents);
        }
    }

    Ok(())
}
