//! Proposer selection and turn progression integration tests

use proptest::prelude::*;
use weft_consensus::{
    current_turn, is_valid_turn_progression, proposer_for_turn, ProposalSummary, Validators,
    TURN_TIMEOUT_FRAMES,
};

#[test]
fn test_insertion_order_does_not_matter() {
    let entries = [(4, 10), (1, 10), (3, 10), (2, 10), (5, 10)];
    let mut reversed = entries;
    reversed.reverse();
    let mut rotated = entries;
    rotated.rotate_left(2);

    let a = Validators::new(entries).unwrap();
    let b = Validators::new(reversed).unwrap();
    let c = Validators::new(rotated).unwrap();

    for turn in 0..1_000 {
        let expected = proposer_for_turn(turn, &a).unwrap();
        assert_eq!(proposer_for_turn(turn, &b).unwrap(), expected);
        assert_eq!(proposer_for_turn(turn, &c).unwrap(), expected);
    }
}

#[test]
fn test_selection_proportional_to_weight() {
    let validators = Validators::new([(1, 10), (2, 20), (3, 30), (4, 40)]).unwrap();
    let turns = 100_000u32;
    let mut counts = [0u32; 4];
    for turn in 0..turns {
        let id = proposer_for_turn(turn, &validators).unwrap();
        counts[(id - 1) as usize] += 1;
    }

    for (index, count) in counts.iter().enumerate() {
        let expected = (index as f64 + 1.0) / 10.0;
        let share = *count as f64 / turns as f64;
        assert!(
            (share - expected).abs() < 0.003,
            "validator {} got share {} expected {}",
            index + 1,
            share,
            expected
        );
    }
}

#[test]
fn test_every_validator_gets_turns() {
    let validators = Validators::new((1..=20).map(|id| (id, 1))).unwrap();
    let mut seen = std::collections::BTreeSet::new();
    for turn in 0..2_000 {
        seen.insert(proposer_for_turn(turn, &validators).unwrap());
    }
    assert_eq!(seen.len(), 20);
}

#[test]
fn test_progression_boundaries() {
    let timeout = TURN_TIMEOUT_FRAMES as u32;
    let last = ProposalSummary::new(1, 1);
    assert!(is_valid_turn_progression(
        last,
        ProposalSummary::new(3, 1 + timeout)
    ));
    assert!(!is_valid_turn_progression(
        last,
        ProposalSummary::new(3, 1 + timeout - 1)
    ));
    assert!(!is_valid_turn_progression(last, ProposalSummary::new(1, 2)));
}

#[test]
fn test_progression_no_overflow() {
    assert!(!is_valid_turn_progression(
        ProposalSummary::new(0, 1),
        ProposalSummary::new(u32::MAX, 2)
    ));
}

proptest! {
    #[test]
    fn selected_validator_is_a_member(
        turn in any::<u32>(),
        weights in proptest::collection::vec(0u64..1_000, 1..16),
    ) {
        let validators = Validators::new(
            weights.iter().enumerate().map(|(i, w)| (i as u32 * 3, *w)),
        ).unwrap();
        match proposer_for_turn(turn, &validators) {
            Ok(id) => prop_assert!(validators.weight(id).is_some_and(|w| w > 0)),
            Err(_) => prop_assert!(validators.is_empty()),
        }
    }

    #[test]
    fn progression_never_panics(
        last_turn in any::<u32>(),
        last_frame in any::<u32>(),
        next_turn in any::<u32>(),
        next_frame in any::<u32>(),
    ) {
        let last = ProposalSummary::new(last_turn, last_frame);
        let next = ProposalSummary::new(next_turn, next_frame);
        let valid = is_valid_turn_progression(last, next);
        if next_turn <= last_turn {
            prop_assert!(!valid);
        }
    }

    #[test]
    fn waiting_longer_never_invalidates(
        last_turn in 0u32..1_000_000,
        last_frame in 0u32..1_000_000,
        skip in 0u32..100,
        frame_gap in 0u32..2_000,
        extra in 0u32..1_000,
    ) {
        let last = ProposalSummary::new(last_turn, last_frame);
        let next = ProposalSummary::new(last_turn + 1 + skip, last_frame + frame_gap);
        let later = ProposalSummary::new(next.turn, next.frame + extra);
        if is_valid_turn_progression(last, next) {
            prop_assert!(is_valid_turn_progression(last, later));
        }
    }

    #[test]
    fn current_turn_is_highest_valid(
        last_turn in 0u32..1_000_000,
        last_frame in 0u32..1_000_000,
        frame_gap in 1u32..10_000,
    ) {
        let last = ProposalSummary::new(last_turn, last_frame);
        let frame = last_frame + frame_gap;
        let turn = current_turn(last, frame).unwrap();
        prop_assert!(is_valid_turn_progression(last, ProposalSummary::new(turn, frame)));
        prop_assert!(!is_valid_turn_progression(last, ProposalSummary::new(turn + 1, frame)));
    }
}
