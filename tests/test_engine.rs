use std::collections::HashSet;

use holdem_engine::cards::Card;
use holdem_engine::error::EngineError;
use holdem_engine::reducer::{advance_until_decision, create_table, is_betting_decision, reduce};
use holdem_engine::state::{Action, Move, Phase, State, TableConfig};

fn table(seats: usize, starting_stack: u64, big_blind: u64, seed: u32) -> State {
    create_table(&TableConfig {
        seats,
        starting_stack,
        big_blind,
        seed: Some(seed),
        ..TableConfig::default()
    })
    .unwrap()
}

/// Applies one player move, then auto-advances to the next decision point.
fn play(state: &State, seat: usize, mv: Move) -> State {
    let s = reduce(state, Action::PlayerMove { seat, mv }).unwrap();
    advance_until_decision(&s).unwrap()
}

fn total_on_table(state: &State) -> u64 {
    state.total_chips()
}

// -- create_table validation --

#[test]
fn test_create_table_rejects_bad_configs() {
    let too_few = TableConfig {
        seats: 1,
        ..TableConfig::default()
    };
    assert!(matches!(
        create_table(&too_few),
        Err(EngineError::SeatCountOutOfRange(1))
    ));

    let too_many = TableConfig {
        seats: 10,
        ..TableConfig::default()
    };
    assert!(create_table(&too_many).is_err());

    let no_blind = TableConfig {
        big_blind: 0,
        ..TableConfig::default()
    };
    assert!(matches!(
        create_table(&no_blind),
        Err(EngineError::NonPositiveBlind)
    ));

    let no_stack = TableConfig {
        starting_stack: 0,
        ..TableConfig::default()
    };
    assert!(matches!(
        create_table(&no_stack),
        Err(EngineError::NonPositiveStack)
    ));
}

#[test]
fn test_create_table_starts_in_init() {
    let state = table(6, 1000, 100, 1);
    assert_eq!(state.phase, Phase::Init);
    assert_eq!(state.players.len(), 6);
    assert!(state.players.iter().all(|p| p.stack == 1000));
}

// -- dealing --

#[test]
fn test_advance_reaches_a_preflop_decision() {
    let state = advance_until_decision(&table(3, 1000, 100, 7)).unwrap();
    assert_eq!(state.phase.token(), "PREFLOP");
    assert!(is_betting_decision(&state));

    // Blinds are posted: dealer 0, SB 1, BB 2, UTG (seat 0) to act.
    assert_eq!(state.players[1].street_bet, 50);
    assert_eq!(state.players[2].street_bet, 100);
    let betting = state.betting().unwrap();
    assert_eq!(betting.to_act, 0);
    assert_eq!(betting.target_bet, 100);
}

#[test]
fn test_every_funded_seat_gets_two_unique_cards() {
    let state = advance_until_decision(&table(9, 1000, 100, 42)).unwrap();
    let mut seen: HashSet<Card> = HashSet::new();
    for p in &state.players {
        let hole = p.hole.unwrap();
        assert!(seen.insert(hole[0]));
        assert!(seen.insert(hole[1]));
    }
    let betting = state.betting().unwrap();
    for c in betting.deck.remaining() {
        assert!(seen.insert(*c));
    }
    assert_eq!(seen.len(), 52);
    assert_eq!(betting.deck.len(), 52 - 18);
}

// -- heads-up raise and call closes preflop --

#[test]
fn test_heads_up_raise_call_reaches_flop() {
    let state = advance_until_decision(&table(2, 1000, 100, 11)).unwrap();
    // Heads-up: button posts the small blind and acts first preflop.
    assert_eq!(state.betting().unwrap().to_act, 0);

    let state = play(&state, 0, Move::RaiseTo(200));
    let state = play(&state, 1, Move::Call);

    assert_eq!(state.phase.token(), "FLOP");
    let betting = state.betting().unwrap();
    assert_eq!(betting.board.len(), 3);
    assert_eq!(betting.pots.len(), 1);
    assert_eq!(betting.pots[0].amount, 400);
    assert!(state.players.iter().all(|p| p.street_bet == 0));
    // Big blind acts first postflop heads-up.
    assert_eq!(betting.to_act, 1);
}

// -- three-way limp-limp-check closes preflop --

#[test]
fn test_three_way_limped_pot_reaches_flop() {
    let state = advance_until_decision(&table(3, 1000, 100, 13)).unwrap();
    let state = play(&state, 0, Move::Call); // UTG
    let state = play(&state, 1, Move::Call); // SB completes
    let state = play(&state, 2, Move::Check); // BB option

    assert_eq!(state.phase.token(), "FLOP");
    let betting = state.betting().unwrap();
    assert_eq!(betting.pots[0].amount, 300);
    assert_eq!(betting.pots[0].eligible.len(), 3);
    // Small blind acts first postflop.
    assert_eq!(betting.to_act, 1);
}

// -- heads-up shove and call fast-forwards --

#[test]
fn test_heads_up_all_in_fast_forwards_to_complete() {
    let state = advance_until_decision(&table(2, 200, 100, 17)).unwrap();
    let state = play(&state, 0, Move::RaiseTo(200));
    assert!(state.players[0].all_in);
    let state = play(&state, 1, Move::Call);

    assert_eq!(state.phase.token(), "COMPLETE");
    let Phase::Complete { winners } = &state.phase else {
        panic!("expected COMPLETE");
    };
    let paid: u64 = winners.iter().map(|w| w.amount).sum();
    assert_eq!(paid, 400);
    assert_eq!(state.players.iter().map(|p| p.stack).sum::<u64>(), 400);
}

// -- side pot with a short stack --

#[test]
fn test_short_stack_builds_main_and_side_pots() {
    let mut state = table(3, 300, 20, 23);
    state.players[0].stack = 100;
    let state = advance_until_decision(&state).unwrap();

    // UTG (seat 0) jams 100, SB jams 300, BB calls all-in behind.
    let state = reduce(&state, Action::PlayerMove { seat: 0, mv: Move::RaiseTo(100) }).unwrap();
    let state = reduce(&state, Action::PlayerMove { seat: 1, mv: Move::RaiseTo(300) }).unwrap();
    let state = reduce(&state, Action::PlayerMove { seat: 2, mv: Move::Call }).unwrap();
    let state = reduce(&state, Action::RoundComplete).unwrap();

    // Everyone is all-in: the board runs out and the hand stops at showdown.
    let Phase::Showdown { board, pots } = &state.phase else {
        panic!("expected SHOWDOWN, got {}", state.phase.token());
    };
    assert_eq!(board.len(), 5);
    assert_eq!(pots.len(), 2);
    assert_eq!(pots[0].amount, 300);
    assert_eq!(pots[0].eligible, [0, 1, 2].into_iter().collect());
    assert_eq!(pots[1].amount, 400);
    assert_eq!(pots[1].eligible, [1, 2].into_iter().collect());

    // Distribution pays out every chip.
    let state = advance_until_decision(&state).unwrap();
    assert_eq!(state.phase.token(), "COMPLETE");
    assert_eq!(state.players.iter().map(|p| p.stack).sum::<u64>(), 700);
}

// -- determinism --

#[test]
fn test_identical_seeds_replay_identically() {
    let script = |mut state: State| -> State {
        state = advance_until_decision(&state).unwrap();
        while is_betting_decision(&state) {
            let betting = state.betting().unwrap();
            let seat = betting.to_act;
            let to_call = betting.target_bet - state.players[seat].street_bet;
            let mv = if to_call == 0 { Move::Check } else { Move::Call };
            state = play(&state, seat, mv);
        }
        state
    };

    let a = script(table(4, 1000, 100, 123));
    let b = script(table(4, 1000, 100, 123));
    assert_eq!(a, b);
    assert_eq!(a.phase.token(), "COMPLETE");

    let c = script(table(4, 1000, 100, 124));
    assert!(c == c.clone());
    // A different seed deals a different hand.
    assert_ne!(a.players, c.players);
}

// -- fold-win fast path --

#[test]
fn test_everyone_folds_to_the_big_blind() {
    let state = advance_until_decision(&table(3, 1000, 100, 29)).unwrap();
    let state = play(&state, 0, Move::Fold);
    let state = play(&state, 1, Move::Fold);

    assert_eq!(state.phase.token(), "COMPLETE");
    let Phase::Complete { winners } = &state.phase else {
        panic!("expected COMPLETE");
    };
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].seat_id, 2);
    assert_eq!(winners[0].amount, 150);
    assert_eq!(state.players[2].stack, 1050);
}

#[test]
fn test_bet_takes_it_down_postflop() {
    let state = advance_until_decision(&table(2, 1000, 100, 31)).unwrap();
    let state = play(&state, 0, Move::Call);
    let state = play(&state, 1, Move::Check);
    assert_eq!(state.phase.token(), "FLOP");

    let state = play(&state, 1, Move::RaiseTo(150));
    let state = play(&state, 0, Move::Fold);
    assert_eq!(state.phase.token(), "COMPLETE");
    assert_eq!(state.players[1].stack, 1100);
}

// -- betting rules through the reducer --

#[test]
fn test_big_blind_cannot_fold_unopened_pot() {
    let state = advance_until_decision(&table(2, 1000, 100, 37)).unwrap();
    let state = play(&state, 0, Move::Call);
    let err = reduce(&state, Action::PlayerMove { seat: 1, mv: Move::Fold }).unwrap_err();
    assert!(matches!(err, EngineError::FoldNotAllowed));
    // The state is untouched; the big blind can still check it through.
    let state = play(&state, 1, Move::Check);
    assert_eq!(state.phase.token(), "FLOP");
}

#[test]
fn test_below_minimum_reraise_is_rejected() {
    let state = advance_until_decision(&table(3, 1000, 100, 41)).unwrap();
    let state = play(&state, 0, Move::RaiseTo(300));
    let err = reduce(&state, Action::PlayerMove { seat: 1, mv: Move::RaiseTo(400) }).unwrap_err();
    assert!(matches!(
        err,
        EngineError::RaiseBelowMinimum { minimum: 500, .. }
    ));
}

#[test]
fn test_out_of_turn_move_is_rejected() {
    let state = advance_until_decision(&table(3, 1000, 100, 43)).unwrap();
    let err = reduce(&state, Action::PlayerMove { seat: 2, mv: Move::Call }).unwrap_err();
    assert!(matches!(err, EngineError::OutOfTurn { expected: 0, got: 2 }));
}

#[test]
fn test_check_facing_a_bet_is_rejected() {
    let state = advance_until_decision(&table(2, 1000, 100, 47)).unwrap();
    let err = reduce(&state, Action::PlayerMove { seat: 0, mv: Move::Check }).unwrap_err();
    assert!(matches!(err, EngineError::CheckFacingBet { to_call: 50 }));
}

#[test]
fn test_raise_past_stack_clamps_to_all_in() {
    let state = advance_until_decision(&table(2, 500, 100, 53)).unwrap();
    let state = play(&state, 0, Move::RaiseTo(10_000));
    assert!(state.players[0].all_in);
    assert_eq!(state.players[0].lifetime_contributed, 500);
}

// -- phase-irrelevant actions are fixed points --

#[test]
fn test_phase_mismatched_actions_are_noops() {
    let init = table(3, 1000, 100, 59);
    for action in [
        Action::DealCards,
        Action::RoundComplete,
        Action::ProceedToShowdown,
        Action::NextHand,
    ] {
        assert_eq!(reduce(&init, action).unwrap(), init);
    }

    let preflop = advance_until_decision(&init).unwrap();
    for action in [
        Action::StartHand,
        Action::DealCards,
        Action::ProceedToShowdown,
        Action::NextHand,
    ] {
        assert_eq!(reduce(&preflop, action).unwrap(), preflop);
    }
    // A closed-round settle is also a no-op while the round is open.
    assert_eq!(reduce(&preflop, Action::RoundComplete).unwrap(), preflop);
}

// -- chip conservation and flag stickiness across a scripted hand --

#[test]
fn test_chip_conservation_every_step() {
    let mut state = advance_until_decision(&table(4, 1000, 100, 61)).unwrap();
    assert_eq!(total_on_table(&state), 4000);

    let mut folded_so_far: HashSet<usize> = HashSet::new();
    while is_betting_decision(&state) {
        let betting = state.betting().unwrap();
        let seat = betting.to_act;
        let to_call = betting.target_bet - state.players[seat].street_bet;
        // Seat 3 folds when facing chips, everyone else calls it down.
        let mv = if to_call == 0 {
            Move::Check
        } else if seat == 3 {
            Move::Fold
        } else {
            Move::Call
        };
        let before: Vec<u64> = state
            .players
            .iter()
            .map(|p| p.lifetime_contributed)
            .collect();
        state = play(&state, seat, mv);
        assert_eq!(total_on_table(&state), 4000);
        for (p, prior) in state.players.iter().zip(before) {
            assert!(p.lifetime_contributed >= prior);
        }
        for &f in &folded_so_far {
            assert!(state.players[f].folded);
        }
        if mv == Move::Fold {
            folded_so_far.insert(seat);
        }
    }
    assert_eq!(state.phase.token(), "COMPLETE");
    assert_eq!(state.players.iter().map(|p| p.stack).sum::<u64>(), 4000);
}

// -- hand-to-hand lifecycle --

#[test]
fn test_next_hand_rotates_the_button() {
    let state = advance_until_decision(&table(3, 1000, 100, 67)).unwrap();
    let state = play(&state, 0, Move::Fold);
    let state = play(&state, 1, Move::Fold);
    assert_eq!(state.phase.token(), "COMPLETE");
    assert_eq!(state.dealer, 0);

    let state = reduce(&state, Action::NextHand).unwrap();
    assert_eq!(state.dealer, 1);
    assert_eq!(state.phase.token(), "DEAL");
    assert!(state.players.iter().all(|p| !p.folded && p.hole.is_none()));

    let state = advance_until_decision(&state).unwrap();
    // Dealer 1: SB 2, BB 0, UTG 1 opens.
    assert_eq!(state.betting().unwrap().to_act, 1);
}

#[test]
fn test_busted_seat_is_skipped_next_hand() {
    let state = advance_until_decision(&table(3, 200, 100, 71)).unwrap();
    // Seat 0 jams, the blinds call; all three stacks go in.
    let state = play(&state, 0, Move::RaiseTo(200));
    let state = play(&state, 1, Move::Call);
    let state = play(&state, 2, Move::Call);
    assert_eq!(state.phase.token(), "COMPLETE");

    let busted: Vec<usize> = state
        .players
        .iter()
        .filter(|p| p.stack == 0)
        .map(|p| p.seat_id)
        .collect();
    if busted.is_empty() {
        // Three-way chop: nobody went broke, nothing to skip.
        return;
    }

    match reduce(&state, Action::NextHand) {
        Ok(next) => {
            assert!(next.players[next.dealer].stack > 0);
            let next = advance_until_decision(&next).unwrap();
            for &seat in &busted {
                assert!(next.players[seat].hole.is_none());
                assert_eq!(next.players[seat].stack, 0);
            }
        }
        // A single survivor scooping everything ends the session instead.
        Err(EngineError::NotEnoughPlayers) => {
            assert_eq!(busted.len(), 2);
        }
        Err(e) => panic!("unexpected error: {e}"),
    }
}

#[test]
fn test_heads_up_bust_cannot_continue() {
    let state = advance_until_decision(&table(2, 200, 100, 73)).unwrap();
    let state = play(&state, 0, Move::RaiseTo(200));
    let state = play(&state, 1, Move::Call);
    assert_eq!(state.phase.token(), "COMPLETE");
    let Phase::Complete { winners } = &state.phase else {
        panic!("expected COMPLETE");
    };
    if winners.len() > 1 {
        // Chopped pot: both seats are still funded.
        return;
    }
    // One seat holds all 400 chips now.
    assert!(matches!(
        reduce(&state, Action::NextHand),
        Err(EngineError::NotEnoughPlayers)
    ));
}

// -- re-raise keeps the round open until action returns --

#[test]
fn test_reraise_reopens_action_for_the_opener() {
    let state = advance_until_decision(&table(3, 5000, 100, 79)).unwrap();
    let state = play(&state, 0, Move::RaiseTo(300));
    let state = play(&state, 1, Move::RaiseTo(900));
    let state = play(&state, 2, Move::Fold);
    // Back on the opener: still preflop, facing the three-bet.
    assert_eq!(state.phase.token(), "PREFLOP");
    assert_eq!(state.betting().unwrap().to_act, 0);
    let state = play(&state, 0, Move::Call);
    assert_eq!(state.phase.token(), "FLOP");
    assert_eq!(state.betting().unwrap().pots[0].amount, 1900);
}

#[test]
fn test_short_all_in_does_not_reopen_the_opener() {
    let mut state = table(3, 1000, 100, 83);
    state.players[1].stack = 450;
    let state = advance_until_decision(&state).unwrap();

    // Opener raises to 300; SB jams 450, short of the 500 minimum.
    let state = play(&state, 0, Move::RaiseTo(300));
    let state = play(&state, 1, Move::RaiseTo(450));
    let state = play(&state, 2, Move::Fold);

    // The opener may call or fold but not re-raise.
    let err = reduce(&state, Action::PlayerMove { seat: 0, mv: Move::RaiseTo(900) }).unwrap_err();
    assert!(matches!(err, EngineError::RaiseNotReopened));
    let state = play(&state, 0, Move::Call);
    // Both live stacks matched at 450: betting is done for the street.
    assert_ne!(state.phase.token(), "PREFLOP");
}
