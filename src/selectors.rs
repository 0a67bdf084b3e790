//! Read-only derivations over the engine state for consumers. Nothing in
//! here mutates; front-ends render from these views and feed moves back
//! through the reducer.

use serde::{Deserialize, Serialize};

use crate::betting::{action_options, ActionOptions};
use crate::cards::Card;
use crate::error::EngineResult;
use crate::position::{assign_positions, position_tag};
use crate::pot::{self, Payout, Pot};
use crate::state::{Phase, State};

/// Canonical phase token: INIT, DEAL, PREFLOP, FLOP, TURN, RIVER,
/// SHOWDOWN or COMPLETE.
pub fn phase_token(state: &State) -> &'static str {
    state.phase.token()
}

pub fn board(state: &State) -> &[Card] {
    match &state.phase {
        Phase::Betting(b) => &b.board,
        Phase::Showdown { board, .. } => board,
        _ => &[],
    }
}

pub fn pots(state: &State) -> &[Pot] {
    match &state.phase {
        Phase::Betting(b) => &b.pots,
        Phase::Showdown { pots, .. } => pots,
        _ => &[],
    }
}

/// Settled pots plus chips still in front of players this street.
pub fn pot_total(state: &State) -> u64 {
    let streets: u64 = state.players.iter().map(|p| p.street_bet).sum();
    pot::pot_total(pots(state)) + streets
}

pub fn acting_seat(state: &State) -> Option<usize> {
    state.betting().map(|b| b.to_act)
}

pub fn to_call(state: &State) -> u64 {
    match state.betting() {
        Some(b) => b.target_bet.saturating_sub(state.players[b.to_act].street_bet),
        None => 0,
    }
}

/// The action-options view for the seat to act, if a betting round is
/// live.
pub fn options(state: &State) -> Option<ActionOptions> {
    state
        .betting()
        .map(|b| action_options(&state.players, b, b.to_act))
}

/// BTN/SB/BB tags by seat; None for untagged or eliminated seats.
pub fn position_tags(state: &State) -> EngineResult<Vec<Option<&'static str>>> {
    let positions = assign_positions(&state.players, state.dealer)?;
    Ok((0..state.players.len())
        .map(|seat| position_tag(&positions, seat))
        .collect())
}

/// The serialized RNG state; replaying from here reproduces the rest of
/// the session.
pub fn rng_state(state: &State) -> u32 {
    state.rng.get_state()
}

pub fn winners(state: &State) -> &[Payout] {
    match &state.phase {
        Phase::Complete { winners } => winners,
        _ => &[],
    }
}

pub fn stacks(state: &State) -> Vec<u64> {
    state.players.iter().map(|p| p.stack).collect()
}

/// One row per seat for table rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    pub seat_id: usize,
    pub stack: u64,
    pub street_bet: u64,
    pub folded: bool,
    pub all_in: bool,
    pub is_dealer: bool,
    pub is_to_act: bool,
}

pub fn seat_views(state: &State) -> Vec<SeatView> {
    let to_act = acting_seat(state);
    state
        .players
        .iter()
        .map(|p| SeatView {
            seat_id: p.seat_id,
            stack: p.stack,
            street_bet: p.street_bet,
            folded: p.folded,
            all_in: p.all_in,
            is_dealer: p.seat_id == state.dealer,
            is_to_act: to_act == Some(p.seat_id),
        })
        .collect()
}
