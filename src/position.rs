use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::state::Player;

/// Blind and first-to-act assignments for one hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Positions {
    pub button: usize,
    pub small_blind: usize,
    pub big_blind: usize,
    pub first_preflop: usize,
    pub first_postflop: usize,
}

/// Next seat clockwise from `from` (exclusive) with chips, wrapping.
/// Falls back to `from` when no other seat is funded, which callers rule
/// out by checking `funded_count` first.
pub fn next_funded_seat(players: &[Player], from: usize) -> usize {
    let n = players.len();
    for step in 1..=n {
        let seat = (from + step) % n;
        if players[seat].has_chips() || seat == from {
            return seat;
        }
    }
    from
}

/// A seat participates in the current hand if it still has chips or was
/// dealt in (an all-in seat keeps its position for the rest of the hand).
fn in_hand(p: &Player) -> bool {
    p.has_chips() || p.hole.is_some()
}

fn next_in_hand_seat(players: &[Player], from: usize) -> usize {
    let n = players.len();
    for step in 1..=n {
        let seat = (from + step) % n;
        if in_hand(&players[seat]) || seat == from {
            return seat;
        }
    }
    from
}

/// Next seat clockwise from `from` (exclusive) that can still act this
/// street (neither folded nor all-in), or None if nobody can.
pub fn next_acting_seat(players: &[Player], from: usize) -> Option<usize> {
    let n = players.len();
    (1..=n)
        .map(|step| (from + step) % n)
        .find(|&seat| players[seat].can_act())
}

pub fn funded_count(players: &[Player]) -> usize {
    players.iter().filter(|p| p.has_chips()).count()
}

/// Assigns blinds and first-to-act seats for the hand.
///
/// Heads-up the button posts the small blind and acts first preflop while
/// the big blind acts first postflop; three-handed and up the blinds sit
/// left of the button and preflop action opens under the gun. Seats without
/// chips are skipped everywhere.
///
/// The dealer index itself may point at an eliminated seat (the button
/// rotates externally); the effective button is the first funded seat at or
/// clockwise of it.
pub fn assign_positions(players: &[Player], dealer: usize) -> EngineResult<Positions> {
    let in_hand_count = players.iter().filter(|p| in_hand(p)).count();
    if in_hand_count < 2 {
        return Err(EngineError::NotEnoughPlayers);
    }
    let button = if in_hand(&players[dealer]) {
        dealer
    } else {
        next_in_hand_seat(players, dealer)
    };

    if in_hand_count == 2 {
        let other = next_in_hand_seat(players, button);
        return Ok(Positions {
            button,
            small_blind: button,
            big_blind: other,
            first_preflop: button,
            first_postflop: other,
        });
    }

    let small_blind = next_in_hand_seat(players, button);
    let big_blind = next_in_hand_seat(players, small_blind);
    let first_preflop = next_in_hand_seat(players, big_blind);
    Ok(Positions {
        button,
        small_blind,
        big_blind,
        first_preflop,
        first_postflop: small_blind,
    })
}

/// Position tag for a seat, if it holds one of the named positions.
pub fn position_tag(positions: &Positions, seat: usize) -> Option<&'static str> {
    // Heads-up the button doubles as the small blind; report BTN.
    if seat == positions.button {
        Some("BTN")
    } else if seat == positions.small_blind {
        Some("SB")
    } else if seat == positions.big_blind {
        Some("BB")
    } else {
        None
    }
}
