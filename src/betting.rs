use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::position::next_acting_seat;
use crate::state::{Betting, Move, Player, Street};

/// Raise bounds for the acting seat. `min` and `max` are raise-to totals;
/// when action is not reopened only the all-in total remains and the two
/// collapse. `unopened` distinguishes bet semantics from raise semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaiseWindow {
    pub min: u64,
    pub max: u64,
    pub unopened: bool,
}

/// The legal-action view for the seat to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOptions {
    pub seat: usize,
    pub can_fold: bool,
    pub can_check: bool,
    pub can_call: bool,
    pub to_call: u64,
    pub raise: Option<RaiseWindow>,
}

impl ActionOptions {
    pub fn any(&self) -> bool {
        self.can_fold || self.can_check || self.can_call || self.raise.is_some()
    }
}

/// Computes the legal actions for `seat` under the current round state.
///
/// Fold is barred in exactly one spot: the big blind facing an unopened
/// preflop pot (checking is free, folding would surrender the option).
/// Raising requires reopened action; a closed round still allows moving
/// all-in for the full stack.
pub fn action_options(players: &[Player], betting: &Betting, seat: usize) -> ActionOptions {
    let me = &players[seat];
    let to_call = betting.target_bet.saturating_sub(me.street_bet);
    let can_check = to_call == 0;
    let can_fold = to_call > 0 || betting.street != Street::Preflop;
    let can_call = to_call > 0 && me.stack > 0;

    let all_in_cap = me.street_bet + me.stack;
    let raise = if me.stack > 0 && all_in_cap > betting.target_bet {
        let min_raise_to = betting.target_bet + betting.last_raise_size;
        if betting.action_reopened {
            Some(RaiseWindow {
                min: min_raise_to.min(all_in_cap),
                max: all_in_cap,
                unopened: to_call == 0,
            })
        } else {
            Some(RaiseWindow {
                min: all_in_cap,
                max: all_in_cap,
                unopened: to_call == 0,
            })
        }
    } else {
        None
    };

    ActionOptions {
        seat,
        can_fold,
        can_check,
        can_call,
        to_call,
        raise,
    }
}

/// Validates and applies one player move, then rotates `to_act`.
///
/// Chip movement is all-in aware: calls and raise targets clamp to the
/// stack. A raise that meets the prior minimum is a full raise and reopens
/// action behind it; an all-in short of the minimum changes the target
/// without reopening.
pub fn apply_move(
    players: &mut [Player],
    betting: &mut Betting,
    seat: usize,
    mv: Move,
) -> EngineResult<()> {
    if seat != betting.to_act {
        return Err(EngineError::OutOfTurn {
            expected: betting.to_act,
            got: seat,
        });
    }
    let opts = action_options(players, betting, seat);

    match mv {
        Move::Fold => {
            if !opts.can_fold {
                return Err(EngineError::FoldNotAllowed);
            }
            players[seat].folded = true;
        }
        Move::Check => {
            if !opts.can_check {
                return Err(EngineError::CheckFacingBet {
                    to_call: opts.to_call,
                });
            }
        }
        Move::Call => {
            if !opts.can_call {
                return Err(EngineError::NothingToCall);
            }
            players[seat].commit(opts.to_call);
        }
        Move::RaiseTo(amount) => {
            if players[seat].stack == 0 {
                return Err(EngineError::NoChipsBehind(seat));
            }
            let all_in_cap = players[seat].street_bet + players[seat].stack;
            let prior_target = betting.target_bet;
            let min_raise_to = prior_target + betting.last_raise_size;
            // A target beyond the stack is an all-in for whatever is behind.
            let amount = amount.min(all_in_cap);
            if amount < all_in_cap {
                if !betting.action_reopened {
                    return Err(EngineError::RaiseNotReopened);
                }
                if amount <= prior_target {
                    return Err(EngineError::RaiseNotAboveTarget {
                        attempted: amount,
                        target: prior_target,
                    });
                }
                if amount < min_raise_to {
                    return Err(EngineError::RaiseBelowMinimum {
                        attempted: amount,
                        minimum: min_raise_to,
                    });
                }
            }

            let need = amount.saturating_sub(players[seat].street_bet);
            players[seat].commit(need);
            let new_bet = players[seat].street_bet;
            if new_bet > prior_target {
                betting.target_bet = new_bet;
                betting.last_raise_size = new_bet - prior_target;
            }
            if new_bet >= min_raise_to && new_bet > prior_target {
                betting.last_aggressor = Some(seat);
                betting.action_reopened = true;
            } else {
                betting.action_reopened = false;
            }
        }
    }

    betting.moves += 1;
    if let Some(next) = next_acting_seat(players, seat) {
        betting.to_act = next;
    }
    Ok(())
}

/// Whether the betting round is over.
///
/// Closes on the fold-win fast path (one live seat), when nobody can act,
/// or when every live non-all-in seat has matched the target and action
/// has come back around to the last aggressor (the round opener when the
/// street went unraised).
pub fn round_closed(players: &[Player], betting: &Betting) -> bool {
    let live = players.iter().filter(|p| !p.folded).count();
    if live <= 1 {
        return true;
    }
    if !players.iter().any(|p| p.can_act()) {
        return true;
    }
    if betting.moves == 0 {
        return false;
    }
    if players
        .iter()
        .any(|p| p.can_act() && p.street_bet != betting.target_bet)
    {
        return false;
    }

    let reference = betting.last_aggressor.unwrap_or(betting.round_start);
    let ref_active = if players[reference].can_act() {
        reference
    } else {
        match next_acting_seat(players, reference) {
            Some(seat) => seat,
            None => return true,
        }
    };
    betting.to_act == ref_active
}
