use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::error::EngineResult;
use crate::hand_evaluator::evaluate_hand;
use crate::state::Player;

/// One pot layer. Eligibility is fixed when the layer closes; only
/// non-folded eligible seats can win it at showdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pot {
    pub amount: u64,
    pub eligible: BTreeSet<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub seat_id: usize,
    pub amount: u64,
}

/// Folds the current street's bets into the pot list.
///
/// Contributions are peeled in ascending layers: each pass takes the
/// smallest live bet as the layer cap, collects up to that cap from every
/// seat, and closes a layer eligible to exactly the live contributors.
/// Folded chips count toward the layer amounts but never toward
/// eligibility. A layer whose eligibility matches the previous pot merges
/// into it instead of opening a side pot.
pub fn settle_street(players: &mut [Player], pots: &mut Vec<Pot>) {
    loop {
        let cap = players
            .iter()
            .filter(|p| !p.folded && p.street_bet > 0)
            .map(|p| p.street_bet)
            .min();
        let Some(cap) = cap else { break };

        let mut amount = 0u64;
        let mut eligible = BTreeSet::new();
        for p in players.iter_mut() {
            let take = p.street_bet.min(cap);
            if take == 0 {
                continue;
            }
            p.street_bet -= take;
            amount += take;
            if !p.folded {
                eligible.insert(p.seat_id);
            }
        }

        match pots.last_mut() {
            Some(last) if last.eligible == eligible => last.amount += amount,
            _ => pots.push(Pot { amount, eligible }),
        }
    }

    // Folded chips above every live bet have no layer of their own; they
    // sweep into the top pot.
    let leftover: u64 = players
        .iter_mut()
        .map(|p| std::mem::take(&mut p.street_bet))
        .sum();
    if leftover > 0 {
        if let Some(last) = pots.last_mut() {
            last.amount += leftover;
        } else {
            let eligible = players
                .iter()
                .filter(|p| !p.folded)
                .map(|p| p.seat_id)
                .collect();
            pots.push(Pot {
                amount: leftover,
                eligible,
            });
        }
    }
}

pub fn pot_total(pots: &[Pot]) -> u64 {
    pots.iter().map(|p| p.amount).sum()
}

/// Clockwise distance from the seat left of the button.
fn left_of_button_order(seat: usize, dealer: usize, n: usize) -> usize {
    (seat + n - (dealer + 1) % n) % n
}

/// Splits every pot among its best live eligible hands.
///
/// Each pot is resolved independently: the eligible non-folded seats'
/// seven-card scores are compared, the top scorers split the floor share,
/// and remainder chips go one per winning seat clockwise starting left of
/// the button. The distributed total always equals the pot total.
pub fn distribute(
    pots: &[Pot],
    players: &[Player],
    board: &[Card],
    dealer: usize,
) -> EngineResult<Vec<Payout>> {
    let n = players.len();
    let mut won = vec![0u64; n];

    for pot in pots {
        let mut contenders: Vec<usize> = pot
            .eligible
            .iter()
            .copied()
            .filter(|&s| !players[s].folded && players[s].hole.is_some())
            .collect();
        if contenders.is_empty() {
            // Every eligible seat folded after the layer closed; the pot
            // falls to the remaining live seats.
            contenders = players
                .iter()
                .filter(|p| !p.folded && p.hole.is_some())
                .map(|p| p.seat_id)
                .collect();
        }

        let mut best_score = 0u32;
        let mut winners: Vec<usize> = Vec::new();
        for &seat in &contenders {
            let hole = players[seat].hole.as_ref().unwrap();
            let result = evaluate_hand(hole, board)?;
            if winners.is_empty() || result.score > best_score {
                best_score = result.score;
                winners = vec![seat];
            } else if result.score == best_score {
                winners.push(seat);
            }
        }

        winners.sort_by_key(|&s| left_of_button_order(s, dealer, n));
        let k = winners.len() as u64;
        let share = pot.amount / k;
        let remainder = (pot.amount % k) as usize;
        for (i, &seat) in winners.iter().enumerate() {
            won[seat] += share + if i < remainder { 1 } else { 0 };
        }
    }

    Ok(players
        .iter()
        .filter(|p| won[p.seat_id] > 0)
        .map(|p| Payout {
            seat_id: p.seat_id,
            amount: won[p.seat_id],
        })
        .collect())
}
