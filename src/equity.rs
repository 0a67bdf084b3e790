use itertools::Itertools;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::error::EngineResult;
use crate::hand_evaluator::evaluate_hand;
use crate::rng::TableRng;
use crate::state::{Phase, State};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquityMethod {
    /// Every remaining runout enumerated.
    Exact,
    /// Seeded sampling of runouts.
    MonteCarlo,
    /// No runout needed: lone live hand or completed pot.
    Settled,
}

/// Win chances for one seat, assuming no further folds and a uniform
/// runout. `equity` counts ties at `1/k`; `win_prob` counts only outright
/// wins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeatEquity {
    pub seat_id: usize,
    pub considered: bool,
    pub method: EquityMethod,
    pub equity: f64,
    pub win_prob: f64,
    pub tie_prob: f64,
    pub trials: u64,
}

impl SeatEquity {
    fn out(seat_id: usize, method: EquityMethod) -> SeatEquity {
        SeatEquity {
            seat_id,
            considered: false,
            method,
            equity: 0.0,
            win_prob: 0.0,
            tie_prob: 0.0,
            trials: 0,
        }
    }
}

fn binomial(n: u64, k: u64) -> u64 {
    let k = k.min(n - k.min(n));
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc * (n - i) as u128 / (i + 1) as u128;
    }
    acc.min(u64::MAX as u128) as u64
}

/// Estimates each live seat's chance of winning the hand from `state`.
///
/// Runouts come from the state's actual remaining deck. The full space is
/// enumerated lexicographically while it fits `exact_combo_limit`; beyond
/// that, `monte_carlo_samples` runouts are drawn through a subordinate RNG
/// seeded from the table RNG state, so the estimate is reproducible and
/// the table's own stream is left untouched.
pub fn estimate_equity(state: &State) -> EngineResult<Vec<SeatEquity>> {
    // A finished hand reports realized shares.
    if let Phase::Complete { winners } = &state.phase {
        let total: u64 = winners.iter().map(|w| w.amount).sum();
        return Ok(state
            .players
            .iter()
            .map(|p| {
                let won = winners
                    .iter()
                    .find(|w| w.seat_id == p.seat_id)
                    .map(|w| w.amount)
                    .unwrap_or(0);
                SeatEquity {
                    seat_id: p.seat_id,
                    considered: won > 0,
                    method: EquityMethod::Settled,
                    equity: if total > 0 { won as f64 / total as f64 } else { 0.0 },
                    win_prob: if total > 0 { won as f64 / total as f64 } else { 0.0 },
                    tie_prob: 0.0,
                    trials: 0,
                }
            })
            .collect());
    }

    let (board, deck): (&[Card], &[Card]) = match &state.phase {
        Phase::Betting(b) => (&b.board, b.deck.remaining()),
        Phase::Showdown { board, .. } => (board, &[]),
        _ => (&[], &[]),
    };

    let considered: Vec<usize> = state
        .players
        .iter()
        .filter(|p| !p.folded && p.hole.is_some())
        .map(|p| p.seat_id)
        .collect();

    if considered.len() <= 1 {
        return Ok(state
            .players
            .iter()
            .map(|p| {
                if considered.contains(&p.seat_id) {
                    SeatEquity {
                        seat_id: p.seat_id,
                        considered: true,
                        method: EquityMethod::Settled,
                        equity: 1.0,
                        win_prob: 1.0,
                        tie_prob: 0.0,
                        trials: 0,
                    }
                } else {
                    SeatEquity::out(p.seat_id, EquityMethod::Settled)
                }
            })
            .collect());
    }

    let needed = 5 - board.len();
    let combos = binomial(deck.len() as u64, needed as u64);

    let mut wins = vec![0u64; considered.len()];
    let mut ties = vec![0u64; considered.len()];
    let mut credit = vec![0f64; considered.len()];
    let mut trials = 0u64;

    let mut run_completion = |runout: &[Card]| -> EngineResult<()> {
        let mut full_board: Vec<Card> = Vec::with_capacity(5);
        full_board.extend_from_slice(board);
        full_board.extend_from_slice(runout);

        let mut best = 0u32;
        let mut best_idx: Vec<usize> = Vec::new();
        for (i, &seat) in considered.iter().enumerate() {
            let hole = state.players[seat].hole.as_ref().unwrap();
            let score = evaluate_hand(hole, &full_board)?.score;
            if best_idx.is_empty() || score > best {
                best = score;
                best_idx = vec![i];
            } else if score == best {
                best_idx.push(i);
            }
        }
        let k = best_idx.len();
        for &i in &best_idx {
            credit[i] += 1.0 / k as f64;
            if k == 1 {
                wins[i] += 1;
            } else {
                ties[i] += 1;
            }
        }
        trials += 1;
        Ok(())
    };

    let method = if combos <= state.exact_combo_limit {
        for combo in deck.iter().copied().combinations(needed) {
            run_completion(&combo)?;
        }
        EquityMethod::Exact
    } else {
        let mut rng = TableRng::new(state.rng.get_state());
        for _ in 0..state.monte_carlo_samples {
            let runout: Vec<Card> = deck
                .choose_multiple(&mut rng, needed)
                .copied()
                .collect();
            run_completion(&runout)?;
        }
        EquityMethod::MonteCarlo
    };

    let mut by_seat = vec![SeatEquity::out(0, method); state.players.len()];
    for (seat_id, row) in by_seat.iter_mut().enumerate() {
        row.seat_id = seat_id;
    }
    for (i, &seat) in considered.iter().enumerate() {
        by_seat[seat] = SeatEquity {
            seat_id: seat,
            considered: true,
            method,
            equity: credit[i] / trials as f64,
            win_prob: wins[i] as f64 / trials as f64,
            tie_prob: ties[i] as f64 / trials as f64,
            trials,
        };
    }
    Ok(by_seat)
}
