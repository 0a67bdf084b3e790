use serde::{Deserialize, Serialize};

use crate::cards::{Card, Deck};
use crate::pot::{Payout, Pot};
use crate::rng::TableRng;

/// A seat at the table. Seats are never removed; an eliminated seat keeps
/// its `seat_id` with a zero stack and is skipped by every position scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub seat_id: usize,
    pub stack: u64,
    /// Chips committed on the current street. Reset at street settlement.
    pub street_bet: u64,
    /// Chips committed across the whole hand. Monotone; drives pot layering.
    pub lifetime_contributed: u64,
    pub folded: bool,
    pub all_in: bool,
    pub hole: Option<[Card; 2]>,
}

impl Player {
    pub fn new(seat_id: usize, stack: u64) -> Player {
        Player {
            seat_id,
            stack,
            street_bet: 0,
            lifetime_contributed: 0,
            folded: false,
            all_in: false,
            hole: None,
        }
    }

    /// Neither folded nor all-in: the seat can still make a decision.
    pub fn can_act(&self) -> bool {
        !self.folded && !self.all_in
    }

    pub fn has_chips(&self) -> bool {
        self.stack > 0
    }

    /// Moves up to `amount` from the stack into the current street.
    /// Returns the chips actually paid; going to zero marks the seat all-in.
    pub fn commit(&mut self, amount: u64) -> u64 {
        let paid = amount.min(self.stack);
        self.stack -= paid;
        self.street_bet += paid;
        self.lifetime_contributed += paid;
        if self.stack == 0 && self.lifetime_contributed > 0 {
            self.all_in = true;
        }
        paid
    }

    pub fn reset_for_hand(&mut self) {
        self.street_bet = 0;
        self.lifetime_contributed = 0;
        self.folded = false;
        self.all_in = false;
        self.hole = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    pub fn token(self) -> &'static str {
        match self {
            Street::Preflop => "PREFLOP",
            Street::Flop => "FLOP",
            Street::Turn => "TURN",
            Street::River => "RIVER",
        }
    }

    pub fn next(self) -> Option<Street> {
        match self {
            Street::Preflop => Some(Street::Flop),
            Street::Flop => Some(Street::Turn),
            Street::Turn => Some(Street::River),
            Street::River => None,
        }
    }

    /// Community cards revealed when this street begins.
    pub fn cards_dealt_on_entry(self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 3,
            Street::Turn => 1,
            Street::River => 1,
        }
    }
}

/// Controller state for one betting round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Betting {
    pub street: Street,
    pub board: Vec<Card>,
    pub pots: Vec<Pot>,
    pub deck: Deck,
    pub to_act: usize,
    /// Seat that opened the round of action.
    pub round_start: usize,
    /// Seat that made the last full raise or opening bet.
    pub last_aggressor: Option<usize>,
    /// Highest current-street commitment.
    pub target_bet: u64,
    /// Size of the last legal raise; starts at the big blind each street.
    pub last_raise_size: u64,
    /// True iff the most recent aggressive action was a full legal raise.
    pub action_reopened: bool,
    /// Player moves taken this street. A round never closes on zero moves
    /// while anyone can still act.
    pub moves: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    Init,
    Deal {
        deck: Deck,
    },
    Betting(Betting),
    Showdown {
        board: Vec<Card>,
        pots: Vec<Pot>,
    },
    Complete {
        winners: Vec<Payout>,
    },
}

impl Phase {
    pub fn token(&self) -> &'static str {
        match self {
            Phase::Init => "INIT",
            Phase::Deal { .. } => "DEAL",
            Phase::Betting(b) => b.street.token(),
            Phase::Showdown { .. } => "SHOWDOWN",
            Phase::Complete { .. } => "COMPLETE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    Fold,
    Check,
    Call,
    /// Absolute new street commitment target, not the increment.
    RaiseTo(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    StartHand,
    DealCards,
    PlayerMove { seat: usize, mv: Move },
    RoundComplete,
    ProceedToShowdown,
    NextHand,
}

/// Options recognized by `create_table`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub seats: usize,
    pub starting_stack: u64,
    pub big_blind: u64,
    /// RNG seed; derived from the wallclock when absent.
    pub seed: Option<u32>,
    /// Equity switches to Monte Carlo above this many runout combinations.
    pub exact_combo_limit: u64,
    pub monte_carlo_samples: u64,
}

impl Default for TableConfig {
    fn default() -> TableConfig {
        TableConfig {
            seats: 6,
            starting_stack: 10_000,
            big_blind: 100,
            seed: None,
            exact_combo_limit: 100_000,
            monte_carlo_samples: 20_000,
        }
    }
}

/// The whole engine state. Fields here are valid in every phase; everything
/// phase-specific lives inside the `Phase` tagged union.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub players: Vec<Player>,
    pub big_blind: u64,
    pub dealer: usize,
    pub rng: TableRng,
    pub exact_combo_limit: u64,
    pub monte_carlo_samples: u64,
    pub phase: Phase,
}

impl State {
    /// Small blind under integer halving; a big blind of 1 posts nothing.
    pub fn small_blind(&self) -> u64 {
        self.big_blind / 2
    }

    pub fn betting(&self) -> Option<&Betting> {
        match &self.phase {
            Phase::Betting(b) => Some(b),
            _ => None,
        }
    }

    /// Chips on the table: stacks plus pots plus live street bets.
    /// Constant across a hand (chip conservation).
    pub fn total_chips(&self) -> u64 {
        let stacks: u64 = self.players.iter().map(|p| p.stack).sum();
        let street: u64 = self.players.iter().map(|p| p.street_bet).sum();
        let pots: u64 = match &self.phase {
            Phase::Betting(b) => b.pots.iter().map(|p| p.amount).sum(),
            Phase::Showdown { pots, .. } => pots.iter().map(|p| p.amount).sum(),
            _ => 0,
        };
        stacks + street + pots
    }
}
