use crate::betting::{action_options, apply_move, round_closed};
use crate::cards::{Card, Deck};
use crate::error::{EngineError, EngineResult};
use crate::position::{assign_positions, funded_count, next_acting_seat, next_funded_seat};
use crate::pot::{distribute, pot_total, settle_street, Payout};
use crate::rng::TableRng;
use crate::state::{Action, Betting, Move, Phase, Player, State, Street, TableConfig};

/// Builds a table in INIT with every seat at the starting stack.
pub fn create_table(config: &TableConfig) -> EngineResult<State> {
    if !(2..=9).contains(&config.seats) {
        return Err(EngineError::SeatCountOutOfRange(config.seats));
    }
    if config.big_blind == 0 {
        return Err(EngineError::NonPositiveBlind);
    }
    if config.starting_stack == 0 {
        return Err(EngineError::NonPositiveStack);
    }
    let rng = config
        .seed
        .map(TableRng::new)
        .unwrap_or_else(TableRng::from_entropy);
    Ok(State {
        players: (0..config.seats)
            .map(|i| Player::new(i, config.starting_stack))
            .collect(),
        big_blind: config.big_blind,
        dealer: 0,
        rng,
        exact_combo_limit: config.exact_combo_limit,
        monte_carlo_samples: config.monte_carlo_samples,
        phase: Phase::Init,
    })
}

/// The transition function. Total over `(phase, action)`: pairings that
/// mean nothing in the current phase return the state unchanged, while
/// rule violations during betting surface as errors with the input state
/// untouched.
pub fn reduce(state: &State, action: Action) -> EngineResult<State> {
    match (&state.phase, action) {
        (Phase::Init, Action::StartHand) => start_hand(state),
        (Phase::Deal { .. }, Action::DealCards) => deal_cards(state),
        (Phase::Betting(_), Action::PlayerMove { seat, mv }) => player_move(state, seat, mv),
        (Phase::Betting(_), Action::RoundComplete) => round_complete(state),
        (Phase::Showdown { .. }, Action::ProceedToShowdown) => proceed_to_showdown(state),
        (Phase::Complete { .. }, Action::NextHand) => next_hand(state),
        _ => Ok(state.clone()),
    }
}

/// Applies the phase-only auto-actions until a betting decision is
/// pending or the hand is complete. Halts because every auto-action
/// strictly advances the phase (RoundComplete opens a fresh street or
/// leaves the betting phases entirely).
pub fn advance_until_decision(state: &State) -> EngineResult<State> {
    let mut s = state.clone();
    loop {
        match &s.phase {
            Phase::Init => s = reduce(&s, Action::StartHand)?,
            Phase::Deal { .. } => s = reduce(&s, Action::DealCards)?,
            Phase::Betting(b) => {
                if round_closed(&s.players, b) {
                    s = reduce(&s, Action::RoundComplete)?;
                } else {
                    return Ok(s);
                }
            }
            Phase::Showdown { .. } => s = reduce(&s, Action::ProceedToShowdown)?,
            Phase::Complete { .. } => return Ok(s),
        }
    }
}

/// True iff the state is mid-betting-round and the seat to act has at
/// least one legal action.
pub fn is_betting_decision(state: &State) -> bool {
    match &state.phase {
        Phase::Betting(b) => {
            !round_closed(&state.players, b)
                && action_options(&state.players, b, b.to_act).any()
        }
        _ => false,
    }
}

fn shuffled_deck(rng: &mut TableRng) -> Deck {
    let mut deck = Deck::fresh();
    deck.shuffle(rng);
    deck
}

fn start_hand(state: &State) -> EngineResult<State> {
    if funded_count(&state.players) < 2 {
        return Err(EngineError::NotEnoughPlayers);
    }
    let mut s = state.clone();
    let deck = shuffled_deck(&mut s.rng);
    s.phase = Phase::Deal { deck };
    Ok(s)
}

fn deal_cards(state: &State) -> EngineResult<State> {
    let mut s = state.clone();
    let Phase::Deal { deck } = &s.phase else {
        return Ok(s);
    };
    let mut deck = deck.clone();
    let positions = assign_positions(&s.players, s.dealer)?;

    // Eliminated seats sit the hand out.
    for p in s.players.iter_mut() {
        if !p.has_chips() {
            p.folded = true;
        }
    }

    // One card per funded seat per pass, two passes, starting left of the
    // button (heads-up: starting with the big blind).
    let start = next_funded_seat(&s.players, positions.button);
    let mut order = vec![start];
    let mut seat = next_funded_seat(&s.players, start);
    while seat != start {
        order.push(seat);
        seat = next_funded_seat(&s.players, seat);
    }
    let mut first_cards: Vec<Card> = Vec::with_capacity(order.len());
    for _ in &order {
        first_cards.push(deck.deal_one()?);
    }
    for (i, &seat) in order.iter().enumerate() {
        let second = deck.deal_one()?;
        s.players[seat].hole = Some([first_cards[i], second]);
    }

    let small_blind = s.small_blind();
    s.players[positions.small_blind].commit(small_blind);
    s.players[positions.big_blind].commit(s.big_blind);

    let target_bet = s.players.iter().map(|p| p.street_bet).max().unwrap_or(0);
    let first = positions.first_preflop;
    let to_act = if s.players[first].can_act() {
        first
    } else {
        next_acting_seat(&s.players, first).unwrap_or(first)
    };
    s.phase = Phase::Betting(Betting {
        street: Street::Preflop,
        board: Vec::new(),
        pots: Vec::new(),
        deck,
        to_act,
        round_start: to_act,
        last_aggressor: None,
        target_bet,
        last_raise_size: s.big_blind,
        action_reopened: true,
        moves: 0,
    });
    Ok(s)
}

fn player_move(state: &State, seat: usize, mv: Move) -> EngineResult<State> {
    let mut s = state.clone();
    let Phase::Betting(ref mut betting) = s.phase else {
        return Ok(s);
    };
    if round_closed(&s.players, betting) {
        return Err(EngineError::NoActionPending);
    }
    apply_move(&mut s.players, betting, seat, mv)?;
    Ok(s)
}

fn round_complete(state: &State) -> EngineResult<State> {
    let Phase::Betting(betting) = &state.phase else {
        return Ok(state.clone());
    };
    if !round_closed(&state.players, betting) {
        return Ok(state.clone());
    }
    let mut s = state.clone();
    let mut betting = betting.clone();
    settle_street(&mut s.players, &mut betting.pots);

    // Fold-win: the lone live seat takes everything on the table.
    let live: Vec<usize> = s
        .players
        .iter()
        .filter(|p| !p.folded)
        .map(|p| p.seat_id)
        .collect();
    if live.len() == 1 {
        let winner = live[0];
        let total = pot_total(&betting.pots);
        s.players[winner].stack += total;
        s.phase = Phase::Complete {
            winners: vec![Payout {
                seat_id: winner,
                amount: total,
            }],
        };
        return Ok(s);
    }

    // With at most one seat left able to act there is no more betting;
    // run out the board and show down.
    let actors = s.players.iter().filter(|p| p.can_act()).count();
    if actors <= 1 {
        let need = 5 - betting.board.len();
        let mut board = betting.board;
        board.extend(betting.deck.deal(need)?);
        s.phase = Phase::Showdown {
            board,
            pots: betting.pots,
        };
        return Ok(s);
    }

    match betting.street.next() {
        None => {
            s.phase = Phase::Showdown {
                board: betting.board,
                pots: betting.pots,
            };
        }
        Some(next) => {
            betting
                .board
                .extend(betting.deck.deal(next.cards_dealt_on_entry())?);
            // First to act postflop: first live seat left of the button.
            let to_act = next_acting_seat(&s.players, s.dealer)
                .expect("at least two seats can act");
            betting.street = next;
            betting.to_act = to_act;
            betting.round_start = to_act;
            betting.last_aggressor = None;
            betting.target_bet = 0;
            betting.last_raise_size = s.big_blind;
            betting.action_reopened = true;
            betting.moves = 0;
            s.phase = Phase::Betting(betting);
        }
    }
    Ok(s)
}

fn proceed_to_showdown(state: &State) -> EngineResult<State> {
    let mut s = state.clone();
    let Phase::Showdown { board, pots } = &s.phase else {
        return Ok(s);
    };
    let winners = distribute(pots, &s.players, board, s.dealer)?;
    for w in &winners {
        s.players[w.seat_id].stack += w.amount;
    }
    s.phase = Phase::Complete { winners };
    Ok(s)
}

fn next_hand(state: &State) -> EngineResult<State> {
    let mut s = state.clone();
    for p in s.players.iter_mut() {
        p.reset_for_hand();
    }
    if funded_count(&s.players) < 2 {
        return Err(EngineError::NotEnoughPlayers);
    }
    s.dealer = next_funded_seat(&s.players, s.dealer);
    let deck = shuffled_deck(&mut s.rng);
    s.phase = Phase::Deal { deck };
    Ok(s)
}
