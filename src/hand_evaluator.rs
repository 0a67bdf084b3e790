use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl HandCategory {
    /// Canonical wire token for the category.
    pub fn token(self) -> &'static str {
        match self {
            HandCategory::HighCard => "HIGH_CARD",
            HandCategory::OnePair => "ONE_PAIR",
            HandCategory::TwoPair => "TWO_PAIR",
            HandCategory::ThreeOfAKind => "THREE_OF_A_KIND",
            HandCategory::Straight => "STRAIGHT",
            HandCategory::Flush => "FLUSH",
            HandCategory::FullHouse => "FULL_HOUSE",
            HandCategory::FourOfAKind => "FOUR_OF_A_KIND",
            HandCategory::StraightFlush => "STRAIGHT_FLUSH",
        }
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandCategory::HighCard => write!(f, "High Card"),
            HandCategory::OnePair => write!(f, "One Pair"),
            HandCategory::TwoPair => write!(f, "Two Pair"),
            HandCategory::ThreeOfAKind => write!(f, "Three of a Kind"),
            HandCategory::Straight => write!(f, "Straight"),
            HandCategory::Flush => write!(f, "Flush"),
            HandCategory::FullHouse => write!(f, "Full House"),
            HandCategory::FourOfAKind => write!(f, "Four of a Kind"),
            HandCategory::StraightFlush => write!(f, "Straight Flush"),
        }
    }
}

/// The best five-card hand found in a 5-7 card set.
///
/// `score` is a total order: the category in the top nibble-group, then the
/// five tie-break ranks packed 4 bits each in descending significance.
/// `score(a) > score(b)` iff hand `a` beats hand `b`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandResult {
    pub category: HandCategory,
    pub score: u32,
    pub tiebreaks: [u8; 5],
    pub best_five: Vec<Card>,
}

impl fmt::Display for HandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category)
    }
}

impl PartialEq for HandResult {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score
    }
}

impl Eq for HandResult {}

impl PartialOrd for HandResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandResult {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.cmp(&other.score)
    }
}

fn pack_score(category: HandCategory, tiebreaks: [u8; 5]) -> u32 {
    let mut score = (category as u32) << 20;
    for (i, &t) in tiebreaks.iter().enumerate() {
        score |= (t as u32) << (16 - 4 * i);
    }
    score
}

/// Highest rank of a straight within a 13-bit rank mask (bit 0 = deuce,
/// bit 12 = ace), or None. The wheel reads the ace low.
fn straight_high(mask: u16) -> Option<u8> {
    const WHEEL: u16 = 0b1_0000_0000_1111;
    let mut bits = mask;
    bits &= bits << 1;
    bits &= bits << 1;
    bits &= bits << 1;
    bits &= bits << 1;
    if bits != 0 {
        Some((15 - bits.leading_zeros() as u8) + 2)
    } else if mask & WHEEL == WHEEL {
        Some(5)
    } else {
        None
    }
}

/// The rank values forming a straight topped by `high`, descending.
fn straight_ranks(high: u8) -> [u8; 5] {
    if high == 5 {
        // Wheel: the ace plays low.
        [5, 4, 3, 2, 14]
    } else {
        [high, high - 1, high - 2, high - 3, high - 4]
    }
}

fn suit_index(card: Card) -> usize {
    card.suit as usize
}

struct Tally {
    suit_masks: [u16; 4],
    counts: [u8; 15],
    rank_mask: u16,
}

impl Tally {
    fn new(cards: &[Card]) -> Tally {
        let mut suit_masks = [0u16; 4];
        let mut counts = [0u8; 15];
        for c in cards {
            suit_masks[suit_index(*c)] |= 1 << (c.value() - 2);
            counts[c.value() as usize] += 1;
        }
        let rank_mask = suit_masks.iter().fold(0, |acc, m| acc | m);
        Tally {
            suit_masks,
            counts,
            rank_mask,
        }
    }

    fn flush_suit(&self) -> Option<usize> {
        (0..4).find(|&s| self.suit_masks[s].count_ones() >= 5)
    }

    /// Highest rank value held exactly `n` times, optionally below `under`.
    fn rank_of_count(&self, n: u8, under: Option<u8>) -> Option<u8> {
        let top = under.unwrap_or(15);
        (2..top).rev().find(|&v| self.counts[v as usize] == n)
    }

    /// Highest rank value held at least `n` times, excluding `not`.
    fn rank_of_at_least(&self, n: u8, not: u8) -> Option<u8> {
        (2..15u8)
            .rev()
            .find(|&v| v != not && self.counts[v as usize] >= n)
    }

    /// Top `n` distinct rank values excluding the given ones, descending.
    fn kicker_ranks(&self, exclude: &[u8], n: usize) -> Vec<u8> {
        (2..15u8)
            .rev()
            .filter(|v| self.counts[*v as usize] > 0 && !exclude.contains(v))
            .take(n)
            .collect()
    }
}

/// Picks `n` cards of rank value `v`, highest suit first for determinism.
fn cards_of_rank(sorted: &[Card], v: u8, n: usize) -> Vec<Card> {
    sorted
        .iter()
        .filter(|c| c.value() == v)
        .take(n)
        .copied()
        .collect()
}

/// One card per rank value in `ranks`, preferring `suit` when given.
fn card_per_rank(sorted: &[Card], ranks: &[u8], suit: Option<usize>) -> Vec<Card> {
    ranks
        .iter()
        .filter_map(|&v| {
            sorted
                .iter()
                .find(|c| c.value() == v && suit.map_or(true, |s| suit_index(**c) == s))
                .copied()
        })
        .collect()
}

/// Evaluates the best five-card hand in a 5-7 card set.
///
/// Works off per-suit rank masks and rank counts; no five-card subsets are
/// enumerated. The same function serves as the five-card comparator, so a
/// 5-card evaluation always agrees with the 7-card one on any subset.
pub fn evaluate_cards(cards: &[Card]) -> EngineResult<HandResult> {
    if cards.len() < 5 {
        return Err(EngineError::NotEnoughCards {
            need: 5,
            got: cards.len(),
        });
    }

    let tally = Tally::new(cards);
    let mut sorted: Vec<Card> = cards.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    // Straight flush outranks everything the count-based shapes can make.
    if let Some(suit) = tally.flush_suit() {
        if let Some(high) = straight_high(tally.suit_masks[suit]) {
            let best_five = card_per_rank(&sorted, &straight_ranks(high), Some(suit));
            return Ok(result(
                HandCategory::StraightFlush,
                [high, 0, 0, 0, 0],
                best_five,
            ));
        }
    }

    if let Some(quad) = tally.rank_of_count(4, None) {
        let kicker = tally.kicker_ranks(&[quad], 1)[0];
        let mut best_five = cards_of_rank(&sorted, quad, 4);
        best_five.extend(card_per_rank(&sorted, &[kicker], None));
        return Ok(result(
            HandCategory::FourOfAKind,
            [quad, kicker, 0, 0, 0],
            best_five,
        ));
    }

    if let Some(trips) = tally.rank_of_count(3, None) {
        // A second trips or any pair fills the house.
        if let Some(pair) = tally.rank_of_at_least(2, trips) {
            let mut best_five = cards_of_rank(&sorted, trips, 3);
            best_five.extend(cards_of_rank(&sorted, pair, 2));
            return Ok(result(
                HandCategory::FullHouse,
                [trips, pair, 0, 0, 0],
                best_five,
            ));
        }
    }

    if let Some(suit) = tally.flush_suit() {
        let ranks: Vec<u8> = (2..15u8)
            .rev()
            .filter(|v| tally.suit_masks[suit] & (1 << (v - 2)) != 0)
            .take(5)
            .collect();
        let best_five = card_per_rank(&sorted, &ranks, Some(suit));
        let mut tiebreaks = [0u8; 5];
        tiebreaks.copy_from_slice(&ranks);
        return Ok(result(HandCategory::Flush, tiebreaks, best_five));
    }

    if let Some(high) = straight_high(tally.rank_mask) {
        let best_five = card_per_rank(&sorted, &straight_ranks(high), None);
        return Ok(result(HandCategory::Straight, [high, 0, 0, 0, 0], best_five));
    }

    if let Some(trips) = tally.rank_of_count(3, None) {
        let kickers = tally.kicker_ranks(&[trips], 2);
        let mut best_five = cards_of_rank(&sorted, trips, 3);
        best_five.extend(card_per_rank(&sorted, &kickers, None));
        return Ok(result(
            HandCategory::ThreeOfAKind,
            [trips, kickers[0], kickers[1], 0, 0],
            best_five,
        ));
    }

    if let Some(hi_pair) = tally.rank_of_count(2, None) {
        if let Some(lo_pair) = tally.rank_of_count(2, Some(hi_pair)) {
            let kicker = tally.kicker_ranks(&[hi_pair, lo_pair], 1)[0];
            let mut best_five = cards_of_rank(&sorted, hi_pair, 2);
            best_five.extend(cards_of_rank(&sorted, lo_pair, 2));
            best_five.extend(card_per_rank(&sorted, &[kicker], None));
            return Ok(result(
                HandCategory::TwoPair,
                [hi_pair, lo_pair, kicker, 0, 0],
                best_five,
            ));
        }

        let kickers = tally.kicker_ranks(&[hi_pair], 3);
        let mut best_five = cards_of_rank(&sorted, hi_pair, 2);
        best_five.extend(card_per_rank(&sorted, &kickers, None));
        return Ok(result(
            HandCategory::OnePair,
            [hi_pair, kickers[0], kickers[1], kickers[2], 0],
            best_five,
        ));
    }

    let ranks = tally.kicker_ranks(&[], 5);
    let best_five = card_per_rank(&sorted, &ranks, None);
    let mut tiebreaks = [0u8; 5];
    tiebreaks.copy_from_slice(&ranks);
    Ok(result(HandCategory::HighCard, tiebreaks, best_five))
}

fn result(category: HandCategory, tiebreaks: [u8; 5], best_five: Vec<Card>) -> HandResult {
    HandResult {
        category,
        score: pack_score(category, tiebreaks),
        tiebreaks,
        best_five,
    }
}

/// Evaluates hole cards plus board as one card set.
pub fn evaluate_hand(hole_cards: &[Card], board: &[Card]) -> EngineResult<HandResult> {
    let mut all: Vec<Card> = Vec::with_capacity(hole_cards.len() + board.len());
    all.extend_from_slice(hole_cards);
    all.extend_from_slice(board);
    evaluate_cards(&all)
}

pub fn compare_hands(hand1: &[Card], hand2: &[Card], board: &[Card]) -> EngineResult<Ordering> {
    let r1 = evaluate_hand(hand1, board)?;
    let r2 = evaluate_hand(hand2, board)?;
    Ok(r1.cmp(&r2))
}
