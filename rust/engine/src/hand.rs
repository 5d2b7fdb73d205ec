use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Suit};
use crate::number::BigNumber;

/// Named hand categories, from weakest to strongest payout.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum RankName {
    #[serde(rename = "High Card")]
    HighCard,
    #[serde(rename = "Pair")]
    Pair,
    #[serde(rename = "Two Pair")]
    TwoPair,
    #[serde(rename = "Three Pair")]
    ThreePair,
    #[serde(rename = "Three of a Kind")]
    ThreeOfAKind,
    #[serde(rename = "Two Three Of a Kind")]
    TwoThreeOfAKind,
    #[serde(rename = "Straight")]
    Straight,
    #[serde(rename = "Flush")]
    Flush,
    #[serde(rename = "Full House")]
    FullHouse,
    #[serde(rename = "Three of a Kind with Two Pair")]
    ThreeOfAKindWithTwoPair,
    #[serde(rename = "Four of a Kind")]
    FourOfAKind,
    #[serde(rename = "Five of a Kind")]
    FiveOfAKind,
    #[serde(rename = "Straight Flush")]
    StraightFlush,
    #[serde(rename = "Royal Flush")]
    RoyalFlush,
}

impl RankName {
    pub const ALL: [RankName; 14] = [
        RankName::HighCard,
        RankName::Pair,
        RankName::TwoPair,
        RankName::ThreePair,
        RankName::ThreeOfAKind,
        RankName::TwoThreeOfAKind,
        RankName::Straight,
        RankName::Flush,
        RankName::FullHouse,
        RankName::ThreeOfAKindWithTwoPair,
        RankName::FourOfAKind,
        RankName::FiveOfAKind,
        RankName::StraightFlush,
        RankName::RoyalFlush,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RankName::HighCard => "High Card",
            RankName::Pair => "Pair",
            RankName::TwoPair => "Two Pair",
            RankName::ThreePair => "Three Pair",
            RankName::ThreeOfAKind => "Three of a Kind",
            RankName::TwoThreeOfAKind => "Two Three Of a Kind",
            RankName::Straight => "Straight",
            RankName::Flush => "Flush",
            RankName::FullHouse => "Full House",
            RankName::ThreeOfAKindWithTwoPair => "Three of a Kind with Two Pair",
            RankName::FourOfAKind => "Four of a Kind",
            RankName::FiveOfAKind => "Five of a Kind",
            RankName::StraightFlush => "Straight Flush",
            RankName::RoyalFlush => "Royal Flush",
        }
    }

    /// Payout multiplier applied to the summed slot results of a deal.
    pub fn multiplier(self) -> BigNumber {
        let m: u64 = match self {
            RankName::HighCard => 1,
            RankName::Pair => 10,
            RankName::TwoPair => 100,
            RankName::ThreePair => 500,
            RankName::ThreeOfAKind => 1_000,
            RankName::TwoThreeOfAKind => 5_000,
            RankName::Straight => 10_000,
            RankName::Flush => 100_000,
            RankName::FullHouse => 1_000_000,
            RankName::ThreeOfAKindWithTwoPair => 5_000_000,
            RankName::FourOfAKind => 10_000_000,
            RankName::FiveOfAKind => 50_000_000,
            RankName::StraightFlush => 100_000_000,
            RankName::RoyalFlush => 1_000_000_000,
        };
        BigNumber::from(m)
    }
}

impl fmt::Display for RankName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RankName::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown hand rank {s:?}"))
    }
}

/// Names the category of a dealt hand. Implementations must be stateless.
pub trait HandRanker {
    fn rank(&self, cards: &[Card]) -> RankName;
}

impl<F> HandRanker for F
where
    F: Fn(&[Card]) -> RankName,
{
    fn rank(&self, cards: &[Card]) -> RankName {
        self(cards)
    }
}

/// Ranks a hand of any size by the best category it contains.
///
/// Flushes and straights need five cards; the rank-group categories are read
/// off the multiset of rank counts, so "Three Pair" needs at least six cards
/// and "Three of a Kind with Two Pair" at least seven. "Five of a Kind" is
/// unreachable with a single deck.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardRanker;

impl HandRanker for StandardRanker {
    fn rank(&self, cards: &[Card]) -> RankName {
        evaluate(cards)
    }
}

pub fn evaluate(cards: &[Card]) -> RankName {
    let mut rank_counts = [0u8; 15]; // 2..14 used
    let mut by_suit: [u16; 4] = [0; 4];
    let mut rank_mask: u16 = 0;
    for c in cards {
        let r = c.rank.value();
        rank_counts[r as usize] += 1;
        rank_mask |= 1 << r;
        by_suit[suit_index(c.suit)] |= 1 << r;
    }

    let mut straight_flush_high: Option<u8> = None;
    let mut flush = false;
    for mask in by_suit {
        if mask.count_ones() >= 5 {
            flush = true;
            if let Some(high) = straight_high_from_mask(mask) {
                straight_flush_high = straight_flush_high.max(Some(high));
            }
        }
    }
    match straight_flush_high {
        Some(14) => return RankName::RoyalFlush,
        Some(_) => return RankName::StraightFlush,
        None => {}
    }

    let mut quads = 0;
    let mut trips = 0;
    let mut pairs = 0;
    for &count in &rank_counts[2..] {
        match count {
            c if c >= 5 => return RankName::FiveOfAKind,
            4 => quads += 1,
            3 => trips += 1,
            2 => pairs += 1,
            _ => {}
        }
    }

    if quads > 0 {
        return RankName::FourOfAKind;
    }
    if trips >= 1 && pairs >= 2 {
        return RankName::ThreeOfAKindWithTwoPair;
    }
    if trips >= 1 && pairs == 1 {
        return RankName::FullHouse;
    }
    if flush {
        return RankName::Flush;
    }
    if straight_high_from_mask(rank_mask).is_some() {
        return RankName::Straight;
    }
    if trips >= 2 {
        return RankName::TwoThreeOfAKind;
    }
    if trips == 1 {
        return RankName::ThreeOfAKind;
    }
    match pairs {
        0 => RankName::HighCard,
        1 => RankName::Pair,
        2 => RankName::TwoPair,
        _ => RankName::ThreePair,
    }
}

fn suit_index(s: Suit) -> usize {
    match s {
        Suit::Clubs => 0,
        Suit::Diamonds => 1,
        Suit::Hearts => 2,
        Suit::Spades => 3,
    }
}

fn straight_high_from_mask(mask: u16) -> Option<u8> {
    let mut m = mask;
    // Ace also plays low
    if (m & (1 << 14)) != 0 {
        m |= 1 << 1;
    }
    // Sliding 5-bit window from Ace(14) down to 5
    for high in (5..=14u8).rev() {
        let window = 0b11111u16 << (high - 4);
        if (m & window) == window {
            return Some(high);
        }
    }
    None
}
