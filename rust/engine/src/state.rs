use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cards::{full_deck, Card, Suit};
use crate::number::BigNumber;
use crate::rules::{self, Gate};

/// One position of the hand. `card` is `None` (face down) until the first
/// deal after the slot was bought.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandSlot {
    pub card: Option<Card>,
    pub multiplier: BigNumber,
    pub last_result: BigNumber,
    pub upgrade_cost: BigNumber,
}

impl HandSlot {
    pub fn face_down(upgrade_cost: BigNumber) -> Self {
        Self {
            card: None,
            multiplier: BigNumber::ONE,
            last_result: BigNumber::ZERO,
            upgrade_cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuitUpgrade {
    pub suit: Suit,
    pub cost: BigNumber,
    pub multiplier: BigNumber,
}

impl SuitUpgrade {
    pub fn base(suit: Suit) -> Self {
        Self {
            suit,
            cost: BigNumber::from(rules::BASE_SUIT_UPGRADE_COST),
            multiplier: BigNumber::ONE,
        }
    }
}

/// Cards promoted by ascension. Grows by one per ascension and is never
/// cleared by either reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AscendedCards(BTreeSet<Card>);

impl AscendedCards {
    pub fn contains(&self, card: &Card) -> bool {
        self.0.contains(card)
    }

    /// Returns `false` if the card was already ascended.
    pub fn insert(&mut self, card: Card) -> bool {
        self.0.insert(card)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.0.iter()
    }

    /// Cards still eligible for ascension, in deck order.
    pub fn remaining(&self) -> Vec<Card> {
        full_deck()
            .into_iter()
            .filter(|c| !self.0.contains(c))
            .collect()
    }
}

impl FromIterator<Card> for AscendedCards {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// How many levels a slot or suit purchase buys when no explicit amount is
/// given. Stored as a plain integer, `-1` meaning "max".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum BuyAmount {
    Levels(u64),
    Max,
}

impl Default for BuyAmount {
    fn default() -> Self {
        BuyAmount::Levels(1)
    }
}

impl From<BuyAmount> for i64 {
    fn from(a: BuyAmount) -> i64 {
        match a {
            BuyAmount::Levels(n) => i64::try_from(n).unwrap_or(i64::MAX),
            BuyAmount::Max => -1,
        }
    }
}

impl TryFrom<i64> for BuyAmount {
    type Error = String;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        match v {
            -1 => Ok(BuyAmount::Max),
            n if n >= 1 => Ok(BuyAmount::Levels(n as u64)),
            n => Err(format!("buy amount must be positive or -1, got {n}")),
        }
    }
}

impl fmt::Display for BuyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuyAmount::Levels(n) => write!(f, "{n}"),
            BuyAmount::Max => f.write_str("max"),
        }
    }
}

impl FromStr for BuyAmount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.eq_ignore_ascii_case("max") {
            return Ok(BuyAmount::Max);
        }
        match t.parse::<u64>() {
            Ok(n) if n >= 1 => Ok(BuyAmount::Levels(n)),
            _ => Err(format!("invalid amount {t:?} (expected a positive integer or max)")),
        }
    }
}

/// The whole persisted game. Every currency, multiplier and cost is a
/// [`BigNumber`]; durations are plain milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub hand: Vec<HandSlot>,
    /// Indexed by [`Suit::upgrade_index`].
    pub suits: [SuitUpgrade; 4],
    pub total_chips: BigNumber,
    /// Lifetime production since the last reset; spending never lowers it.
    pub total_chips_generated: BigNumber,
    pub increment_hand_size_cost: BigNumber,
    pub left_upgrades_bought: bool,
    pub right_upgrades_bought: bool,
    pub dealer_armed: bool,
    pub dealer_interval_ms: f64,
    pub dealer_decrease_cost: BigNumber,
    pub anim_duration_ms: f64,
    pub anim_decrease_cost: BigNumber,
    pub global_bonus_multiplier: BigNumber,
    pub ascended: AscendedCards,
    pub buy_amount: BuyAmount,
    pub left_gate_revealed: bool,
    pub right_gate_revealed: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// A brand-new save: ten chips, no slots, nothing bought.
    pub fn new() -> Self {
        Self {
            hand: Vec::new(),
            suits: Suit::UPGRADE_ORDER.map(SuitUpgrade::base),
            total_chips: BigNumber::from(rules::STARTING_CHIPS),
            total_chips_generated: BigNumber::ZERO,
            increment_hand_size_cost: BigNumber::from(rules::BASE_INCREMENT_HAND_SIZE_COST),
            left_upgrades_bought: false,
            right_upgrades_bought: false,
            dealer_armed: false,
            dealer_interval_ms: rules::BASE_DEALER_INTERVAL_MS,
            dealer_decrease_cost: BigNumber::from(rules::BASE_DEALER_DECREASE_COST),
            anim_duration_ms: rules::BASE_ANIM_DURATION_MS,
            anim_decrease_cost: BigNumber::from(rules::BASE_ANIM_DECREASE_COST),
            global_bonus_multiplier: BigNumber::ONE,
            ascended: AscendedCards::default(),
            buy_amount: BuyAmount::default(),
            left_gate_revealed: false,
            right_gate_revealed: false,
        }
    }

    pub fn hand_size(&self) -> usize {
        self.hand.len()
    }

    /// `floor(lifetime / 10^12)`; always derived, never stored.
    pub fn prestige_multiplier(&self) -> BigNumber {
        rules::prestige_multiplier(self.total_chips_generated)
    }

    pub fn ascended_count(&self) -> usize {
        self.ascended.len()
    }

    pub fn suit(&self, suit: Suit) -> &SuitUpgrade {
        &self.suits[suit.upgrade_index()]
    }

    pub fn suit_mut(&mut self, suit: Suit) -> &mut SuitUpgrade {
        &mut self.suits[suit.upgrade_index()]
    }

    pub fn gate_bought(&self, gate: Gate) -> bool {
        match gate {
            Gate::Left => self.left_upgrades_bought,
            Gate::Right => self.right_upgrades_bought,
        }
    }

    pub fn gate_revealed(&self, gate: Gate) -> bool {
        match gate {
            Gate::Left => self.left_gate_revealed,
            Gate::Right => self.right_gate_revealed,
        }
    }

    /// Score of one card in a given slot before the hand-rank and global
    /// multipliers.
    pub fn slot_result(&self, slot: usize, card: Card) -> BigNumber {
        let mut result = BigNumber::from(card.rank.value() as u64)
            * self.hand[slot].multiplier
            * self.suit(card.suit).multiplier;
        if self.ascended.contains(&card) {
            result *= BigNumber::from(rules::ASCENSION_BONUS);
        }
        result
    }

    /// Latches the sticky gate reveal flags against the current balance.
    pub(crate) fn refresh_reveals(&mut self) {
        if !self.left_gate_revealed && self.total_chips > Gate::Left.reveal_threshold() {
            self.left_gate_revealed = true;
        }
        if !self.right_gate_revealed && self.total_chips > Gate::Right.reveal_threshold() {
            self.right_gate_revealed = true;
        }
    }
}
