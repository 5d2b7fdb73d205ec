use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::number::BigNumber;

pub const STARTING_CHIPS: u64 = 10;
pub const MAX_HAND_SIZE: usize = 52;

pub const BASE_INCREMENT_HAND_SIZE_COST: u64 = 10;
/// Each extra slot costs ten times the previous one.
pub const HAND_SIZE_COST_FACTOR: u64 = 10;

pub const BASE_SUIT_UPGRADE_COST: u64 = 100_000;

pub const LEFT_GATE_PRICE: u64 = 50_000_000;
pub const RIGHT_GATE_PRICE: u64 = 50_000_000_000;
/// A gate's price is shown once chips exceed this share of it.
pub const GATE_REVEAL_RATIO: f64 = 0.8;

pub const BASE_DEALER_INTERVAL_MS: f64 = 15_000.0;
pub const MIN_DEALER_INTERVAL_MS: f64 = 3_000.0;
pub const BASE_DEALER_DECREASE_COST: u64 = 100_000;

pub const BASE_ANIM_DURATION_MS: f64 = 300.0;
pub const MIN_ANIM_DURATION_MS: f64 = 100.0;
pub const BASE_ANIM_DECREASE_COST: u64 = 100_000;

/// Dealer interval and animation duration shrink by this factor per purchase.
pub const SPEED_UPGRADE_FACTOR: f64 = 0.95;
/// ...while the price of the next speed-up grows by this one.
pub const SPEED_COST_FACTOR: u64 = 5;

/// Extra factor on the slot result of an ascended card.
pub const ASCENSION_BONUS: u64 = 1_000_000;
/// Lifetime chips per point of prestige multiplier.
pub const PRESTIGE_DIVISOR: u64 = 1_000_000_000_000;

pub const DEAL_DELAY_BASE_MS: f64 = 50.0;

/// The two one-time gate purchases. The left gate opens the suit upgrades,
/// the right gate opens dealer automation and the speed upgrades.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gate {
    Left,
    Right,
}

impl Gate {
    pub fn price(self) -> BigNumber {
        match self {
            Gate::Left => BigNumber::from(LEFT_GATE_PRICE),
            Gate::Right => BigNumber::from(RIGHT_GATE_PRICE),
        }
    }

    /// Chip balance above which the price is revealed.
    pub fn reveal_threshold(self) -> BigNumber {
        self.price() * BigNumber::from(GATE_REVEAL_RATIO)
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Left => f.write_str("left"),
            Gate::Right => f.write_str("right"),
        }
    }
}

impl FromStr for Gate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Gate::Left),
            "right" | "r" => Ok(Gate::Right),
            other => Err(format!("unknown gate {other:?} (expected left or right)")),
        }
    }
}

pub fn can_afford(chips: BigNumber, price: BigNumber) -> bool {
    price <= chips
}

/// Minimum spacing between manual deals, in whole milliseconds:
/// `round(50 + anim + (hand_size - 1) * anim / 6)`.
pub fn deal_delay_ms(anim_duration_ms: f64, hand_size: usize) -> u64 {
    let extra_cards = hand_size.saturating_sub(1) as f64;
    (DEAL_DELAY_BASE_MS + anim_duration_ms + extra_cards * anim_duration_ms / 6.0).round() as u64
}

/// `floor(lifetime / 10^12)`.
pub fn prestige_multiplier(lifetime_chips: BigNumber) -> BigNumber {
    (lifetime_chips / BigNumber::from(PRESTIGE_DIVISOR)).floor()
}
