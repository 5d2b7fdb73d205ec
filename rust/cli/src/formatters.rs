//! Number, card and event formatters for terminal display.
//!
//! Amounts use the game's suffix notation: the value is divided by 1000
//! until it drops below 1000, rounded to two decimals and tagged with the
//! matching suffix (`1.23M`, `45.6 Quintilion`). Values past the last suffix
//! fall back to scientific notation.
//!
//! ```rust
//! use chipdeck_engine::number::BigNumber;
//! use chipdeck_cli::formatters::{format_number, format_number_long};
//!
//! assert_eq!(format_number(BigNumber::from(1_234_567u64)), "1.23M");
//! assert_eq!(format_number_long(BigNumber::from(2_500_000u64)), "2.5 Million");
//! ```

use chipdeck_engine::cards::Card;
use chipdeck_engine::events::GameEvent;
use chipdeck_engine::number::BigNumber;
use chipdeck_engine::state::HandSlot;

pub const SUFFIXES_SHORT: [&str; 32] = [
    "", "k", "M", "B", "T", "qd", "Qn", "sx", "Sp", "O", "N", "de", "Ud", "DD", "tdD", "qdD",
    "QnD", "sxD", "SpD", "Ocd", "NvD", "Vgn", "UVg", "DVg", "TVg", "qtV", "QnV", "SeV", "SPG",
    "OVG", "NVG", "PLSTOP",
];

pub const SUFFIXES_LONG: [&str; 32] = [
    "",
    "Thousand",
    "Million",
    "Billion",
    "Trillion",
    "Quadrillion",
    "Quintilion",
    "Sextillion",
    "Septillion",
    "Octillion",
    "Nonillion",
    "Decillion",
    "Undecillion",
    "Duodecillion",
    "Tredecillion",
    "Quattuordecillion",
    "Quindecillion",
    "Sedecillion",
    "Septendecillion",
    "Octodecillion",
    "Novemdecillion",
    "Vigintillion",
    "Unvigintillion",
    "Duovigintillion",
    "Tresvigintillion",
    "Quattuorvigintillion",
    "Quinvigintillion",
    "Sesvigintillion",
    "Septemvigintillion",
    "Octovigintilion",
    "Novemvigintillion",
    "PLEASESTOP",
];

pub fn format_number(n: BigNumber) -> String {
    format_with_suffix(n, &SUFFIXES_SHORT, "")
}

pub fn format_number_long(n: BigNumber) -> String {
    format_with_suffix(n, &SUFFIXES_LONG, " ")
}

fn round2(x: f64) -> f64 {
    ((x + f64::EPSILON) * 100.0).round() / 100.0
}

fn format_with_suffix(n: BigNumber, table: &[&str], sep: &str) -> String {
    if n.is_zero() {
        return "0".to_string();
    }
    let sign = if n.signum() < 0 { "-" } else { "" };
    let n = n.abs();
    if n < BigNumber::from(1000u64) {
        return format!("{}{}", sign, round2(n.to_f64()));
    }
    let exp = n.exponent();
    let mut group = (exp / 3) as usize;
    let scaled = n.mantissa() * 10f64.powi((exp % 3) as i32);
    let mut shown = round2(scaled);
    if shown >= 1000.0 {
        group += 1;
        shown = round2(scaled / 1000.0);
    }
    match table.get(group) {
        Some(suffix) => format!("{}{}{}{}", sign, shown, sep, suffix),
        None => format!("{}{}", sign, n),
    }
}

/// Milliseconds as seconds with two decimals.
pub fn format_ms(ms: f64) -> String {
    format!("{:.2}s", ms / 1000.0)
}

/// Check if the terminal supports Unicode suit symbols.
///
/// On Windows, checks for Windows Terminal (WT_SESSION), modern terminals (TERM_PROGRAM),
/// or VS Code (VSCODE_INJECTION). On Unix-like systems, assumes Unicode support.
pub fn supports_unicode() -> bool {
    if cfg!(windows) {
        std::env::var("WT_SESSION").is_ok()
            || std::env::var("TERM_PROGRAM").is_ok()
            || std::env::var("VSCODE_INJECTION").is_ok()
    } else {
        true
    }
}

/// `10♥`, or the plain card code (`10h`) without Unicode support.
pub fn format_card(card: &Card) -> String {
    if supports_unicode() {
        format!("{}{}", card.rank.code(), card.suit.symbol())
    } else {
        card.code()
    }
}

pub fn format_cards(cards: &[Card]) -> String {
    cards.iter().map(format_card).collect::<Vec<_>>().join(" ")
}

/// The hand as shown between deals; never-dealt slots appear as `[]`.
pub fn format_hand(hand: &[HandSlot]) -> String {
    let slots: Vec<String> = hand
        .iter()
        .map(|slot| match &slot.card {
            Some(card) => format_card(card),
            None => "[]".to_string(),
        })
        .collect();
    format!("[{}]", slots.join(" "))
}

/// One-line human summary of an event.
pub fn describe_event(event: &GameEvent) -> String {
    match event {
        GameEvent::Dealt { cards, rank, total } => format!(
            "Dealt {} -> {} for {} chips",
            format_cards(cards),
            rank,
            format_number(*total)
        ),
        GameEvent::HandSizeIncreased { hand_size, cost } => format!(
            "Hand size is now {} (paid {})",
            hand_size,
            format_number(*cost)
        ),
        GameEvent::SlotUpgraded { slot, levels, cost } => format!(
            "Slot {} upgraded x{} (paid {})",
            slot,
            levels,
            format_number(*cost)
        ),
        GameEvent::SuitUpgraded { suit, levels, cost } => format!(
            "{} upgraded x{} (paid {})",
            suit,
            levels,
            format_number(*cost)
        ),
        GameEvent::GateUnlocked { gate, cost } => {
            format!("{} gate unlocked (paid {})", gate, format_number(*cost))
        }
        GameEvent::DealerSpedUp { interval_ms, cost } => format!(
            "Dealer interval is now {} (paid {})",
            format_ms(*interval_ms),
            format_number(*cost)
        ),
        GameEvent::AnimationSpedUp { duration_ms, cost } => format!(
            "Deal animation is now {} (paid {})",
            format_ms(*duration_ms),
            format_number(*cost)
        ),
        GameEvent::BuyAmountChanged { amount } => format!("Buy amount set to {}", amount),
        GameEvent::Prestiged {
            gained,
            global_bonus,
        } => format!(
            "Prestiged: +{} global bonus (now x{})",
            format_number(*gained),
            format_number(*global_bonus)
        ),
        GameEvent::Ascended {
            card,
            ascended_count,
        } => format!(
            "Ascended {} ({} of 52 cards ascended)",
            format_card(card),
            ascended_count
        ),
    }
}
