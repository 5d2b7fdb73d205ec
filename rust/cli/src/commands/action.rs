//! One-shot game actions (`deal`, `grow`, `buy-slot`, ...).
//!
//! Load the save, apply a single action, print what happened and write the
//! save back. An action whose guard fails changes nothing; the user gets a
//! warning naming the likely reason and the file is left untouched.

use std::io::Write;

use chipdeck_engine::number::BigNumber;
use chipdeck_engine::rules::{self, Gate, MAX_HAND_SIZE};
use chipdeck_engine::session::Action;
use chipdeck_engine::state::GameState;

use crate::commands::{open_session, save_now};
use crate::config::Config;
use crate::error::CliError;
use crate::formatters::{describe_event, format_number};
use crate::ui;

pub fn handle_action_command(
    config: &Config,
    action: Action,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let (mut store, mut session) = open_session(config)?;
    match session.apply(action, 0) {
        Some(event) => {
            writeln!(out, "{}", describe_event(&event))?;
            save_now(&mut session, &mut store)?;
        }
        None => {
            let hint = no_effect_hint(session.state(), &action);
            ui::warn_no_effect(err, action_name(&action), &hint)?;
        }
    }
    Ok(())
}

pub(crate) fn action_name(action: &Action) -> &'static str {
    match action {
        Action::Deal => "deal",
        Action::IncrementHandSize => "grow",
        Action::BuySlot { .. } => "buy-slot",
        Action::BuySuit { .. } => "buy-suit",
        Action::BuyGate { .. } => "gate",
        Action::DecreaseDealerInterval => "dealer",
        Action::DecreaseAnimDuration => "anim",
        Action::SetBuyAmount { .. } => "amount",
        Action::Prestige => "prestige",
        Action::Ascend => "ascend",
    }
}

fn short_of(state: &GameState, price: BigNumber) -> String {
    format!(
        "costs {}, you have {}",
        format_number(price),
        format_number(state.total_chips)
    )
}

/// Best guess at which guard stopped `action`.
pub(crate) fn no_effect_hint(state: &GameState, action: &Action) -> String {
    match *action {
        Action::Deal if state.hand.is_empty() => "buy a hand slot first with grow".to_string(),
        Action::Deal => format!(
            "the previous deal is still on the table for {}ms",
            state.deal_delay_ms()
        ),
        Action::IncrementHandSize if state.hand_size() >= MAX_HAND_SIZE => {
            "the hand already holds every card".to_string()
        }
        Action::IncrementHandSize => short_of(state, state.increment_hand_size_cost),
        Action::BuySlot { slot, .. } if slot >= state.hand_size() => format!(
            "there is no slot {}; the hand has {} slots",
            slot,
            state.hand_size()
        ),
        Action::BuySlot { slot, .. } => short_of(state, state.hand[slot].upgrade_cost),
        Action::BuySuit { suit, .. } => short_of(state, state.suit(suit).cost),
        Action::BuyGate { gate } if state.gate_bought(gate) => "already unlocked".to_string(),
        Action::BuyGate { gate } => short_of(state, gate.price()),
        Action::DecreaseDealerInterval | Action::DecreaseAnimDuration
            if !state.gate_bought(Gate::Right) =>
        {
            "unlock the right gate first".to_string()
        }
        Action::DecreaseDealerInterval
            if state.dealer_interval_ms <= rules::MIN_DEALER_INTERVAL_MS =>
        {
            "the dealer is already at its fastest".to_string()
        }
        Action::DecreaseDealerInterval => short_of(state, state.dealer_decrease_cost),
        Action::DecreaseAnimDuration if state.anim_duration_ms <= rules::MIN_ANIM_DURATION_MS => {
            "the animation is already at its fastest".to_string()
        }
        Action::DecreaseAnimDuration => short_of(state, state.anim_decrease_cost),
        Action::SetBuyAmount { amount } => format!("{} is already selected", amount),
        Action::Prestige => format!(
            "needs {} lifetime chips, you have {}",
            format_number(BigNumber::from(rules::PRESTIGE_DIVISOR)),
            format_number(state.total_chips_generated)
        ),
        Action::Ascend if state.ascended_count() >= MAX_HAND_SIZE => {
            "every card is already ascended".to_string()
        }
        Action::Ascend => format!(
            "needs a full hand of {} slots, you have {}",
            MAX_HAND_SIZE,
            state.hand_size()
        ),
    }
}
