use std::io::Write;

use chipdeck_engine::rules::{Gate, MAX_HAND_SIZE};
use chipdeck_engine::state::GameState;

use crate::config::Config;
use crate::error::CliError;
use crate::formatters::{format_hand, format_ms, format_number};
use crate::store::FileStore;

pub fn handle_status_command(config: &Config, out: &mut dyn Write) -> Result<(), CliError> {
    let store = FileStore::open(&config.save_path)?;
    write_status(&store.load_state(), out)
}

fn gate_line(state: &GameState, gate: Gate) -> String {
    if state.gate_bought(gate) {
        "unlocked".to_string()
    } else if state.gate_revealed(gate) {
        format!("{} chips", format_number(gate.price()))
    } else {
        "???".to_string()
    }
}

/// Multi-line snapshot of `state`, shared by `status` and the `play` loop.
pub(crate) fn write_status(state: &GameState, out: &mut dyn Write) -> Result<(), CliError> {
    writeln!(
        out,
        "Chips: {} (lifetime {})",
        format_number(state.total_chips),
        format_number(state.total_chips_generated)
    )?;
    writeln!(
        out,
        "Global bonus: x{}  prestige: +{}",
        format_number(state.global_bonus_multiplier),
        format_number(state.prestige_multiplier())
    )?;

    let next_slot = if state.hand_size() >= MAX_HAND_SIZE {
        "full".to_string()
    } else {
        format_number(state.increment_hand_size_cost)
    };
    writeln!(
        out,
        "Hand {}/{}: {}  next slot: {}",
        state.hand_size(),
        MAX_HAND_SIZE,
        format_hand(&state.hand),
        next_slot
    )?;
    for (i, slot) in state.hand.iter().enumerate() {
        writeln!(
            out,
            "  slot {:>2}  x{:<8} last {:<8} upgrade {}",
            i,
            format_number(slot.multiplier),
            format_number(slot.last_result),
            format_number(slot.upgrade_cost)
        )?;
    }

    if state.left_upgrades_bought {
        for up in &state.suits {
            writeln!(
                out,
                "  {:<9} x{:<8} upgrade {}",
                up.suit.name(),
                format_number(up.multiplier),
                format_number(up.cost)
            )?;
        }
    }

    writeln!(
        out,
        "Gates: left {} | right {}",
        gate_line(state, Gate::Left),
        gate_line(state, Gate::Right)
    )?;
    if state.right_upgrades_bought {
        writeln!(
            out,
            "Dealer: {} every {} (speed-up {})",
            if state.dealer_armed { "armed" } else { "idle" },
            format_ms(state.dealer_interval_ms),
            format_number(state.dealer_decrease_cost)
        )?;
        writeln!(
            out,
            "Animation: {} (speed-up {})",
            format_ms(state.anim_duration_ms),
            format_number(state.anim_decrease_cost)
        )?;
    }
    writeln!(
        out,
        "Ascended: {}/{}  buy amount: {}",
        state.ascended_count(),
        MAX_HAND_SIZE,
        state.buy_amount
    )?;
    Ok(())
}
