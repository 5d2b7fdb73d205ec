use std::path::PathBuf;

use chipdeck_engine::cards::Suit;
use chipdeck_engine::rules::Gate;
use chipdeck_engine::session::Action;
use chipdeck_engine::state::BuyAmount;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "chipdeck",
    version,
    about = "Idle card-game economy: deal hands, buy multipliers, prestige"
)]
pub struct ChipdeckCli {
    /// Save file; `.zst` paths are compressed. Overrides CHIPDECK_SAVE.
    #[arg(long, global = true)]
    pub save: Option<PathBuf>,
    /// Seed for deals and ascension picks. Overrides CHIPDECK_SEED.
    #[arg(long, global = true)]
    pub seed: Option<u64>,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show chips, hand, upgrades, gates and the dealer
    Status,
    /// Deal one hand
    Deal,
    /// Buy one more hand slot
    Grow,
    /// Upgrade a hand slot's multiplier
    BuySlot {
        #[arg(long)]
        slot: usize,
        /// Levels to buy (a number or `max`); defaults to the saved buy amount
        #[arg(long)]
        amount: Option<BuyAmount>,
    },
    /// Upgrade a suit's multiplier
    BuySuit {
        #[arg(long)]
        suit: Suit,
        #[arg(long)]
        amount: Option<BuyAmount>,
    },
    /// Unlock the left or right gate
    Gate { gate: Gate },
    /// Shorten the dealer interval
    Dealer,
    /// Shorten the deal animation
    Anim,
    /// Change the default purchase size (1, 10, 100 or max)
    Amount { amount: BuyAmount },
    /// Trade lifetime chips for a permanent global bonus
    Prestige,
    /// With a full hand, ascend one card and start over
    Ascend,
    /// Interactive session on stdin
    Play,
    /// Let the dealer run; stops on Ctrl+C or after --seconds
    Idle {
        #[arg(long)]
        seconds: Option<u64>,
    },
    /// Display resolved configuration with sources
    Cfg,
}

impl Commands {
    /// The game action behind a one-shot subcommand.
    pub fn action(&self) -> Option<Action> {
        let action = match *self {
            Commands::Deal => Action::Deal,
            Commands::Grow => Action::IncrementHandSize,
            Commands::BuySlot { slot, amount } => Action::BuySlot { slot, amount },
            Commands::BuySuit { suit, amount } => Action::BuySuit { suit, amount },
            Commands::Gate { gate } => Action::BuyGate { gate },
            Commands::Dealer => Action::DecreaseDealerInterval,
            Commands::Anim => Action::DecreaseAnimDuration,
            Commands::Amount { amount } => Action::SetBuyAmount { amount },
            Commands::Prestige => Action::Prestige,
            Commands::Ascend => Action::Ascend,
            Commands::Status | Commands::Play | Commands::Idle { .. } | Commands::Cfg => {
                return None;
            }
        };
        Some(action)
    }
}
