//! Input parsing for the interactive `play` loop.
//!
//! Each line is one command. Game actions map onto
//! [`chipdeck_engine::session::Action`]; the rest control the loop itself.

use chipdeck_engine::cards::Suit;
use chipdeck_engine::rules::Gate;
use chipdeck_engine::session::Action;
use chipdeck_engine::state::BuyAmount;

pub const HELP: &str = "\
commands:
  deal | d                     deal one hand
  grow | g                     buy one more hand slot
  slot N [1|10|100|max]        upgrade hand slot N
  suit SUIT [1|10|100|max]     upgrade a suit (hearts, clubs, diamonds, spades)
  gate left|right              unlock a gate
  dealer                       shorten the dealer interval
  anim                         shorten the deal animation
  amount 1|10|100|max          change the default purchase size
  prestige                     reset for global bonus
  ascend                       reset and ascend one card
  status | s                   show the game
  save                         write the save file now
  help | ?                     this list
  quit | q                     save and leave";

/// Result type for parsing one line of `play` input.
#[derive(Debug, PartialEq)]
pub enum ParseResult {
    Action(Action),
    Status,
    Save,
    Help,
    Quit,
    /// Blank line; the loop only advances its clock.
    Idle,
    Invalid(String),
}

/// Parse one line of user input.
///
/// # Example
///
/// ```rust
/// # use chipdeck_cli::validation::{parse_play_command, ParseResult};
/// use chipdeck_engine::session::Action;
/// use chipdeck_engine::state::BuyAmount;
///
/// assert_eq!(parse_play_command("d"), ParseResult::Action(Action::Deal));
/// assert_eq!(
///     parse_play_command("slot 2 max"),
///     ParseResult::Action(Action::BuySlot { slot: 2, amount: Some(BuyAmount::Max) })
/// );
/// assert_eq!(parse_play_command("q"), ParseResult::Quit);
/// ```
pub fn parse_play_command(input: &str) -> ParseResult {
    let input = input.trim().to_lowercase();
    let parts: Vec<&str> = input.split_whitespace().collect();

    let Some((&head, args)) = parts.split_first() else {
        return ParseResult::Idle;
    };

    match head {
        "deal" | "d" => no_args(head, args, ParseResult::Action(Action::Deal)),
        "grow" | "g" => no_args(head, args, ParseResult::Action(Action::IncrementHandSize)),
        "dealer" => no_args(head, args, ParseResult::Action(Action::DecreaseDealerInterval)),
        "anim" => no_args(head, args, ParseResult::Action(Action::DecreaseAnimDuration)),
        "prestige" => no_args(head, args, ParseResult::Action(Action::Prestige)),
        "ascend" => no_args(head, args, ParseResult::Action(Action::Ascend)),
        "status" | "s" => no_args(head, args, ParseResult::Status),
        "save" => no_args(head, args, ParseResult::Save),
        "help" | "?" => ParseResult::Help,
        "quit" | "q" => ParseResult::Quit,
        "slot" => {
            let Some(raw) = args.first() else {
                return ParseResult::Invalid("slot requires a slot number".to_string());
            };
            let Ok(slot) = raw.parse::<usize>() else {
                return ParseResult::Invalid(format!("Invalid slot number: {}", raw));
            };
            match optional_amount(&args[1..]) {
                Ok(amount) => ParseResult::Action(Action::BuySlot { slot, amount }),
                Err(msg) => ParseResult::Invalid(msg),
            }
        }
        "suit" => {
            let Some(raw) = args.first() else {
                return ParseResult::Invalid("suit requires a suit name".to_string());
            };
            let suit = match raw.parse::<Suit>() {
                Ok(suit) => suit,
                Err(e) => return ParseResult::Invalid(e.to_string()),
            };
            match optional_amount(&args[1..]) {
                Ok(amount) => ParseResult::Action(Action::BuySuit { suit, amount }),
                Err(msg) => ParseResult::Invalid(msg),
            }
        }
        "gate" => match args {
            [raw] => match raw.parse::<Gate>() {
                Ok(gate) => ParseResult::Action(Action::BuyGate { gate }),
                Err(msg) => ParseResult::Invalid(msg),
            },
            _ => ParseResult::Invalid("gate requires left or right".to_string()),
        },
        "amount" => match args {
            [raw] => match raw.parse::<BuyAmount>() {
                Ok(amount) => ParseResult::Action(Action::SetBuyAmount { amount }),
                Err(msg) => ParseResult::Invalid(msg),
            },
            _ => ParseResult::Invalid("amount requires 1, 10, 100 or max".to_string()),
        },
        other => ParseResult::Invalid(format!(
            "Unrecognized command: {} (type help for the list)",
            other
        )),
    }
}

fn no_args(head: &str, args: &[&str], result: ParseResult) -> ParseResult {
    if args.is_empty() {
        result
    } else {
        ParseResult::Invalid(format!("{} takes no arguments", head))
    }
}

fn optional_amount(args: &[&str]) -> Result<Option<BuyAmount>, String> {
    match args {
        [] => Ok(None),
        [raw] => raw.parse::<BuyAmount>().map(Some),
        _ => Err("too many arguments".to_string()),
    }
}
