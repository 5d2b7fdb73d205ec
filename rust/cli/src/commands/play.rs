//! # Play Command
//!
//! Line-based interactive session. Every input line is stamped with a
//! monotonic clock so the session enforces the manual-deal rate limit,
//! runs the dealer when it is due and autosaves on its debounce deadline.
//! The save is always written on `quit` and at end of input.

use std::io::{BufRead, Write};
use std::time::Instant;

use crate::commands::action::{action_name, no_effect_hint};
use crate::commands::status::write_status;
use crate::commands::{autosave, open_session, save_now};
use crate::config::Config;
use crate::error::CliError;
use crate::formatters::{describe_event, format_number};
use crate::io_utils::read_stdin_line;
use crate::ui;
use crate::validation::{HELP, ParseResult, parse_play_command};

pub fn handle_play_command(
    config: &Config,
    stdin: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let (mut store, mut session) = open_session(config)?;
    let started = Instant::now();
    let now_ms = || started.elapsed().as_millis() as u64;

    writeln!(
        out,
        "chipdeck: {} chips, {} slots. Type help for commands.",
        format_number(session.state().total_chips),
        session.state().hand_size()
    )?;
    session.poll(now_ms());

    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = read_stdin_line(stdin) else {
            break;
        };
        let now = now_ms();
        for event in session.poll(now) {
            writeln!(out, "[dealer] {}", describe_event(&event))?;
        }

        match parse_play_command(&line) {
            ParseResult::Action(action) => match session.apply(action, now) {
                Some(event) => writeln!(out, "{}", describe_event(&event))?,
                None => {
                    let hint = no_effect_hint(session.state(), &action);
                    ui::warn_no_effect(err, action_name(&action), &hint)?;
                }
            },
            ParseResult::Status => write_status(session.state(), out)?,
            ParseResult::Save => {
                save_now(&mut session, &mut store)?;
                writeln!(out, "Saved to {}", store.path().display())?;
            }
            ParseResult::Help => writeln!(out, "{}", HELP)?,
            ParseResult::Quit => break,
            ParseResult::Idle => {}
            ParseResult::Invalid(msg) => ui::write_error(err, &msg)?,
        }

        autosave(&mut session, &mut store, now)?;
    }

    save_now(&mut session, &mut store)?;
    writeln!(
        out,
        "Saved to {} ({} chips)",
        store.path().display(),
        format_number(session.state().total_chips)
    )?;
    Ok(())
}
