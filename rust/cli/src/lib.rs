//! # chipdeck CLI Library
//!
//! Terminal front end for the chipdeck idle card game. Every subcommand
//! loads the save file through the engine's key-value codec, drives a
//! [`Session`](chipdeck_engine::session::Session) and writes the file back.
//!
//! ## Main Entry Point
//!
//! [`run`] parses command-line arguments and executes the subcommand;
//! [`run_with`] does the same with an injected environment and stdin.
//!
//! ```no_run
//! use std::io;
//! let args = vec!["chipdeck", "grow", "--save", "my-save.json"];
//! let code = chipdeck_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `status`: Show chips, hand, upgrades, gates and the dealer
//! - `deal`, `grow`, `buy-slot`, `buy-suit`, `gate`, `dealer`, `anim`,
//!   `amount`, `prestige`, `ascend`: Apply one game action and save
//! - `play`: Interactive session on stdin
//! - `idle`: Let the dealer run unattended
//! - `cfg`: Display resolved configuration settings

use clap::Parser;
use std::io::{BufRead, Write};

pub mod cli;
mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod formatters;
pub mod io_utils;
pub mod logging;
pub mod store;
pub mod ui;
pub mod validation;

use cli::{ChipdeckCli, Commands};
use commands::{
    handle_action_command, handle_cfg_command, handle_idle_command, handle_play_command,
    handle_status_command,
};
use config::EnvLookup;

pub use error::CliError;

const COMMANDS: &[&str] = &[
    "status", "deal", "grow", "buy-slot", "buy-suit", "gate", "dealer", "anim", "amount",
    "prestige", "ascend", "play", "idle", "cfg",
];

/// Main entry point for the CLI application.
///
/// Reads configuration from the process environment and interactive input
/// from stdin.
///
/// # Returns
///
/// Exit code: `0` for success, `2` for errors, `130` for interruptions
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let stdin = std::io::stdin();
    let mut stdin_lock = stdin.lock();
    run_with(args, &config::process_env, &mut stdin_lock, out, err)
}

/// [`run`] with the environment lookup and input stream supplied by the
/// caller.
///
/// ```
/// use std::io::Cursor;
///
/// let env = |_: &str| -> Option<String> { None };
/// let mut input = Cursor::new("");
/// let (mut out, mut err) = (Vec::new(), Vec::new());
/// let code = chipdeck_cli::run_with(["chipdeck", "cfg"], &env, &mut input, &mut out, &mut err);
/// assert_eq!(code, 0);
/// assert!(String::from_utf8(out).unwrap().contains("save_path"));
/// ```
pub fn run_with<I, S>(
    args: I,
    env: EnvLookup<'_>,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match ChipdeckCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => return usage_error(e, out, err),
    };

    let mut resolved = match config::load_with_sources(env) {
        Ok(r) => r,
        Err(e) => {
            let _ = ui::write_error(err, &format!("Invalid configuration: {}", e));
            return exit_code::ERROR;
        }
    };
    if let Err(e) = resolved.apply_flags(cli.save.clone(), cli.seed) {
        let _ = ui::write_error(err, &format!("Invalid configuration: {}", e));
        return exit_code::ERROR;
    }
    let config = &resolved.config;

    let result = match cli.cmd {
        Commands::Cfg => handle_cfg_command(&resolved, out),
        Commands::Status => handle_status_command(config, out),
        Commands::Play => handle_play_command(config, input, out, err),
        Commands::Idle { seconds } => handle_idle_command(config, seconds, out, err),
        ref cmd => match cmd.action() {
            Some(action) => handle_action_command(config, action, out, err),
            None => Err(CliError::InvalidInput(format!("{:?} is not an action", cmd))),
        },
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(CliError::Interrupted(msg)) => {
            let _ = ui::display_warning(err, &msg);
            exit_code::INTERRUPTED
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            let _ = ui::write_error(err, &e.to_string());
            exit_code::ERROR
        }
    }
}

fn usage_error(e: clap::Error, out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    use clap::error::ErrorKind;

    // Help and version should print to stdout and exit 0
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            if write!(out, "{}", e).is_err() {
                return exit_code::ERROR;
            }
            exit_code::SUCCESS
        }
        _ => {
            if writeln!(err, "{}", e).is_err()
                || writeln!(err).is_err()
                || writeln!(err, "chipdeck idle card game").is_err()
                || writeln!(err, "Usage: chipdeck <command> [options]\n").is_err()
                || writeln!(err, "Commands:").is_err()
            {
                return exit_code::ERROR;
            }
            for c in COMMANDS {
                if writeln!(err, "  {}", c).is_err() {
                    return exit_code::ERROR;
                }
            }
            let _ = writeln!(err, "\nFor full help, run: chipdeck --help");
            exit_code::ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_args(args: &[&str]) -> (i32, String, String) {
        let env = |_: &str| -> Option<String> { None };
        let mut input = Cursor::new(Vec::new());
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = run_with(args.iter().copied(), &env, &mut input, &mut out, &mut err);
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn help_goes_to_stdout() {
        let (code, out, _) = run_args(&["chipdeck", "--help"]);
        assert_eq!(code, exit_code::SUCCESS);
        assert!(out.contains("buy-slot"));
    }

    #[test]
    fn unknown_subcommand_lists_commands() {
        let (code, _, err) = run_args(&["chipdeck", "fold"]);
        assert_eq!(code, exit_code::ERROR);
        assert!(err.contains("Commands:"));
        assert!(err.contains("  prestige"));
    }

    #[test]
    fn commands_list_matches_parser() {
        for name in COMMANDS {
            let found = <ChipdeckCli as clap::CommandFactory>::command()
                .get_subcommands()
                .any(|c| c.get_name() == *name);
            assert!(found, "{} missing from the parser", name);
        }
    }
}
