//! Unattended dealer loop.
//!
//! Runs on a current-thread tokio runtime, sleeping until the session's next
//! dealer or autosave deadline. Stops after `--seconds` or on Ctrl+C; both
//! paths write the save first.

use std::future::pending;
use std::io::Write;
use std::time::Duration;

use tokio::time::Instant;

use crate::commands::{autosave, open_session, save_now};
use crate::config::Config;
use crate::error::CliError;
use crate::formatters::{describe_event, format_number};
use crate::ui;

pub fn handle_idle_command(
    config: &Config,
    seconds: Option<u64>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(idle_loop(config, seconds, out, err))
}

async fn sleep_ms(ms: Option<u64>) {
    match ms {
        Some(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
        None => pending::<()>().await,
    }
}

async fn idle_loop(
    config: &Config,
    seconds: Option<u64>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let (mut store, mut session) = open_session(config)?;
    if !session.state().dealer_armed {
        ui::display_warning(
            err,
            "the dealer is not armed (unlock the right gate); nothing will be dealt",
        )?;
    }

    let started = Instant::now();
    let now_ms = || started.elapsed().as_millis() as u64;
    let stop_at = seconds.map(|s| s.saturating_mul(1000));
    let mut ctrl_c = std::pin::pin!(tokio::signal::ctrl_c());
    let mut dealt = 0u64;

    session.poll(now_ms());
    loop {
        let now = now_ms();
        if stop_at.is_some_and(|stop| now >= stop) {
            break;
        }
        let wake = [session.next_deadline(), stop_at].into_iter().flatten().min();
        let sleep_for = wake.map(|at| at.saturating_sub(now));

        tokio::select! {
            _ = &mut ctrl_c => {
                save_now(&mut session, &mut store)?;
                tracing::info!(dealt, "idle interrupted");
                writeln!(out, "Stopped after {} deals; saved to {}", dealt, store.path().display())?;
                return Err(CliError::Interrupted("idle stopped by Ctrl+C".to_string()));
            }
            _ = sleep_ms(sleep_for) => {}
        }

        let now = now_ms();
        for event in session.poll(now) {
            dealt += 1;
            writeln!(out, "{}", describe_event(&event))?;
        }
        autosave(&mut session, &mut store, now)?;
    }

    save_now(&mut session, &mut store)?;
    writeln!(
        out,
        "Idle finished: {} deals, {} chips",
        dealt,
        format_number(session.state().total_chips)
    )?;
    Ok(())
}
