//! Command handler modules for the chipdeck CLI.
//!
//! Each handler takes the resolved configuration plus injected output
//! streams (`&mut dyn Write`) and returns `Result<(), CliError>`. Handlers
//! that mutate the game load the save file, drive a
//! [`Session`](chipdeck_engine::session::Session) and write the file back.

mod action;
mod cfg;
mod idle;
mod play;
mod status;

pub use action::handle_action_command;
pub use cfg::handle_cfg_command;
pub use idle::handle_idle_command;
pub use play::handle_play_command;
pub use status::handle_status_command;

use chipdeck_engine::events::EventLogger;
use chipdeck_engine::session::Session;

use crate::config::Config;
use crate::error::CliError;
use crate::store::FileStore;

/// Loads the save file and builds a session around it, wiring the deal
/// journal when one is configured.
pub(crate) fn open_session(config: &Config) -> Result<(FileStore, Session), CliError> {
    let store = FileStore::open(&config.save_path)?;
    let state = store.load_state();
    let seed = config.seed.unwrap_or_else(rand::random);
    let mut session =
        Session::new(state, seed).with_autosave_debounce(config.autosave_debounce_ms);
    if let Some(path) = &config.journal_path {
        let journal = EventLogger::create(path)?;
        session = session.with_sink(Box::new(journal));
    }
    tracing::info!(
        save = %config.save_path.display(),
        seed,
        hand_size = session.state().hand_size(),
        "session opened"
    );
    Ok((store, session))
}

/// Snapshots the session into the store and writes the file.
pub(crate) fn save_now(session: &mut Session, store: &mut FileStore) -> Result<(), CliError> {
    session.flush(store)?;
    store.persist()
}

/// Writes the file only when the session's debounce deadline has passed.
pub(crate) fn autosave(
    session: &mut Session,
    store: &mut FileStore,
    now_ms: u64,
) -> Result<bool, CliError> {
    if session.flush_if_due(now_ms, store)? {
        store.persist()?;
        return Ok(true);
    }
    Ok(false)
}
