use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::cards::{Card, Suit};
use crate::hand::RankName;
use crate::number::BigNumber;
use crate::rules::Gate;
use crate::state::{BuyAmount, GameState};

/// A completed state change, reported to the presentation layer and the
/// deal journal. Guarded operations that did nothing produce no event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// A deal scored `total` chips with hand category `rank`.
    Dealt {
        cards: Vec<Card>,
        rank: RankName,
        total: BigNumber,
    },
    HandSizeIncreased {
        hand_size: usize,
        cost: BigNumber,
    },
    SlotUpgraded {
        slot: usize,
        levels: u64,
        cost: BigNumber,
    },
    SuitUpgraded {
        suit: Suit,
        levels: u64,
        cost: BigNumber,
    },
    GateUnlocked {
        gate: Gate,
        cost: BigNumber,
    },
    DealerSpedUp {
        interval_ms: f64,
        cost: BigNumber,
    },
    AnimationSpedUp {
        duration_ms: f64,
        cost: BigNumber,
    },
    BuyAmountChanged {
        amount: BuyAmount,
    },
    Prestiged {
        gained: BigNumber,
        global_bonus: BigNumber,
    },
    Ascended {
        card: Card,
        ascended_count: usize,
    },
}

/// Receives every event right after the state change it describes.
pub trait EventSink {
    fn notify(&mut self, state: &GameState, event: &GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn notify(&mut self, _state: &GameState, event: &GameEvent) {
        self.push(event.clone());
    }
}

/// One line of the deal journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub seq: u64,
    /// RFC3339, filled in at write time when absent.
    #[serde(default)]
    pub ts: Option<String>,
    /// Chip balance right after the event.
    pub chips: BigNumber,
    #[serde(flatten)]
    pub event: GameEvent,
}

/// Appends one JSON line per event to a journal file.
pub struct EventLogger {
    writer: BufWriter<File>,
    seq: u64,
}

impl EventLogger {
    /// Opens `path` for appending, creating parent directories as needed.
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(f),
            seq: 0,
        })
    }

    pub fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    pub fn write(&mut self, entry: &JournalEntry) -> std::io::Result<()> {
        // inject timestamp if missing
        let mut rec = entry.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl EventSink for EventLogger {
    fn notify(&mut self, state: &GameState, event: &GameEvent) {
        let entry = JournalEntry {
            seq: self.next_seq(),
            ts: None,
            chips: state.total_chips,
            event: event.clone(),
        };
        if let Err(err) = self.write(&entry) {
            tracing::warn!(error = %err, seq = entry.seq, "failed to append journal entry");
        }
    }
}
