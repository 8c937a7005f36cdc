//! Battle log recorder.
//!
//! Keeps a bounded history of what happened in the battle, including the
//! end-of-turn display calls made by the tracker. Every entry is mirrored to
//! `tracing` at debug level.

use std::collections::VecDeque;

use battle_core::{BattleLog, Subject};
use serde::Serialize;
use tracing::debug;

/// A single line of the battle log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum LogEntry {
    RoundStarted { round: u32 },
    ActionUsed { subject: Subject, action: String },
    ActionFailed { subject: Subject },
    Damage { target: Subject, amount: u32 },
    Defeated { subject: Subject },
    Joined { subject: Subject },
    StatusExpired { subject: Subject, status: String },
    Regenerated { subject: Subject, amount: u32 },
    AutoAffectedStatus { subject: Subject },
    CurrentState { subject: Subject },
    RegenerationShown { subject: Subject },
}

/// Bounded battle log.
#[derive(Clone, Debug)]
pub struct BattleLogRecorder {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl BattleLogRecorder {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        debug!(target: "runtime::log", entry = ?entry, "battle log");
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BattleLog for BattleLogRecorder {
    fn display_auto_affected_status(&mut self, subject: Subject) {
        self.push(LogEntry::AutoAffectedStatus { subject });
    }

    fn display_current_state(&mut self, subject: Subject) {
        self.push(LogEntry::CurrentState { subject });
    }

    fn display_regeneration(&mut self, subject: Subject) {
        self.push(LogEntry::RegenerationShown { subject });
    }
}
