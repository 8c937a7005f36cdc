//! Error types surfaced by the battle runtime.
//!
//! Wraps scenario loading failures and scheduler misuse so the CLI can bubble
//! them up with consistent context.
use std::path::PathBuf;

use battle_core::Subject;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to read scenario file {path}")]
    ScenarioIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario RON")]
    ScenarioParse(#[source] ron::error::SpannedError),

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("battle is already decided ({outcome})")]
    BattleOver { outcome: crate::BattleOutcome },

    #[error("round limit of {limit} reached")]
    RoundLimit { limit: u32 },

    #[error("troop is full ({capacity} members)")]
    TroopFull { capacity: usize },

    #[error("{subject} is not part of this battle")]
    UnknownSubject { subject: Subject },
}
