//! Reference battle runtime for the turn-end bookkeeping in `battle-core`.
//!
//! This crate owns party and troop battlers, queues their per-round actions and
//! plays rounds through [`BattleScheduler`], which drives a
//! [`battle_core::TurnActionTracker`] against [`BattleState`].
//!
//! Modules are organized by responsibility:
//! - [`scheduler`] runs rounds and collects per-round summaries
//! - [`state`] implements the host traits over party, troop and turn order
//! - [`battler`] and [`status`] model combatants and their status effects
//! - [`scenario`] loads battle setups from RON files
//! - [`log`] keeps a bounded battle log
pub mod battler;
pub mod config;
pub mod error;
pub mod log;
pub mod scenario;
pub mod scheduler;
pub mod state;
pub mod status;

pub use battler::{ActionPlan, Battler, QueuedAction, TargetRef};
pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use log::{BattleLogRecorder, LogEntry};
pub use scenario::{BattlerSetup, Scenario, StatusSetup, SummonSetup};
pub use scheduler::{BattleReport, BattleScheduler, RoundSummary};
pub use state::{BattleOutcome, BattleState};
pub use status::{Status, StatusSet};
