//! Turn-end status bookkeeping for turn-based battle engines.
//!
//! `battle-core` keeps track of how many queued actions each combatant has
//! left in a round and fires end-of-turn status resolution exactly once per
//! combatant per round, including after rounds the host ends early. The host
//! engine keeps ownership of combatants, statuses and the battle log and is
//! reached only through the traits in [`host`].
pub mod config;
pub mod error;
pub mod host;
pub mod ledger;
pub mod subject;
pub mod tracker;

pub use config::{CorrectivePolicy, TrackerConfig};
pub use error::{BattleError, ErrorSeverity, TrackerError};
pub use host::{BattleHost, BattleLog, RosterEntry, RoundEndKind};
pub use ledger::{LedgerEntry, Remaining, RoundActionLedger};
pub use subject::{ActorId, EnemyIndex, Subject, SubjectKind};
pub use tracker::{RoundEndReport, RoundFlags, SubjectStep, TrackerPhase, TurnActionTracker};
