//! Error infrastructure for battle-core.
//!
//! The tracker recovers from every condition it can reach during normal engine
//! states, so most of these errors are observed only through logging and the
//! inspection API rather than returned from the lifecycle hooks.

use crate::subject::Subject;

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recovered locally; the caller can keep going.
    Recoverable,

    /// Invalid use of the API, such as driving hooks out of order.
    Validation,

    /// Ledger inconsistency. Indicates a bug and should be investigated.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all battle-core errors.
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Static identifier for this error variant, for logs and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Bookkeeping faults detected by the turn tracker.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackerError {
    #[error("{subject} has no ledger entry for round {round}")]
    MissingLedgerEntry { subject: Subject, round: u32 },

    #[error("{subject} was already resolved in round {round}")]
    DoubleResolution { subject: Subject, round: u32 },

    #[error("no round has been started")]
    RoundNotStarted,
}

impl BattleError for TrackerError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingLedgerEntry { .. } => ErrorSeverity::Recoverable,
            Self::DoubleResolution { .. } => ErrorSeverity::Internal,
            Self::RoundNotStarted => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingLedgerEntry { .. } => "TRACKER_MISSING_LEDGER_ENTRY",
            Self::DoubleResolution { .. } => "TRACKER_DOUBLE_RESOLUTION",
            Self::RoundNotStarted => "TRACKER_ROUND_NOT_STARTED",
        }
    }
}
