//! Capabilities the tracker needs from the host battle engine.
//!
//! The host owns combatants, their action queues and statuses, and the battle
//! log. The tracker reaches them only through these traits, so any scheduler
//! that can answer the queries below can embed a [`TurnActionTracker`].
//!
//! [`TurnActionTracker`]: crate::TurnActionTracker

use crate::subject::Subject;

/// A combatant present when a round starts, with its live queued-action count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RosterEntry {
    pub subject: Subject,
    /// May be zero for incapacitated combatants.
    pub queued_actions: u32,
}

impl RosterEntry {
    pub const fn new(subject: Subject, queued_actions: u32) -> Self {
        Self {
            subject,
            queued_actions,
        }
    }
}

/// How a round reached its end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum RoundEndKind {
    /// Every subject exhausted its queue.
    Normal,

    /// The host terminated the round early.
    Forced,

    /// The end-of-turn routine was reached again without a new round start.
    /// Hosts must not advance status turns in this mode.
    Repeated,
}

/// Battle log display hooks invoked during end-of-turn resolution.
pub trait BattleLog {
    fn display_auto_affected_status(&mut self, subject: Subject);

    fn display_current_state(&mut self, subject: Subject);

    fn display_regeneration(&mut self, subject: Subject);
}

/// Battle engine operations the tracker drives.
///
/// All methods are synchronous. Host-side failures are the host's concern;
/// the tracker performs no validation beyond action-count bookkeeping.
pub trait BattleHost {
    type Log: BattleLog;

    /// Live in-battle combatants, party first, with their queued-action counts.
    fn live_roster(&self) -> Vec<RosterEntry>;

    /// Every battle member (party and troop), alive or not.
    fn all_battle_members(&self) -> Vec<Subject>;

    /// Whether `subject` still has a queued action for this round.
    fn has_current_action(&self, subject: Subject) -> bool;

    fn prepare_action(&mut self, subject: Subject);

    fn is_action_valid(&self, subject: Subject) -> bool;

    /// Begins executing the subject's current action.
    fn start_action(&mut self, subject: Subject);

    fn remove_current_action(&mut self, subject: Subject);

    /// Advances the scheduler; `None` when no subject is left this round.
    fn next_subject(&mut self) -> Option<Subject>;

    /// Status-duration decrement and passive recalculation after a subject's
    /// final action of the round.
    fn on_all_actions_end(&mut self, subject: Subject);

    /// Status-duration decrement for a member corrected after a forced end.
    fn on_turn_end(&mut self, subject: Subject);

    fn refresh_status(&mut self);

    /// The host's standard end-of-turn routine.
    fn end_turn(&mut self, kind: RoundEndKind);

    /// True when the round was terminated before every subject finished.
    fn is_forced_turn_end(&self) -> bool;

    fn log_mut(&mut self) -> &mut Self::Log;
}
