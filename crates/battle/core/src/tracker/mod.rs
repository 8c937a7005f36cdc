//! Turn-end status bookkeeping.
//!
//! In engines where a combatant may act several times per round, running the
//! end-of-turn status pass after every individual action would tick status
//! durations more than once per round. [`TurnActionTracker`] counts each
//! subject's queued actions at round start and fires the end-of-turn resolution
//! exactly once, when the subject's queue is truly empty.
//!
//! The host scheduler owns one tracker per battle and calls its three hooks:
//!
//! ```text
//! on_round_start ─▶ on_subject_action_processed (per loop iteration) ─▶ on_round_end
//! ```
//!
//! If the host ends a round before every subject reached its last action, the
//! round end runs a corrective pass so that every member still gets its status
//! decrement and regeneration display for the round.

mod flags;

pub use flags::RoundFlags;

use tracing::{debug, trace, warn};

use crate::config::{CorrectivePolicy, TrackerConfig};
use crate::error::TrackerError;
use crate::host::{BattleHost, BattleLog, RoundEndKind};
use crate::ledger::{Consumed, Remaining, RoundActionLedger};
use crate::subject::Subject;

/// Where the tracker is within the current round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackerPhase {
    /// No round has started yet.
    Idle,
    /// Subjects are being processed.
    Processing,
    /// The round's end-of-turn routine has run.
    RoundEnded(RoundEndKind),
}

/// What a single subject-loop iteration did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubjectStep {
    /// The subject consumed one queued action and remains current.
    Acted {
        /// Whether the host executed the action (it was valid after preparation).
        executed: bool,
        /// Whether this was the subject's final action this round.
        last_action: bool,
    },

    /// The subject had nothing left to do; the scheduler moved on.
    Finished {
        /// Whether end-of-turn resolution fired for the subject.
        resolved: bool,
        next: Option<Subject>,
    },
}

/// Outcome of [`TurnActionTracker::on_round_end`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundEndReport {
    pub round: u32,
    pub kind: RoundEndKind,
    /// Members resolved by the corrective pass, in battle-member order.
    pub corrected: Vec<Subject>,
}

/// Per-battle bookkeeping of queued actions and end-of-turn resolution.
///
/// Construct one at battle start and drop it at battle end.
#[derive(Clone, Debug)]
pub struct TurnActionTracker {
    config: TrackerConfig,
    ledger: RoundActionLedger,
    flags: RoundFlags,
    phase: TrackerPhase,
    round: u32,
}

impl TurnActionTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            ledger: RoundActionLedger::new(),
            flags: RoundFlags::empty(),
            phase: TrackerPhase::Idle,
            round: 0,
        }
    }

    /// Rebuilds the ledger from the host's live roster.
    pub fn on_round_start<H: BattleHost>(&mut self, host: &H) {
        let roster = host.live_roster();

        self.round += 1;
        self.ledger.rebuild(
            roster
                .iter()
                .map(|entry| (entry.subject, entry.queued_actions)),
        );
        self.flags = RoundFlags::round_start();
        self.phase = TrackerPhase::Processing;

        debug!(
            target: "battle_core::tracker",
            round = self.round,
            combatants = self.ledger.len(),
            "round started"
        );
    }

    /// Processes one iteration of the host's subject loop for `subject`.
    pub fn on_subject_action_processed<H: BattleHost>(
        &mut self,
        host: &mut H,
        subject: Subject,
    ) -> SubjectStep {
        if self.phase != TrackerPhase::Processing {
            warn!(
                target: "battle_core::tracker",
                round = self.round,
                %subject,
                phase = ?self.phase,
                "subject processed outside of a running round"
            );
        }

        if host.has_current_action(subject) {
            self.process_action(host, subject)
        } else {
            self.finish_subject(host, subject)
        }
    }

    /// Runs the host's end-of-turn routine and, after a forced end, the
    /// corrective pass.
    pub fn on_round_end<H: BattleHost>(&mut self, host: &mut H) -> RoundEndReport {
        if !self.flags.turn_end_pending() {
            warn!(
                target: "battle_core::tracker",
                round = self.round,
                "round end reached again without a new round start"
            );
            host.end_turn(RoundEndKind::Repeated);
            self.phase = TrackerPhase::RoundEnded(RoundEndKind::Repeated);
            return RoundEndReport {
                round: self.round,
                kind: RoundEndKind::Repeated,
                corrected: Vec::new(),
            };
        }

        let kind = if host.is_forced_turn_end() {
            RoundEndKind::Forced
        } else {
            RoundEndKind::Normal
        };

        host.end_turn(kind);

        let corrected = match kind {
            RoundEndKind::Forced => self.corrective_pass(host),
            _ => {
                let pending = self.ledger.unresolved().count();
                if pending > 0 {
                    debug!(
                        target: "battle_core::tracker",
                        round = self.round,
                        pending,
                        "round ended normally with unresolved subjects"
                    );
                }
                Vec::new()
            }
        };

        self.flags.remove(RoundFlags::TURN_END_PENDING);
        self.phase = TrackerPhase::RoundEnded(kind);

        debug!(
            target: "battle_core::tracker",
            round = self.round,
            kind = %kind,
            corrected = corrected.len(),
            "round ended"
        );

        RoundEndReport {
            round: self.round,
            kind,
            corrected,
        }
    }

    /// Checks that resolving `subject` now would not be its second resolution
    /// this round.
    pub fn verify_resolution(&self, subject: Subject) -> Result<(), TrackerError> {
        if self.round == 0 {
            return Err(TrackerError::RoundNotStarted);
        }
        if self.ledger.is_resolved(subject) {
            return Err(TrackerError::DoubleResolution {
                subject,
                round: self.round,
            });
        }
        Ok(())
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn ledger(&self) -> &RoundActionLedger {
        &self.ledger
    }

    pub fn flags(&self) -> RoundFlags {
        self.flags
    }

    pub fn phase(&self) -> TrackerPhase {
        self.phase
    }

    /// Current round number; zero before the first round starts.
    pub fn round(&self) -> u32 {
        self.round
    }

    fn process_action<H: BattleHost>(&mut self, host: &mut H, subject: Subject) -> SubjectStep {
        host.prepare_action(subject);
        let executed = host.is_action_valid(subject);
        if executed {
            host.start_action(subject);
        }

        let (consumed, inserted) = self.ledger.consume_action(subject);
        if inserted {
            self.note_missing_entry(subject);
        }

        let last_action = consumed == Consumed::Last;
        if last_action {
            self.flags.insert(RoundFlags::LAST_ACTION);
        }

        trace!(
            target: "battle_core::tracker",
            round = self.round,
            %subject,
            executed,
            consumed = ?consumed,
            "action processed"
        );

        host.remove_current_action(subject);

        SubjectStep::Acted {
            executed,
            last_action,
        }
    }

    fn finish_subject<H: BattleHost>(&mut self, host: &mut H, subject: Subject) -> SubjectStep {
        let (finalized, inserted) = self.ledger.finalize_idle(subject);
        if inserted {
            self.note_missing_entry(subject);
        }
        if finalized {
            self.flags.insert(RoundFlags::LAST_ACTION);
        }

        // Resolution is keyed on the subject's own entry so a pending flag left
        // by a subject that never came back cannot resolve someone else.
        let pending = self.ledger.remaining(subject) == Some(Remaining::LastActionTaken);
        let resolved = self.flags.last_action() && pending;
        if resolved {
            debug_assert!(
                !self.ledger.is_resolved(subject),
                "{subject} resolved twice in round {}",
                self.round
            );
            self.resolve(host, subject);
            self.flags.remove(RoundFlags::LAST_ACTION);
        }

        let next = host.next_subject();

        SubjectStep::Finished { resolved, next }
    }

    fn resolve<H: BattleHost>(&mut self, host: &mut H, subject: Subject) {
        host.on_all_actions_end(subject);
        host.refresh_status();

        let log = host.log_mut();
        log.display_auto_affected_status(subject);
        log.display_current_state(subject);
        log.display_regeneration(subject);

        self.ledger.mark_resolved(subject);

        debug!(
            target: "battle_core::tracker",
            round = self.round,
            %subject,
            "end-of-turn resolution"
        );
    }

    fn corrective_pass<H: BattleHost>(&mut self, host: &mut H) -> Vec<Subject> {
        let members = host.all_battle_members();
        let mut corrected = Vec::with_capacity(members.len());

        for member in members {
            let already_resolved = self.ledger.is_resolved(member);
            if already_resolved && self.config.corrective_policy == CorrectivePolicy::UnresolvedOnly
            {
                continue;
            }

            host.on_turn_end(member);
            host.refresh_status();

            let log = host.log_mut();
            log.display_auto_affected_status(member);
            log.display_regeneration(member);

            self.ledger.mark_resolved(member);
            corrected.push(member);
        }

        // Nothing pending can survive a full pass over the members.
        self.flags.remove(RoundFlags::LAST_ACTION);

        debug!(
            target: "battle_core::tracker",
            round = self.round,
            policy = %self.config.corrective_policy,
            corrected = corrected.len(),
            "corrective pass after forced turn end"
        );

        corrected
    }

    fn note_missing_entry(&self, subject: Subject) {
        let error = TrackerError::MissingLedgerEntry {
            subject,
            round: self.round,
        };
        debug!(
            target: "battle_core::tracker",
            %error,
            "treating subject as having no remaining actions"
        );
    }
}

impl Default for TurnActionTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}
