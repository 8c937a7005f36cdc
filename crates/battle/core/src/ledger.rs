//! Per-round record of how many queued actions each combatant has left.
//!
//! The ledger is rebuilt from the live roster at every round start. An entry
//! leaves the counting state exactly once, when its subject's last action is
//! detected; from then on the entry is terminal for the rest of the round.

use crate::config::TrackerConfig;
use crate::subject::Subject;

/// Remaining-action state of one ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Remaining {
    /// Queued actions still to be processed this round.
    Count(u32),

    /// Final action detected; end-of-turn resolution not yet fired.
    LastActionTaken,

    /// End-of-turn resolution fired for this round.
    Resolved,
}

impl Remaining {
    /// True once last-action detection has fired for the entry.
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Count(_))
    }

    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

/// A single subject's bookkeeping for the current round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedgerEntry {
    pub subject: Subject,
    pub remaining: Remaining,
    /// False for entries synthesized after round start (mid-round summons).
    pub from_roster: bool,
}

/// Result of consuming one queued action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Consumed {
    /// The consumed action was the subject's last one this round.
    Last,
    /// Actions remain; carries the new count.
    Remaining(u32),
    /// Entry was already terminal; nothing changed.
    Ignored,
}

/// Ordered set of ledger entries, one per combatant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundActionLedger {
    entries: Vec<LedgerEntry>,
}

impl RoundActionLedger {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(
                TrackerConfig::MAX_PARTY_MEMBERS + TrackerConfig::MAX_TROOP_MEMBERS,
            ),
        }
    }

    /// Clears the ledger and records one entry per roster member.
    ///
    /// A subject listed twice keeps its first entry.
    pub fn rebuild(&mut self, roster: impl IntoIterator<Item = (Subject, u32)>) {
        self.entries.clear();
        for (subject, queued) in roster {
            if self.position(subject).is_some() {
                continue;
            }
            self.entries.push(LedgerEntry {
                subject,
                remaining: Remaining::Count(queued),
                from_roster: true,
            });
        }
    }

    pub fn get(&self, subject: Subject) -> Option<&LedgerEntry> {
        self.entries.iter().find(|entry| entry.subject == subject)
    }

    pub fn remaining(&self, subject: Subject) -> Option<Remaining> {
        self.get(subject).map(|entry| entry.remaining)
    }

    /// Returns the entry for `subject`, synthesizing a zero-remaining entry when
    /// the subject was not present at round start. The flag reports whether the
    /// entry had to be created.
    pub(crate) fn entry_or_insert(&mut self, subject: Subject) -> (&mut LedgerEntry, bool) {
        match self.position(subject) {
            Some(index) => (&mut self.entries[index], false),
            None => {
                self.entries.push(LedgerEntry {
                    subject,
                    remaining: Remaining::Count(0),
                    from_roster: false,
                });
                let last = self.entries.len() - 1;
                (&mut self.entries[last], true)
            }
        }
    }

    /// Records one processed action for `subject`.
    pub(crate) fn consume_action(&mut self, subject: Subject) -> (Consumed, bool) {
        let (entry, inserted) = self.entry_or_insert(subject);
        let consumed = match entry.remaining {
            Remaining::Count(1) => {
                entry.remaining = Remaining::LastActionTaken;
                Consumed::Last
            }
            // Summoned subjects start at zero; they are finalized once their
            // queue runs dry.
            Remaining::Count(n) => {
                let left = n.saturating_sub(1);
                entry.remaining = Remaining::Count(left);
                Consumed::Remaining(left)
            }
            Remaining::LastActionTaken | Remaining::Resolved => Consumed::Ignored,
        };
        (consumed, inserted)
    }

    /// Marks a subject with an empty queue as finalized. Returns true when the
    /// entry transitioned from a count into the terminal state.
    ///
    /// Any count finalizes: the host may drop queued actions mid-round, and
    /// the subject still needs its resolution.
    pub(crate) fn finalize_idle(&mut self, subject: Subject) -> (bool, bool) {
        let (entry, inserted) = self.entry_or_insert(subject);
        let finalized = matches!(entry.remaining, Remaining::Count(_));
        if finalized {
            entry.remaining = Remaining::LastActionTaken;
        }
        (finalized, inserted)
    }

    pub(crate) fn mark_resolved(&mut self, subject: Subject) {
        let (entry, _) = self.entry_or_insert(subject);
        entry.remaining = Remaining::Resolved;
    }

    pub fn is_resolved(&self, subject: Subject) -> bool {
        self.remaining(subject).is_some_and(|r| r.is_resolved())
    }

    /// Subjects whose end-of-turn resolution has not fired this round.
    pub fn unresolved(&self) -> impl Iterator<Item = Subject> + '_ {
        self.entries
            .iter()
            .filter(|entry| !entry.remaining.is_resolved())
            .map(|entry| entry.subject)
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, subject: Subject) -> Option<usize> {
        self.entries.iter().position(|entry| entry.subject == subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(roster: &[(Subject, u32)]) -> RoundActionLedger {
        let mut ledger = RoundActionLedger::new();
        ledger.rebuild(roster.iter().copied());
        ledger
    }

    #[test]
    fn rebuild_keeps_roster_order_and_counts() {
        let ledger = ledger_with(&[
            (Subject::actor(1), 2),
            (Subject::actor(2), 0),
            (Subject::enemy(0), 1),
        ]);

        let subjects: Vec<_> = ledger.entries().iter().map(|e| e.subject).collect();
        assert_eq!(
            subjects,
            vec![Subject::actor(1), Subject::actor(2), Subject::enemy(0)]
        );
        assert_eq!(ledger.remaining(Subject::actor(2)), Some(Remaining::Count(0)));
    }

    #[test]
    fn rebuild_discards_previous_round() {
        let mut ledger = ledger_with(&[(Subject::actor(1), 1)]);
        ledger.consume_action(Subject::actor(1));
        ledger.mark_resolved(Subject::actor(1));

        ledger.rebuild([(Subject::actor(1), 3)]);
        assert_eq!(ledger.remaining(Subject::actor(1)), Some(Remaining::Count(3)));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn last_action_is_detected_once() {
        let mut ledger = ledger_with(&[(Subject::enemy(0), 2)]);

        assert_eq!(
            ledger.consume_action(Subject::enemy(0)).0,
            Consumed::Remaining(1)
        );
        assert_eq!(ledger.consume_action(Subject::enemy(0)).0, Consumed::Last);
        assert_eq!(ledger.consume_action(Subject::enemy(0)).0, Consumed::Ignored);
        assert_eq!(
            ledger.remaining(Subject::enemy(0)),
            Some(Remaining::LastActionTaken)
        );
    }

    #[test]
    fn idle_subject_finalizes_once_from_any_count() {
        let mut ledger = ledger_with(&[(Subject::actor(1), 0), (Subject::actor(2), 2)]);

        assert_eq!(ledger.finalize_idle(Subject::actor(1)), (true, false));
        assert_eq!(ledger.finalize_idle(Subject::actor(1)), (false, false));
        // Queue dropped by the host before the subject used its actions.
        assert_eq!(ledger.finalize_idle(Subject::actor(2)), (true, false));
        assert_eq!(
            ledger.remaining(Subject::actor(2)),
            Some(Remaining::LastActionTaken)
        );

        ledger.mark_resolved(Subject::actor(2));
        assert_eq!(ledger.finalize_idle(Subject::actor(2)), (false, false));
    }

    #[test]
    fn unknown_subject_gets_zero_entry() {
        let mut ledger = ledger_with(&[(Subject::actor(1), 1)]);

        let (finalized, inserted) = ledger.finalize_idle(Subject::enemy(5));
        assert!(finalized);
        assert!(inserted);

        let entry = ledger.get(Subject::enemy(5)).copied().unwrap();
        assert!(!entry.from_roster);
        assert_eq!(entry.remaining, Remaining::LastActionTaken);
    }

    #[test]
    fn summoned_subject_with_actions_stays_at_zero_until_idle() {
        let mut ledger = RoundActionLedger::new();

        let (consumed, inserted) = ledger.consume_action(Subject::enemy(3));
        assert!(inserted);
        assert_eq!(consumed, Consumed::Remaining(0));
        assert_eq!(ledger.finalize_idle(Subject::enemy(3)), (true, false));
    }

    #[test]
    fn unresolved_skips_resolved_entries() {
        let mut ledger = ledger_with(&[(Subject::actor(1), 0), (Subject::enemy(0), 0)]);
        ledger.mark_resolved(Subject::enemy(0));

        assert_eq!(ledger.unresolved().collect::<Vec<_>>(), vec![Subject::actor(1)]);
        assert!(ledger.is_resolved(Subject::enemy(0)));
    }

    #[test]
    fn duplicate_roster_entries_are_collapsed() {
        let ledger = ledger_with(&[(Subject::actor(1), 2), (Subject::actor(1), 5)]);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.remaining(Subject::actor(1)), Some(Remaining::Count(2)));
    }
}
