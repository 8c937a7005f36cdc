//! In-process battle state that plays the host role for the tracker.

use std::cmp::Reverse;
use std::collections::{BTreeMap, VecDeque};

use battle_core::{BattleHost, RosterEntry, RoundEndKind, Subject, TrackerConfig};
use serde::Serialize;
use tracing::trace;

use crate::battler::{ActionPlan, Battler};
use crate::error::{Result, RuntimeError};
use crate::log::{BattleLogRecorder, LogEntry};

/// Whether either side has been wiped out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum BattleOutcome {
    Ongoing,
    /// Every troop member has fallen.
    Victory,
    /// Every party member has fallen.
    Defeat,
}

/// Party, troop, turn order and battle log for one battle.
#[derive(Clone, Debug)]
pub struct BattleState {
    party: Vec<Battler>,
    troop: Vec<Battler>,
    order: VecDeque<Subject>,
    log: BattleLogRecorder,
    aborted: bool,
    resolutions: BTreeMap<Subject, u32>,
    status_refreshes: u32,
}

impl BattleState {
    pub fn new(party: Vec<Battler>, troop: Vec<Battler>, log_capacity: usize) -> Self {
        Self {
            party,
            troop,
            order: VecDeque::new(),
            log: BattleLogRecorder::new(log_capacity),
            aborted: false,
            resolutions: BTreeMap::new(),
            status_refreshes: 0,
        }
    }

    /// Queues every battler's actions and builds the turn order: fastest first,
    /// party ahead of troop on ties.
    pub fn begin_round(&mut self, round: u32) {
        self.aborted = false;
        self.resolutions.clear();

        for battler in self.party.iter_mut().chain(self.troop.iter_mut()) {
            battler.make_actions();
        }

        let mut order: Vec<_> = self
            .battlers()
            .filter(|b| b.is_alive())
            .map(|b| (Reverse(b.agility), b.subject))
            .collect();
        order.sort();
        self.order = order.into_iter().map(|(_, subject)| subject).collect();

        self.log.push(LogEntry::RoundStarted { round });
    }

    /// Adds a troop member mid-round. It acts right after the current subject.
    pub fn summon(&mut self, mut battler: Battler) -> Result<Subject> {
        let capacity = TrackerConfig::MAX_TROOP_MEMBERS;
        let index = u16::try_from(self.troop.len())
            .ok()
            .filter(|_| self.troop.len() < capacity)
            .ok_or(RuntimeError::TroopFull { capacity })?;

        let subject = Subject::enemy(index);
        battler.subject = subject;
        battler.make_actions();
        self.troop.push(battler);
        self.order.push_front(subject);
        self.log.push(LogEntry::Joined { subject });
        Ok(subject)
    }

    pub fn outcome(&self) -> BattleOutcome {
        if !self.party.iter().any(Battler::is_alive) {
            BattleOutcome::Defeat
        } else if !self.troop.iter().any(Battler::is_alive) {
            BattleOutcome::Victory
        } else {
            BattleOutcome::Ongoing
        }
    }

    /// True once the current round was cut short by a decided battle.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn battler(&self, subject: Subject) -> Option<&Battler> {
        match subject {
            Subject::Actor(_) => self.party.iter().find(|b| b.subject == subject),
            Subject::Enemy(index) => self.troop.get(index.0 as usize),
        }
    }

    pub fn battler_mut(&mut self, subject: Subject) -> Option<&mut Battler> {
        match subject {
            Subject::Actor(_) => self.party.iter_mut().find(|b| b.subject == subject),
            Subject::Enemy(index) => self.troop.get_mut(index.0 as usize),
        }
    }

    pub fn battlers(&self) -> impl Iterator<Item = &Battler> {
        self.party.iter().chain(self.troop.iter())
    }

    pub fn party(&self) -> &[Battler] {
        &self.party
    }

    pub fn troop(&self) -> &[Battler] {
        &self.troop
    }

    /// End-of-turn resolutions each subject received this round.
    pub fn resolutions(&self) -> &BTreeMap<Subject, u32> {
        &self.resolutions
    }

    pub fn status_refreshes(&self) -> u32 {
        self.status_refreshes
    }

    pub fn log(&self) -> &BattleLogRecorder {
        &self.log
    }

    fn is_alive(&self, subject: Subject) -> bool {
        self.battler(subject).is_some_and(Battler::is_alive)
    }

    fn living_opponents(&self, subject: Subject) -> Vec<Subject> {
        let side = if subject.is_actor() {
            &self.troop
        } else {
            &self.party
        };
        side.iter()
            .filter(|b| b.is_alive())
            .map(|b| b.subject)
            .collect()
    }

    fn strike(&mut self, target: Subject, power: u32) {
        let Some(battler) = self.battler_mut(target) else {
            return;
        };
        let amount = battler.take_damage(power);
        let fallen = !battler.is_alive();

        self.log.push(LogEntry::Damage { target, amount });
        if fallen {
            self.log.push(LogEntry::Defeated { subject: target });
        }
    }

    fn tick_statuses(&mut self, subject: Subject) {
        *self.resolutions.entry(subject).or_default() += 1;

        let expired = match self.battler_mut(subject) {
            Some(battler) => battler.statuses.tick(),
            None => return,
        };
        for status in expired {
            self.log.push(LogEntry::StatusExpired { subject, status });
        }
    }
}

impl BattleHost for BattleState {
    type Log = BattleLogRecorder;

    fn live_roster(&self) -> Vec<RosterEntry> {
        self.battlers()
            .filter(|b| b.is_alive())
            .map(|b| RosterEntry::new(b.subject, b.queued_actions()))
            .collect()
    }

    fn all_battle_members(&self) -> Vec<Subject> {
        self.battlers().map(|b| b.subject).collect()
    }

    fn has_current_action(&self, subject: Subject) -> bool {
        self.battler(subject)
            .is_some_and(|b| b.current_action().is_some())
    }

    fn prepare_action(&mut self, subject: Subject) {
        let Some(plan) = self
            .battler(subject)
            .and_then(|b| b.current_action())
            .map(|a| a.plan.clone())
        else {
            return;
        };

        let target = match plan {
            ActionPlan::Attack { target, .. } => {
                let wanted = Subject::from(target);
                if self.is_alive(wanted) {
                    Some(wanted)
                } else {
                    self.living_opponents(subject).first().copied()
                }
            }
            ActionPlan::AttackAll { .. } | ActionPlan::Guard => None,
        };

        if let Some(action) = self
            .battler_mut(subject)
            .and_then(|b| b.current_action_mut())
        {
            action.target = target;
            action.prepared = true;
        }
    }

    fn is_action_valid(&self, subject: Subject) -> bool {
        let Some(battler) = self.battler(subject).filter(|b| b.is_alive()) else {
            return false;
        };
        let Some(action) = battler.current_action() else {
            return false;
        };

        match action.plan {
            ActionPlan::Attack { .. } => action.target.is_some_and(|t| self.is_alive(t)),
            ActionPlan::AttackAll { .. } => !self.living_opponents(subject).is_empty(),
            ActionPlan::Guard => true,
        }
    }

    fn start_action(&mut self, subject: Subject) {
        let Some(action) = self
            .battler(subject)
            .and_then(|b| b.current_action())
            .cloned()
        else {
            return;
        };

        let label = match &action.plan {
            ActionPlan::Attack { .. } => "attack",
            ActionPlan::AttackAll { .. } => "attack_all",
            ActionPlan::Guard => "guard",
        };
        self.log.push(LogEntry::ActionUsed {
            subject,
            action: label.to_string(),
        });

        match action.plan {
            ActionPlan::Attack { power, .. } => {
                if let Some(target) = action.target {
                    self.strike(target, power);
                }
            }
            ActionPlan::AttackAll { power } => {
                for target in self.living_opponents(subject) {
                    self.strike(target, power);
                }
            }
            ActionPlan::Guard => {
                if let Some(battler) = self.battler_mut(subject) {
                    battler.guarding = true;
                }
            }
        }

        if self.outcome() != BattleOutcome::Ongoing {
            self.aborted = true;
        }
    }

    fn remove_current_action(&mut self, subject: Subject) {
        // A prepared single-target attack that found nobody to hit.
        let failed = self
            .battler(subject)
            .and_then(|b| b.current_action())
            .is_some_and(|a| {
                a.prepared && a.target.is_none() && matches!(a.plan, ActionPlan::Attack { .. })
            });
        if failed {
            self.log.push(LogEntry::ActionFailed { subject });
        }
        if let Some(battler) = self.battler_mut(subject) {
            battler.remove_current_action();
        }
    }

    fn next_subject(&mut self) -> Option<Subject> {
        while let Some(subject) = self.order.pop_front() {
            if self.is_alive(subject) {
                return Some(subject);
            }
            trace!(target: "runtime::state", %subject, "skipping fallen subject");
        }
        None
    }

    fn on_all_actions_end(&mut self, subject: Subject) {
        self.tick_statuses(subject);
    }

    fn on_turn_end(&mut self, subject: Subject) {
        self.tick_statuses(subject);
    }

    fn refresh_status(&mut self) {
        self.status_refreshes += 1;
    }

    fn end_turn(&mut self, kind: RoundEndKind) {
        if kind == RoundEndKind::Repeated {
            return;
        }

        let healed: Vec<_> = self
            .party
            .iter_mut()
            .chain(self.troop.iter_mut())
            .filter_map(|b| {
                let amount = b.regenerate();
                (amount > 0).then_some((b.subject, amount))
            })
            .collect();
        for (subject, amount) in healed {
            self.log.push(LogEntry::Regenerated { subject, amount });
        }
    }

    fn is_forced_turn_end(&self) -> bool {
        self.aborted
    }

    fn log_mut(&mut self) -> &mut Self::Log {
        &mut self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battler::TargetRef;
    use crate::status::Status;

    fn state() -> BattleState {
        let hero = Battler::new(Subject::actor(1), "Hero", 50)
            .with_agility(5)
            .with_regen(3)
            .with_plan(vec![ActionPlan::Attack {
                target: TargetRef::Enemy(0),
                power: 10,
            }]);
        let bat = Battler::new(Subject::enemy(0), "Bat", 20)
            .with_agility(9)
            .with_plan(vec![ActionPlan::Guard]);
        let rat = Battler::new(Subject::enemy(1), "Rat", 20)
            .with_agility(5)
            .with_plan(vec![ActionPlan::Guard]);
        BattleState::new(vec![hero], vec![bat, rat], 64)
    }

    #[test]
    fn turn_order_is_fastest_first_party_on_ties() {
        let mut state = state();
        state.begin_round(1);

        let order: Vec<_> = std::iter::from_fn(|| state.next_subject()).collect();
        assert_eq!(
            order,
            vec![Subject::enemy(0), Subject::actor(1), Subject::enemy(1)]
        );
    }

    #[test]
    fn fallen_target_is_retargeted_during_preparation() {
        let mut state = state();
        state.begin_round(1);
        state.battler_mut(Subject::enemy(0)).unwrap().hp = 0;

        state.prepare_action(Subject::actor(1));
        assert!(state.is_action_valid(Subject::actor(1)));
        let action = state
            .battler(Subject::actor(1))
            .and_then(|b| b.current_action())
            .cloned()
            .unwrap();
        assert_eq!(action.target, Some(Subject::enemy(1)));
    }

    #[test]
    fn wiping_a_side_aborts_the_round() {
        let mut state = state();
        state.begin_round(1);
        for battler in [Subject::enemy(0), Subject::enemy(1)] {
            state.battler_mut(battler).unwrap().hp = 10;
        }

        state.prepare_action(Subject::actor(1));
        state.start_action(Subject::actor(1));
        assert!(!state.is_forced_turn_end());

        state.battler_mut(Subject::enemy(1)).unwrap().hp = 0;
        state.battler_mut(Subject::actor(1)).unwrap().make_actions();
        state.prepare_action(Subject::actor(1));
        state.start_action(Subject::actor(1));

        assert_eq!(state.outcome(), BattleOutcome::Victory);
        assert!(state.is_forced_turn_end());
    }

    #[test]
    fn status_ticks_are_counted_per_subject() {
        let mut state = state();
        state
            .battler_mut(Subject::actor(1))
            .unwrap()
            .statuses
            .add(Status {
                name: "poison".into(),
                turns_left: 1,
                restricts_action: false,
            });
        state.begin_round(1);

        state.on_all_actions_end(Subject::actor(1));
        assert_eq!(state.resolutions().get(&Subject::actor(1)), Some(&1));
        assert!(state.log().entries().any(|e| matches!(
            e,
            LogEntry::StatusExpired { status, .. } if status == "poison"
        )));
    }

    #[test]
    fn regeneration_skips_repeated_round_end() {
        let mut state = state();
        state.battler_mut(Subject::actor(1)).unwrap().hp = 40;

        state.end_turn(RoundEndKind::Repeated);
        assert_eq!(state.battler(Subject::actor(1)).unwrap().hp, 40);

        state.end_turn(RoundEndKind::Normal);
        assert_eq!(state.battler(Subject::actor(1)).unwrap().hp, 43);
    }

    #[test]
    fn summoned_enemy_takes_the_next_troop_slot() {
        let mut state = state();
        state.begin_round(1);

        let subject = state
            .summon(Battler::new(Subject::enemy(0), "Imp", 10).with_plan(vec![ActionPlan::Guard]))
            .unwrap();
        assert_eq!(subject, Subject::enemy(2));
        assert_eq!(state.next_subject(), Some(subject));
        assert!(state.has_current_action(subject));
    }

    #[test]
    fn summon_fails_once_the_troop_is_full() {
        let mut state = state();
        state.begin_round(1);

        let imp = Battler::new(Subject::enemy(0), "Imp", 10);
        while state.troop().len() < TrackerConfig::MAX_TROOP_MEMBERS {
            state.summon(imp.clone()).unwrap();
        }

        assert!(matches!(
            state.summon(imp),
            Err(RuntimeError::TroopFull { capacity }) if capacity == TrackerConfig::MAX_TROOP_MEMBERS
        ));
        assert_eq!(state.troop().len(), TrackerConfig::MAX_TROOP_MEMBERS);
    }
}
