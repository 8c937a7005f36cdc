//! Battlers and the actions they queue each round.

use std::collections::VecDeque;

use battle_core::Subject;
use serde::{Deserialize, Serialize};

use crate::status::{Status, StatusSet};

/// Reference to a battler in scenario data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetRef {
    Actor(u16),
    Enemy(u16),
}

impl From<TargetRef> for Subject {
    fn from(target: TargetRef) -> Self {
        match target {
            TargetRef::Actor(id) => Subject::actor(id),
            TargetRef::Enemy(index) => Subject::enemy(index),
        }
    }
}

/// An entry in a battler's action plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionPlan {
    /// Single-target attack. A fallen target is replaced with the first living
    /// opponent when the action is prepared.
    Attack { target: TargetRef, power: u32 },
    /// Hits every living opponent.
    AttackAll { power: u32 },
    /// Halves incoming damage for the rest of the round.
    Guard,
}

/// An action waiting in a battler's queue for the current round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueuedAction {
    pub plan: ActionPlan,
    /// Resolved during preparation; `None` for area and self actions.
    pub target: Option<Subject>,
    pub prepared: bool,
}

impl QueuedAction {
    fn new(plan: ActionPlan) -> Self {
        Self {
            plan,
            target: None,
            prepared: false,
        }
    }
}

/// A combatant on either side of the battle.
#[derive(Clone, Debug)]
pub struct Battler {
    pub subject: Subject,
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    /// HP recovered at the end of each round.
    pub regen: u32,
    pub agility: u32,
    pub actions_per_round: u32,
    pub statuses: StatusSet,
    pub guarding: bool,
    plan: Vec<ActionPlan>,
    plan_cursor: usize,
    queue: VecDeque<QueuedAction>,
}

impl Battler {
    pub fn new(subject: Subject, name: impl Into<String>, max_hp: u32) -> Self {
        Self {
            subject,
            name: name.into(),
            hp: max_hp,
            max_hp,
            regen: 0,
            agility: 0,
            actions_per_round: 1,
            statuses: StatusSet::new(),
            guarding: false,
            plan: Vec::new(),
            plan_cursor: 0,
            queue: VecDeque::new(),
        }
    }

    pub fn with_agility(mut self, agility: u32) -> Self {
        self.agility = agility;
        self
    }

    pub fn with_regen(mut self, regen: u32) -> Self {
        self.regen = regen;
        self
    }

    pub fn with_actions_per_round(mut self, actions: u32) -> Self {
        self.actions_per_round = actions;
        self
    }

    pub fn with_plan(mut self, plan: Vec<ActionPlan>) -> Self {
        self.plan = plan;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.statuses.add(status);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Fills the queue for a new round from the cyclic plan. Fallen or
    /// restricted battlers queue nothing.
    pub fn make_actions(&mut self) {
        self.queue.clear();
        self.guarding = false;

        if !self.is_alive() || self.statuses.restricts_action() {
            return;
        }

        for _ in 0..self.actions_per_round {
            let plan = if self.plan.is_empty() {
                ActionPlan::Guard
            } else {
                let plan = self.plan[self.plan_cursor % self.plan.len()].clone();
                self.plan_cursor += 1;
                plan
            };
            self.queue.push_back(QueuedAction::new(plan));
        }
    }

    pub fn queued_actions(&self) -> u32 {
        self.queue.len() as u32
    }

    pub fn current_action(&self) -> Option<&QueuedAction> {
        self.queue.front()
    }

    pub(crate) fn current_action_mut(&mut self) -> Option<&mut QueuedAction> {
        self.queue.front_mut()
    }

    pub fn remove_current_action(&mut self) -> Option<QueuedAction> {
        self.queue.pop_front()
    }

    /// Applies damage and returns the amount actually dealt.
    pub fn take_damage(&mut self, power: u32) -> u32 {
        let dealt = if self.guarding { power / 2 } else { power };
        let amount = dealt.min(self.hp);
        self.hp -= amount;
        if self.hp == 0 {
            self.die();
        }
        amount
    }

    /// Recovers regeneration HP. Returns the amount healed.
    pub fn regenerate(&mut self) -> u32 {
        if !self.is_alive() {
            return 0;
        }
        let amount = self.regen.min(self.max_hp - self.hp);
        self.hp += amount;
        amount
    }

    fn die(&mut self) {
        self.statuses.clear();
        self.queue.clear();
        self.guarding = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slime() -> Battler {
        Battler::new(Subject::enemy(0), "Slime", 30)
            .with_actions_per_round(3)
            .with_plan(vec![
                ActionPlan::Attack {
                    target: TargetRef::Actor(1),
                    power: 4,
                },
                ActionPlan::Guard,
            ])
    }

    #[test]
    fn plan_cycles_across_rounds() {
        let mut battler = slime();

        battler.make_actions();
        let first: Vec<_> = std::iter::from_fn(|| battler.remove_current_action())
            .map(|a| a.plan)
            .collect();
        assert_eq!(first.len(), 3);
        assert_eq!(first[1], ActionPlan::Guard);

        battler.make_actions();
        assert_eq!(battler.current_action().map(|a| &a.plan), Some(&ActionPlan::Guard));
    }

    #[test]
    fn restricted_battler_queues_nothing() {
        let mut battler = slime().with_status(Status {
            name: "stun".into(),
            turns_left: 1,
            restricts_action: true,
        });

        battler.make_actions();
        assert_eq!(battler.queued_actions(), 0);
    }

    #[test]
    fn defeat_clears_queue_and_statuses() {
        let mut battler = slime().with_status(Status {
            name: "poison".into(),
            turns_left: 3,
            restricts_action: false,
        });
        battler.make_actions();

        assert_eq!(battler.take_damage(100), 30);
        assert!(!battler.is_alive());
        assert_eq!(battler.queued_actions(), 0);
        assert!(battler.statuses.is_empty());
        assert_eq!(battler.regenerate(), 0);
    }

    #[test]
    fn guarding_halves_damage() {
        let mut battler = slime();
        battler.guarding = true;
        assert_eq!(battler.take_damage(10), 5);
        assert_eq!(battler.hp, 25);
    }

    #[test]
    fn target_ref_maps_to_subject() {
        assert_eq!(Subject::from(TargetRef::Enemy(2)), Subject::enemy(2));
        assert_eq!(Subject::from(TargetRef::Actor(1)), Subject::actor(1));
    }
}
