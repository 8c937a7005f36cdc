//! Scenario files describing a battle to simulate.
//!
//! Scenarios list the party and troop, each battler's per-round action plan and
//! starting statuses, and optional mid-round summons. They are stored as RON:
//!
//! ```ron
//! Scenario(
//!     name: "ambush",
//!     party: [
//!         (name: "Harold", hp: 40, agility: 8, actions_per_round: 2,
//!          plan: [Attack(target: Enemy(0), power: 6)],
//!          statuses: [(name: "poison", turns: 3)]),
//!     ],
//!     troop: [
//!         (name: "Wolf", hp: 30, agility: 12, plan: [AttackAll(power: 5)]),
//!     ],
//! )
//! ```

use std::path::Path;

use battle_core::{Subject, TrackerConfig};
use serde::{Deserialize, Serialize};

use crate::battler::{ActionPlan, Battler, TargetRef};
use crate::error::{Result, RuntimeError};
use crate::status::Status;

/// Starting status on a battler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSetup {
    pub name: String,
    pub turns: u32,
    #[serde(default)]
    pub restricts_action: bool,
}

/// A battler as written in a scenario.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattlerSetup {
    pub name: String,
    /// Actor id for party members; defaults to the 1-based party slot.
    /// Ignored for troop members, which are keyed by slot.
    #[serde(default)]
    pub id: Option<u16>,
    pub hp: u32,
    #[serde(default)]
    pub regen: u32,
    #[serde(default)]
    pub agility: u32,
    #[serde(default = "default_actions_per_round")]
    pub actions_per_round: u32,
    #[serde(default)]
    pub plan: Vec<ActionPlan>,
    #[serde(default)]
    pub statuses: Vec<StatusSetup>,
}

/// A troop member joining in the middle of a round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummonSetup {
    /// Round in which the summon happens (1-based).
    pub round: u32,
    /// Executed actions in that round after which the battler joins.
    pub after_actions: u32,
    pub battler: BattlerSetup,
}

/// Battle setup for the simulation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Overrides the configured round limit.
    #[serde(default)]
    pub max_rounds: Option<u32>,
    pub party: Vec<BattlerSetup>,
    pub troop: Vec<BattlerSetup>,
    #[serde(default)]
    pub summons: Vec<SummonSetup>,
}

fn default_actions_per_round() -> u32 {
    1
}

impl BattlerSetup {
    pub fn build(&self, subject: Subject) -> Battler {
        let mut battler = Battler::new(subject, self.name.clone(), self.hp)
            .with_regen(self.regen)
            .with_agility(self.agility)
            .with_actions_per_round(self.actions_per_round)
            .with_plan(self.plan.clone());
        for status in &self.statuses {
            battler = battler.with_status(Status {
                name: status.name.clone(),
                turns_left: status.turns,
                restricts_action: status.restricts_action,
            });
        }
        battler
    }
}

impl Scenario {
    /// Parses a scenario from RON text and validates it.
    pub fn from_ron(content: &str) -> Result<Self> {
        let scenario: Scenario = ron::from_str(content).map_err(RuntimeError::ScenarioParse)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load scenario from a RON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| RuntimeError::ScenarioIo {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(
            target: "runtime::scenario",
            path = %path.display(),
            "loading scenario"
        );

        Self::from_ron(&content)
    }

    /// Party subjects in slot order.
    pub fn party_subjects(&self) -> Vec<Subject> {
        self.party
            .iter()
            .enumerate()
            .map(|(slot, setup)| Subject::actor(setup.id.unwrap_or(slot as u16 + 1)))
            .collect()
    }

    /// Builds party and troop battlers.
    pub fn build_battlers(&self) -> (Vec<Battler>, Vec<Battler>) {
        let party = self
            .party
            .iter()
            .zip(self.party_subjects())
            .map(|(setup, subject)| setup.build(subject))
            .collect();
        let troop = self
            .troop
            .iter()
            .enumerate()
            .map(|(index, setup)| setup.build(Subject::enemy(index as u16)))
            .collect();
        (party, troop)
    }

    /// Checks that the scenario describes a playable battle.
    pub fn validate(&self) -> Result<()> {
        if self.party.is_empty() || self.troop.is_empty() {
            return Err(RuntimeError::InvalidScenario(
                "party and troop must each have at least one member".to_string(),
            ));
        }

        let party = self.party_subjects();
        for (i, subject) in party.iter().enumerate() {
            if party[..i].contains(subject) {
                return Err(RuntimeError::InvalidScenario(format!(
                    "duplicate party member {subject}"
                )));
            }
        }

        for setup in self
            .party
            .iter()
            .chain(&self.troop)
            .chain(self.summons.iter().map(|s| &s.battler))
        {
            if setup.hp == 0 {
                return Err(RuntimeError::InvalidScenario(format!(
                    "{} must start with positive hp",
                    setup.name
                )));
            }
            for plan in &setup.plan {
                if let ActionPlan::Attack { target, .. } = plan {
                    self.check_target(*target, &party)?;
                }
            }
        }

        if let Some(summon) = self.summons.iter().find(|s| s.round == 0) {
            return Err(RuntimeError::InvalidScenario(format!(
                "summon of {} must name a round starting at 1",
                summon.battler.name
            )));
        }

        // Summons join after an executed action, so zero never triggers.
        if let Some(summon) = self.summons.iter().find(|s| s.after_actions == 0) {
            return Err(RuntimeError::InvalidScenario(format!(
                "summon of {} must follow at least one action",
                summon.battler.name
            )));
        }

        let troop_size = self.troop.len() + self.summons.len();
        if troop_size > TrackerConfig::MAX_TROOP_MEMBERS {
            return Err(RuntimeError::InvalidScenario(format!(
                "troop of {troop_size} including summons exceeds {}",
                TrackerConfig::MAX_TROOP_MEMBERS
            )));
        }

        Ok(())
    }

    fn check_target(&self, target: TargetRef, party: &[Subject]) -> Result<()> {
        let known = match target {
            TargetRef::Actor(_) => party.contains(&Subject::from(target)),
            TargetRef::Enemy(index) => (index as usize) < self.troop.len() + self.summons.len(),
        };
        if known {
            Ok(())
        } else {
            Err(RuntimeError::InvalidScenario(format!(
                "attack target {} is not part of the battle",
                Subject::from(target)
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AMBUSH: &str = r#"
        Scenario(
            name: "ambush",
            party: [
                (name: "Harold", hp: 40, agility: 8, actions_per_round: 2,
                 plan: [Attack(target: Enemy(0), power: 6)],
                 statuses: [(name: "poison", turns: 3)]),
                (name: "Therese", id: Some(7), hp: 30, plan: [Guard]),
            ],
            troop: [
                (name: "Wolf", hp: 30, agility: 12, plan: [AttackAll(power: 5)]),
            ],
        )
    "#;

    #[test]
    fn parses_defaults_and_ids() {
        let scenario = Scenario::from_ron(AMBUSH).unwrap();

        assert_eq!(
            scenario.party_subjects(),
            vec![Subject::actor(1), Subject::actor(7)]
        );
        assert_eq!(scenario.troop[0].actions_per_round, 1);
        assert!(scenario.summons.is_empty());

        let (party, troop) = scenario.build_battlers();
        assert_eq!(party[0].statuses.turns_left("poison"), Some(3));
        assert_eq!(troop[0].subject, Subject::enemy(0));
    }

    #[test]
    fn rejects_unknown_attack_target() {
        let content = AMBUSH.replace("Enemy(0)", "Enemy(4)");
        let err = Scenario::from_ron(&content).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidScenario(_)));
    }

    #[test]
    fn rejects_empty_troop() {
        let content = r#"Scenario(name: "empty", party: [(name: "A", hp: 1)], troop: [])"#;
        assert!(matches!(
            Scenario::from_ron(content),
            Err(RuntimeError::InvalidScenario(_))
        ));
    }

    #[test]
    fn rejects_summon_before_any_action() {
        let content = AMBUSH.replace(
            "troop: [",
            r#"summons: [(round: 1, after_actions: 0, battler: (name: "Imp", hp: 5))],
            troop: ["#,
        );
        assert!(matches!(
            Scenario::from_ron(&content),
            Err(RuntimeError::InvalidScenario(msg)) if msg.contains("at least one action")
        ));
    }

    #[test]
    fn rejects_troop_beyond_capacity() {
        let wolves = vec![r#"(name: "Wolf", hp: 5)"#; TrackerConfig::MAX_TROOP_MEMBERS + 1];
        let content = format!(
            r#"Scenario(name: "pack", party: [(name: "A", hp: 1)], troop: [{}])"#,
            wolves.join(", ")
        );
        assert!(matches!(
            Scenario::from_ron(&content),
            Err(RuntimeError::InvalidScenario(_))
        ));
    }

    #[test]
    fn reports_parse_errors() {
        assert!(matches!(
            Scenario::from_ron("Scenario(name: )"),
            Err(RuntimeError::ScenarioParse(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ambush.ron");
        std::fs::write(&path, AMBUSH).unwrap();

        let scenario = Scenario::load_from_file(&path).unwrap();
        assert_eq!(scenario.name, "ambush");

        let missing = Scenario::load_from_file(&dir.path().join("missing.ron"));
        assert!(matches!(missing, Err(RuntimeError::ScenarioIo { .. })));
    }
}
