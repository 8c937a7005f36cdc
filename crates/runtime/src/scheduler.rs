//! Battle scheduler driving the turn tracker.
//!
//! The scheduler owns the canonical round loop:
//!
//! ```text
//! begin round ─▶ tracker.on_round_start
//!   └▶ for each subject: tracker.on_subject_action_processed until it finishes
//!        (abort when a side is wiped out)
//! tracker.on_round_end ─▶ RoundSummary
//! ```

use std::collections::BTreeMap;

use battle_core::{
    BattleError, BattleHost, CorrectivePolicy, RoundEndKind, Subject, SubjectStep,
    TurnActionTracker,
};
use serde::{Serialize, Serializer};
use tracing::{debug, error, info, warn};

use crate::battler::Battler;
use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::log::LogEntry;
use crate::scenario::{Scenario, SummonSetup};
use crate::state::{BattleOutcome, BattleState};

/// What happened in one round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub round: u32,
    pub end: RoundEndKind,
    pub actions_executed: u32,
    /// End-of-turn resolutions per subject, normal and corrective combined.
    #[serde(serialize_with = "serialize_counts")]
    pub resolutions: BTreeMap<Subject, u32>,
    /// Subjects resolved by the corrective pass after a forced end.
    pub corrected: Vec<Subject>,
    pub summoned: Vec<Subject>,
    /// Summons scheduled for this round that never triggered.
    pub missed_summons: Vec<String>,
}

impl RoundSummary {
    pub fn resolutions_of(&self, subject: Subject) -> u32 {
        self.resolutions.get(&subject).copied().unwrap_or(0)
    }
}

// JSON object keys must be strings.
fn serialize_counts<S: Serializer>(
    counts: &BTreeMap<Subject, u32>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(counts.iter().map(|(subject, count)| (subject.to_string(), count)))
}

/// Result of running a battle to completion or to the round limit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BattleReport {
    pub scenario: String,
    pub policy: String,
    pub outcome: BattleOutcome,
    pub rounds: Vec<RoundSummary>,
    pub log: Vec<LogEntry>,
}

/// Runs rounds of a battle.
#[derive(Debug)]
pub struct BattleScheduler {
    name: String,
    config: RuntimeConfig,
    state: BattleState,
    tracker: TurnActionTracker,
    summons: Vec<SummonSetup>,
    rounds: Vec<RoundSummary>,
}

impl BattleScheduler {
    pub fn new(config: RuntimeConfig, party: Vec<Battler>, troop: Vec<Battler>) -> Self {
        let state = BattleState::new(party, troop, config.log_capacity);
        let tracker = TurnActionTracker::new(config.tracker.clone());
        Self {
            name: "battle".to_string(),
            config,
            state,
            tracker,
            summons: Vec::new(),
            rounds: Vec::new(),
        }
    }

    pub fn from_scenario(scenario: &Scenario, mut config: RuntimeConfig) -> Result<Self> {
        scenario.validate()?;
        if let Some(max_rounds) = scenario.max_rounds {
            config = config.with_max_rounds(max_rounds);
        }

        let (party, troop) = scenario.build_battlers();
        let mut scheduler = Self::new(config, party, troop);
        scheduler.name = scenario.name.clone();
        scheduler.summons = scenario.summons.clone();
        Ok(scheduler)
    }

    /// Plays one full round and returns its summary.
    pub fn run_round(&mut self) -> Result<RoundSummary> {
        let outcome = self.state.outcome();
        if outcome != BattleOutcome::Ongoing {
            return Err(RuntimeError::BattleOver { outcome });
        }

        let round = self.tracker.round() + 1;
        self.state.begin_round(round);
        self.tracker.on_round_start(&self.state);

        let mut actions_executed = 0;
        let mut summoned = Vec::new();
        let mut current = self.state.next_subject();

        while let Some(subject) = current {
            match self
                .tracker
                .on_subject_action_processed(&mut self.state, subject)
            {
                SubjectStep::Acted { executed, .. } => {
                    if executed {
                        actions_executed += 1;
                        summoned.extend(self.spawn_summons(round, actions_executed)?);
                    }
                    if self.state.is_aborted() {
                        debug!(
                            target: "runtime::scheduler",
                            round,
                            %subject,
                            "battle decided mid-round"
                        );
                        break;
                    }
                }
                SubjectStep::Finished { next, .. } => current = next,
            }
        }

        let report = self.tracker.on_round_end(&mut self.state);
        let missed_summons = self.drop_missed_summons(round);

        let summary = RoundSummary {
            round,
            end: report.kind,
            actions_executed,
            resolutions: self.state.resolutions().clone(),
            corrected: report.corrected,
            summoned,
            missed_summons,
        };
        self.check_resolution_counts(&summary);

        info!(
            target: "runtime::scheduler",
            round,
            end = %summary.end,
            actions = summary.actions_executed,
            corrected = summary.corrected.len(),
            "round complete"
        );

        self.rounds.push(summary.clone());
        Ok(summary)
    }

    /// Plays rounds until one side is wiped out or the round limit is hit.
    pub fn run(&mut self) -> Result<BattleReport> {
        while self.state.outcome() == BattleOutcome::Ongoing {
            if self.tracker.round() >= self.config.max_rounds {
                info!(
                    target: "runtime::scheduler",
                    limit = self.config.max_rounds,
                    "round limit reached"
                );
                break;
            }
            self.run_round()?;
        }
        Ok(self.report())
    }

    /// Plays a single round, failing once the configured limit is exhausted.
    pub fn step(&mut self) -> Result<RoundSummary> {
        if self.tracker.round() >= self.config.max_rounds {
            return Err(RuntimeError::RoundLimit {
                limit: self.config.max_rounds,
            });
        }
        self.run_round()
    }

    pub fn report(&self) -> BattleReport {
        BattleReport {
            scenario: self.name.clone(),
            policy: self.config.tracker.corrective_policy.to_string(),
            outcome: self.state.outcome(),
            rounds: self.rounds.clone(),
            log: self.state.log().entries().cloned().collect(),
        }
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn tracker(&self) -> &TurnActionTracker {
        &self.tracker
    }

    pub fn rounds(&self) -> &[RoundSummary] {
        &self.rounds
    }

    pub fn outcome(&self) -> BattleOutcome {
        self.state.outcome()
    }

    /// Summons that have not joined yet.
    pub fn pending_summons(&self) -> &[SummonSetup] {
        &self.summons
    }

    pub fn battler(&self, subject: Subject) -> Result<&Battler> {
        self.state
            .battler(subject)
            .ok_or(RuntimeError::UnknownSubject { subject })
    }

    fn spawn_summons(&mut self, round: u32, actions_executed: u32) -> Result<Vec<Subject>> {
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.summons)
            .into_iter()
            .partition(|s| s.round == round && s.after_actions == actions_executed);
        self.summons = pending;

        due.into_iter()
            .map(|summon| {
                let subject = self.state.summon(summon.battler.build(Subject::enemy(0)))?;
                debug!(target: "runtime::scheduler", round, %subject, "battler summoned");
                Ok(subject)
            })
            .collect()
    }

    /// Drops summons whose round is over without their action count being
    /// reached, for example when the round was cut short.
    fn drop_missed_summons(&mut self, round: u32) -> Vec<String> {
        let (missed, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.summons)
            .into_iter()
            .partition(|s| s.round <= round);
        self.summons = pending;

        missed
            .into_iter()
            .map(|summon| {
                warn!(
                    target: "runtime::scheduler",
                    round,
                    battler = %summon.battler.name,
                    after_actions = summon.after_actions,
                    "summon never triggered"
                );
                summon.battler.name
            })
            .collect()
    }

    /// Reports subjects resolved more than once. Expected only under the
    /// all-members corrective policy.
    fn check_resolution_counts(&self, summary: &RoundSummary) {
        if self.config.tracker.corrective_policy == CorrectivePolicy::AllMembers {
            return;
        }
        for (&subject, &count) in &summary.resolutions {
            if count > 1 {
                let fault = self.tracker.verify_resolution(subject).err();
                error!(
                    target: "runtime::scheduler",
                    round = summary.round,
                    %subject,
                    count,
                    code = fault.as_ref().map(|e| e.error_code()),
                    "subject resolved more than once"
                );
            }
        }
    }
}
