use std::path::PathBuf;

use battle_core::{RoundEndKind, Subject};
use runtime::{BattleOutcome, BattleScheduler, RuntimeConfig, Scenario};

fn scenario(name: &str) -> Scenario {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../scenarios")
        .join(name);
    Scenario::load_from_file(&path).unwrap()
}

#[test]
fn bundled_scenarios_load() {
    for name in ["normal_round.ron", "forced_end.ron", "summon.ron"] {
        let scenario = scenario(name);
        assert!(BattleScheduler::from_scenario(&scenario, RuntimeConfig::default()).is_ok());
    }
}

#[test]
fn forced_end_scenario_is_decided_in_one_round() {
    let mut scheduler =
        BattleScheduler::from_scenario(&scenario("forced_end.ron"), RuntimeConfig::default())
            .unwrap();

    let report = scheduler.run().unwrap();

    assert_eq!(report.outcome, BattleOutcome::Defeat);
    assert_eq!(report.rounds.len(), 1);
    let round = &report.rounds[0];
    assert_eq!(round.end, RoundEndKind::Forced);
    assert_eq!(round.corrected, vec![Subject::actor(2), Subject::enemy(0)]);
    assert!(round.resolutions.values().all(|&count| count == 1));
}

#[test]
fn scenario_round_limit_overrides_config() {
    let mut scheduler =
        BattleScheduler::from_scenario(&scenario("summon.ron"), RuntimeConfig::default())
            .unwrap();

    let report = scheduler.run().unwrap();

    assert!(report.rounds.len() <= 4);
    assert_eq!(report.rounds[0].summoned, vec![Subject::enemy(1)]);
}
