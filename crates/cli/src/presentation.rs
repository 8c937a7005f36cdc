//! Plain-text rendering of a battle report.
use std::fmt::Write;

use runtime::{BattleReport, RoundSummary};

pub fn render(report: &BattleReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} policy): {} after {} round(s)",
        report.scenario,
        report.policy,
        report.outcome,
        report.rounds.len()
    );
    for round in &report.rounds {
        render_round(&mut out, round);
    }
    out
}

fn render_round(out: &mut String, round: &RoundSummary) {
    let _ = writeln!(
        out,
        "round {:>3}  {:<8} actions {:>3}",
        round.round,
        round.end.to_string(),
        round.actions_executed
    );
    for name in &round.missed_summons {
        let _ = writeln!(out, "  summon of {name} never triggered");
    }
    for (subject, count) in &round.resolutions {
        let mut marks = Vec::new();
        if round.corrected.contains(subject) {
            marks.push("corrected");
        }
        if round.summoned.contains(subject) {
            marks.push("summoned");
        }
        if *count > 1 {
            marks.push("repeated");
        }
        let _ = writeln!(
            out,
            "  {:<10} x{count} {}",
            subject.to_string(),
            marks.join(" ")
        );
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use battle_core::{RoundEndKind, Subject};
    use runtime::BattleOutcome;

    use super::*;

    #[test]
    fn marks_corrected_subjects() {
        let report = BattleReport {
            scenario: "ambush".into(),
            policy: "unresolved-only".into(),
            outcome: BattleOutcome::Defeat,
            rounds: vec![RoundSummary {
                round: 1,
                end: RoundEndKind::Forced,
                actions_executed: 1,
                resolutions: BTreeMap::from([(Subject::actor(1), 1), (Subject::enemy(0), 1)]),
                corrected: vec![Subject::actor(1)],
                summoned: Vec::new(),
                missed_summons: Vec::new(),
            }],
            log: Vec::new(),
        };

        let text = render(&report);
        assert!(text.starts_with("ambush (unresolved-only policy): defeat after 1 round(s)"));
        assert!(text.contains("forced"));
        assert!(text.lines().any(|l| l.contains("actor#1") && l.contains("corrected")));
        assert!(!text.lines().any(|l| l.contains("enemy#0") && l.contains("corrected")));
    }
}
