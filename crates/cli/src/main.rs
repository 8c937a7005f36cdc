//! `turnbook` plays a battle scenario and reports end-of-turn resolutions.
//!
//! ```bash
//! turnbook scenarios/forced_end.ron --policy all-members
//! RUST_LOG=battle_core=debug turnbook scenarios/summon.ron --json
//! ```
mod presentation;

use std::path::PathBuf;

use anyhow::{Context, Result};
use battle_core::CorrectivePolicy;
use clap::Parser;
use runtime::{BattleScheduler, RuntimeConfig, Scenario};

/// Runs a RON battle scenario round by round.
#[derive(Parser, Debug)]
#[command(name = "turnbook", version, about)]
struct Cli {
    /// Scenario file to play.
    scenario: PathBuf,

    /// Maximum number of rounds to play.
    #[arg(short, long, env = "BATTLE_MAX_ROUNDS")]
    rounds: Option<u32>,

    /// How forced round ends treat already resolved subjects.
    #[arg(short, long, env = "BATTLE_CORRECTIVE_POLICY", value_parser = parse_policy)]
    policy: Option<CorrectivePolicy>,

    /// Print the full report as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

fn parse_policy(value: &str) -> std::result::Result<CorrectivePolicy, String> {
    value
        .parse()
        .map_err(|_| format!("unknown policy `{value}` (expected unresolved-only or all-members)"))
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = RuntimeConfig::from_env();
    if let Some(policy) = cli.policy {
        config = config.with_policy(policy);
    }
    if let Some(rounds) = cli.rounds {
        config = config.with_max_rounds(rounds);
    }

    let scenario = Scenario::load_from_file(&cli.scenario)
        .with_context(|| format!("loading {}", cli.scenario.display()))?;
    let mut scheduler = BattleScheduler::from_scenario(&scenario, config)?;

    tracing::info!(
        scenario = %scenario.name,
        policy = %scheduler.tracker().config().corrective_policy,
        "starting battle"
    );

    let report = scheduler.run()?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", presentation::render(&report));
    }

    Ok(())
}
