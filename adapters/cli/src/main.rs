#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a simulated player through the spiral.

mod config;
mod player;
mod session;
mod transcript;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::session::SessionOptions;

/// Runs a seeded spiral session against a simulated player.
#[derive(Debug, Parser)]
#[command(name = "dark-spiral", version)]
struct Args {
    /// Seed shared by the spiral and the simulated player.
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,
    /// TOML file overriding session and narrator timings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of verdicts after which the run stops.
    #[arg(long, default_value_t = 20)]
    presentations: u32,
    /// Player skill between 0.0 and 1.0.
    #[arg(long, default_value_t = 0.6)]
    skill: f64,
    /// Print the session report as JSON instead of the transcript.
    #[arg(long)]
    json: bool,
}

/// Entry point for the dark spiral command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args = Args::parse();
    let tuning = config::load_tuning(args.config.as_deref())?;
    let outcome = session::run(
        SessionOptions {
            seed: args.seed,
            presentations: args.presentations,
            skill: args.skill,
        },
        tuning,
    )?;

    if args.json {
        let json = serde_json::to_string_pretty(&outcome.report)
            .context("failed to serialize session report")?;
        println!("{json}");
        return Ok(());
    }

    for line in &outcome.transcript {
        println!("{line}");
    }
    let report = &outcome.report;
    println!(
        "depth {} | frustration {:.1} | suspicion {:.1} | {} completed, {} failed, {} hidden scenes{}",
        report.scoring.spiral_depth,
        report.scoring.frustration,
        report.scoring.suspicion,
        report.completions,
        report.failures,
        report.hidden_scenes.len(),
        if report.exited { " | exited" } else { "" },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;

    #[test]
    fn arguments_default_to_a_moderate_player() {
        let args = Args::try_parse_from(["dark-spiral"]).expect("parse");
        assert_eq!(args.seed, 0x5eed);
        assert_eq!(args.presentations, 20);
        assert!((args.skill - 0.6).abs() < f64::EPSILON);
        assert!(!args.json);
        assert!(args.config.is_none());
    }

    #[test]
    fn arguments_accept_overrides() {
        let args = Args::try_parse_from([
            "dark-spiral",
            "--seed",
            "7",
            "--presentations",
            "3",
            "--skill",
            "0.25",
            "--json",
            "--config",
            "spiral.toml",
        ])
        .expect("parse");
        assert_eq!(args.seed, 7);
        assert_eq!(args.presentations, 3);
        assert!(args.json);
        assert_eq!(args.config.as_deref(), Some(std::path::Path::new("spiral.toml")));
    }
}
