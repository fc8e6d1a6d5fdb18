use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bonkman_engine::constants::{ticks_for, LEVEL_INTRO_MS, TICK_MS};
use bonkman_engine::engine::GameEngine;
use bonkman_engine::error::GameError;
use bonkman_engine::levels::LevelSet;
use bonkman_engine::types::{Mode, Outcome, RoundState, RuntimeEvent, Snapshot};
use chrono::{SecondsFormat, Utc};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Headless autopilot runs over the level set, one JSON line per run.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u32>,
    /// Level definitions to use instead of the built-in set.
    #[arg(long)]
    levels: Option<PathBuf>,
    #[arg(long, default_value_t = 3)]
    runs: u32,
    #[arg(long, default_value_t = 20_000)]
    max_ticks: u64,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct RunResultLine {
    run: u32,
    seed: u32,
    outcome: Option<Outcome>,
    score: u32,
    #[serde(rename = "levelReached")]
    level_reached: usize,
    ticks: u64,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    #[serde(rename = "pickupsEaten")]
    pickups_eaten: u32,
    #[serde(rename = "powerEaten")]
    power_eaten: u32,
    captures: u32,
    #[serde(rename = "levelsCleared")]
    levels_cleared: u32,
    #[serde(rename = "phaseChanges")]
    phase_changes: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct RunReport {
    #[serde(flatten)]
    result: RunResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "batchId")]
    batch_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "runCount")]
    run_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: u32,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    runs: Vec<RunResultLine>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(error) => {
            tracing::error!(%error, "simulation aborted");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<bool, GameError> {
    let levels = match cli.levels.as_deref() {
        Some(path) => LevelSet::load(path)?,
        None => LevelSet::embedded()?,
    };
    let base_seed = cli.seed.unwrap_or_else(rand::random);
    let started_at = Utc::now();
    let batch_id = default_batch_id(base_seed, started_at.timestamp_millis());

    tracing::info!(
        batch = %batch_id,
        seed = base_seed,
        runs = cli.runs,
        levels = levels.len(),
        "simulation started"
    );

    let mut results = Vec::new();
    let mut anomaly_count = 0usize;
    for run_idx in 0..cli.runs {
        let seed = base_seed.wrapping_add(run_idx);
        let report = run_once(levels.clone(), run_idx + 1, seed, cli.max_ticks);
        for anomaly in &report.anomaly_records {
            tracing::warn!(
                run = run_idx + 1,
                seed,
                tick = anomaly.tick,
                detail = %anomaly.message,
                "anomaly detected"
            );
        }
        anomaly_count += report.anomaly_records.len();
        tracing::info!(
            run = run_idx + 1,
            seed,
            outcome = ?report.result.outcome,
            score = report.result.score,
            ticks = report.result.ticks,
            "run finished"
        );
        println!(
            "{}",
            serde_json::to_string(&report.result).expect("run result should serialize")
        );
        results.push(report.result);
    }

    let summary = build_run_summary(
        batch_id,
        started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        results,
        anomaly_count,
    );
    if let Some(path) = cli.summary_out.as_deref() {
        write_summary(path, &summary).map_err(|source| GameError::AssetUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "summary written");
    }

    Ok(summary.anomaly_count == 0)
}

fn run_once(levels: LevelSet, run: u32, seed: u32, max_ticks: u64) -> RunReport {
    let mut engine = GameEngine::new(levels, seed);
    let intro_ticks = ticks_for(LEVEL_INTRO_MS);
    let mut intro_wait = 0u64;

    let mut pickups_eaten = 0;
    let mut power_eaten = 0;
    let mut captures = 0;
    let mut levels_cleared = 0;
    let mut phase_changes = 0;
    let mut outcome = None;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut last_score = 0;

    while engine.tick_count() < max_ticks {
        match engine.round_state() {
            RoundState::Intro => {
                // The overlay would be on screen for this long.
                intro_wait += 1;
                if intro_wait >= intro_ticks {
                    intro_wait = 0;
                    engine.resume();
                }
                continue;
            }
            RoundState::Ended(_) => break,
            RoundState::Running => {}
        }

        let dir = engine.autopilot_direction();
        engine.set_direction(dir);
        engine.step();

        let snapshot = engine.build_snapshot(true);
        for message in collect_snapshot_anomalies(&engine, &snapshot, last_score) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        last_score = snapshot.score;

        for event in &snapshot.events {
            match event {
                RuntimeEvent::PickupConsumed { .. } => pickups_eaten += 1,
                RuntimeEvent::PowerConsumed { .. } => power_eaten += 1,
                RuntimeEvent::AdversaryCaptured { .. } => captures += 1,
                RuntimeEvent::LevelCleared { .. } => levels_cleared += 1,
                RuntimeEvent::PhaseChanged { .. } => phase_changes += 1,
                RuntimeEvent::RunEnded { outcome: ended, .. } => outcome = Some(*ended),
                _ => {}
            }
        }
    }

    if outcome.is_none() {
        push_anomaly(
            &mut anomalies,
            &mut anomaly_records,
            &mut anomaly_seen,
            engine.tick_count(),
            format!("run did not finish within {max_ticks} ticks"),
        );
    }

    RunReport {
        result: RunResultLine {
            run,
            seed,
            outcome,
            score: engine.score(),
            level_reached: engine.level(),
            ticks: engine.tick_count(),
            duration_ms: engine.tick_count() * TICK_MS,
            pickups_eaten,
            power_eaten,
            captures,
            levels_cleared,
            phase_changes,
            anomalies,
        },
        anomaly_records,
    }
}

fn collect_snapshot_anomalies(
    engine: &GameEngine,
    snapshot: &Snapshot,
    last_score: u32,
) -> Vec<String> {
    let mut anomalies = Vec::new();
    let maze = engine.maze();

    if snapshot.score < last_score {
        anomalies.push(format!("score went down: {last_score} -> {}", snapshot.score));
    }
    if !maze.is_walkable(snapshot.player.x, snapshot.player.y) {
        anomalies.push(format!(
            "player on closed tile: ({}, {})",
            snapshot.player.x, snapshot.player.y
        ));
    }
    for adversary in &snapshot.adversaries {
        if !maze.is_walkable(adversary.x, adversary.y) {
            anomalies.push(format!(
                "adversary on closed tile: {} ({}, {})",
                adversary.id, adversary.x, adversary.y
            ));
        }
        if adversary.mode == Mode::Vulnerable && adversary.vulnerable_ms == 0 {
            anomalies.push(format!("vulnerable with no time left: {}", adversary.id));
        }
        if adversary.mode != Mode::Vulnerable && adversary.flashing {
            anomalies.push(format!("flashing outside vulnerability: {}", adversary.id));
        }
    }
    anomalies
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_batch_id(seed: u32, timestamp_ms: i64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn outcome_key(outcome: Option<Outcome>) -> String {
    match outcome {
        Some(Outcome::Victory) => "victory",
        Some(Outcome::Failure) => "failure",
        None => "unfinished",
    }
    .to_string()
}

fn build_run_summary(
    batch_id: String,
    started_at: String,
    finished_at: String,
    runs: Vec<RunResultLine>,
    anomaly_count: usize,
) -> RunSummary {
    let run_count = runs.len();
    let average_score = if run_count == 0 {
        0
    } else {
        runs.iter().map(|run| run.score).sum::<u32>() / run_count as u32
    };
    let mut outcome_counts = BTreeMap::new();
    for run in &runs {
        *outcome_counts.entry(outcome_key(run.outcome)).or_insert(0) += 1;
    }
    RunSummary {
        batch_id,
        started_at,
        finished_at,
        run_count,
        anomaly_count,
        average_score,
        outcome_counts,
        runs,
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_run_result(outcome: Option<Outcome>, score: u32) -> RunResultLine {
        RunResultLine {
            run: 1,
            seed: 42,
            outcome,
            score,
            level_reached: 1,
            ticks: 100,
            duration_ms: 100 * TICK_MS,
            pickups_eaten: 0,
            power_eaten: 0,
            captures: 0,
            levels_cleared: 0,
            phase_changes: 0,
            anomalies: Vec::new(),
        }
    }

    #[test]
    fn default_batch_id_contains_seed_and_timestamp() {
        assert_eq!(default_batch_id(42, 123456789), "sim-42-123456789");
    }

    #[test]
    fn build_run_summary_counts_outcomes_and_averages_score() {
        let summary = build_run_summary(
            "sim-42-1".to_string(),
            "2024-01-01T00:00:00.000Z".to_string(),
            "2024-01-01T00:00:01.000Z".to_string(),
            vec![
                make_run_result(Some(Outcome::Failure), 300),
                make_run_result(Some(Outcome::Victory), 900),
                make_run_result(None, 0),
            ],
            1,
        );
        assert_eq!(summary.average_score, 400);
        assert_eq!(summary.run_count, 3);
        assert_eq!(
            summary.outcome_counts,
            BTreeMap::from([
                ("failure".to_string(), 1usize),
                ("unfinished".to_string(), 1usize),
                ("victory".to_string(), 1usize),
            ])
        );
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let target = std::env::temp_dir()
            .join(format!("bonkman-missing-{}", Utc::now().timestamp_millis()))
            .join("summary.json");
        let summary = build_run_summary(
            "sim-1-1".to_string(),
            String::new(),
            String::new(),
            vec![make_run_result(Some(Outcome::Failure), 10)],
            0,
        );
        assert!(write_summary(&target, &summary).is_err());
    }

    #[test]
    fn push_anomaly_keeps_records_and_deduplicates_summary_messages() {
        let mut anomalies = Vec::new();
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        push_anomaly(
            &mut anomalies,
            &mut records,
            &mut seen,
            10,
            "same anomaly".to_string(),
        );
        push_anomaly(
            &mut anomalies,
            &mut records,
            &mut seen,
            11,
            "same anomaly".to_string(),
        );

        assert_eq!(anomalies.len(), 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tick, 10);
        assert_eq!(records[1].tick, 11);
    }

    #[test]
    fn autopilot_run_on_built_in_levels_is_clean_and_reproducible() {
        let levels = LevelSet::embedded().expect("embedded levels");
        let first = run_once(levels.clone(), 1, 99, 5_000);
        let second = run_once(levels, 1, 99, 5_000);

        let on_open_tiles = first.anomaly_records.iter().all(|record| {
            !record.message.starts_with("player") && !record.message.starts_with("adversary")
        });
        assert!(on_open_tiles);
        assert!(first.result.pickups_eaten > 0);
        assert_eq!(first.result.score, second.result.score);
        assert_eq!(first.result.ticks, second.result.ticks);
        assert_eq!(first.result.outcome, second.result.outcome);
    }
}
