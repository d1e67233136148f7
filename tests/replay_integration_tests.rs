//! Training Log and Replay Integration Tests
//!
//! Trains a small population into a JSONL log, then replays it both through
//! the library and through the `replay` binary.

use std::path::PathBuf;
use std::process::Command;

use snake_evolution::config::Config;
use snake_evolution::replay::ReplayEngine;
use snake_evolution::trainer::Trainer;
use snake_evolution::training_log::{load_log_file, TrainingLog};

fn temp_log(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("snake_evolution_{}_{}.jsonl", name, std::process::id()));
    path
}

fn train_into(path: &PathBuf, generations: usize) {
    let mut config = Config::default_hardcoded();
    config.evolution.population_size = 12;
    config.evolution.n_generations = generations;
    config.runtime.ga_seed = Some(21);

    let log = TrainingLog::new(true, path.to_str().unwrap());
    assert!(log.is_enabled());
    let summaries = Trainer::with_log(config, log).run().unwrap();
    assert_eq!(summaries.len(), generations);
}

#[test]
fn test_logged_generations_replay_identically() {
    let path = temp_log("library");
    train_into(&path, 3);

    let entries = load_log_file(&path).unwrap();
    assert_eq!(entries.len(), 3);

    let engine = ReplayEngine::new(false);
    let results = engine.replay_all(&entries);
    let stats = engine.generate_stats(&results);
    assert_eq!(stats.total_generations, 3);
    assert_eq!(stats.mismatches, 0);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_replay_binary_reports_matches() {
    let path = temp_log("binary");
    train_into(&path, 2);

    let output = Command::new(env!("CARGO_BIN_EXE_replay"))
        .arg(&path)
        .arg("--all")
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "replay failed: {}", stdout);
    assert!(stdout.contains("MATCH"));
    assert!(!stdout.contains("MISMATCH"));
    assert!(stdout.contains("Replayed 2 generations"));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_replay_binary_rejects_missing_log() {
    let output = Command::new(env!("CARGO_BIN_EXE_replay"))
        .arg(temp_log("does_not_exist"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}
