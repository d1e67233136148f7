// Training log: one JSON line per evaluated generation
//
// Writes are synchronous and flushed per line so a crashed run still leaves
// every finished generation on disk. Failures disable the log; training goes on.

use log::{error, info};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Arc;

use crate::error::{EvolutionError, Result};
use crate::types::GenerationSummary;

/// A single line of the training log
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: String,
    pub summary: GenerationSummary,
}

/// Shared training log writer
#[derive(Clone)]
pub struct TrainingLog {
    file: Arc<Mutex<Option<File>>>,
}

impl TrainingLog {
    /// Creates the log file (truncating it) when enabled
    pub fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
        {
            Ok(file) => {
                info!("Training log enabled: {}", log_file_path);
                TrainingLog {
                    file: Arc::new(Mutex::new(Some(file))),
                }
            }
            Err(e) => {
                error!("Failed to create training log '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled log (no-op)
    pub fn disabled() -> Self {
        TrainingLog {
            file: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.lock().is_some()
    }

    /// Appends one generation; on failure the log turns itself off
    pub fn log_generation(&self, summary: &GenerationSummary) {
        let mut guard = self.file.lock();
        let Some(file) = guard.as_mut() else {
            return;
        };

        let entry = LogEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary: summary.clone(),
        };

        let written = serde_json::to_string(&entry)
            .map_err(|e| format!("Failed to serialize training log entry: {}", e))
            .and_then(|line| {
                writeln!(file, "{}", line)
                    .and_then(|_| file.flush())
                    .map_err(|e| format!("Failed to write training log entry: {}", e))
            });

        if let Err(e) = written {
            error!("{}", e);
            *guard = None;
        }
    }
}

/// Loads every entry of a JSONL training log
pub fn load_log_file<P: AsRef<Path>>(log_path: P) -> Result<Vec<LogEntry>> {
    let file = File::open(log_path.as_ref())
        .map_err(|e| EvolutionError::Log(format!("Failed to open log file: {}", e)))?;

    let reader = BufReader::new(file);
    let mut entries = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            EvolutionError::Log(format!("Failed to read line {}: {}", line_num + 1, e))
        })?;

        if line.trim().is_empty() {
            continue;
        }

        let entry: LogEntry = serde_json::from_str(&line).map_err(|e| {
            EvolutionError::Log(format!(
                "Failed to parse JSON on line {}: {}",
                line_num + 1,
                e
            ))
        })?;

        entries.push(entry);
    }

    info!("Loaded {} log entries", entries.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::AppleSequence;
    use crate::genome::{Genome, GENOME_LEN};
    use crate::snake::Agent;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("snake_evolution_{}_{}", std::process::id(), name))
    }

    fn summary(generation: usize) -> GenerationSummary {
        let genome = Genome::from_genes(vec![0.0; GENOME_LEN]).unwrap();
        let mut agent =
            Agent::new(genome, 10, Arc::new(AppleSequence::generate(10, 2))).unwrap();
        agent.play().unwrap();
        GenerationSummary {
            generation,
            population_size: 1,
            mean_fitness: agent.fitness(),
            mean_score: 0.0,
            best_fitness: agent.fitness(),
            best_score: 0,
            best_agent: agent.snapshot(),
        }
    }

    #[test]
    fn test_written_entries_load_back() {
        let path = temp_path("roundtrip.jsonl");
        let log = TrainingLog::new(true, path.to_str().unwrap());
        assert!(log.is_enabled());
        log.log_generation(&summary(0));
        log.log_generation(&summary(1));

        let entries = load_log_file(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].summary, summary(1));
        assert!(!entries[0].timestamp.is_empty());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_disabled_log_writes_nothing() {
        let log = TrainingLog::new(false, "unused.jsonl");
        assert!(!log.is_enabled());
        log.log_generation(&summary(0));
        assert!(!Path::new("unused.jsonl").exists());
    }

    #[test]
    fn test_malformed_line_is_reported() {
        let path = temp_path("malformed.jsonl");
        std::fs::write(&path, "{not json}\n").unwrap();
        let result = load_log_file(&path);
        assert!(matches!(result, Err(EvolutionError::Log(_))));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_missing_log_is_an_error() {
        assert!(load_log_file("does_not_exist.jsonl").is_err());
    }
}
