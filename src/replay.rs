// Replay module for re-running logged agents tick by tick
//
// This module provides functionality to:
// 1. Restore the best agent of a logged generation from its snapshot
// 2. Replay its episode one tick at a time, recording every frame
// 3. Check that the replayed score and fitness match the logged ones
// 4. Render frames as text for terminal inspection

use log::{info, warn};

use crate::error::{EvolutionError, Result};
use crate::snake::{Agent, TickOutcome};
use crate::training_log::LogEntry;
use crate::types::{AgentSnapshot, Coord, DeathCause, Direction};

/// Board state after one tick (tick 0 is the initial state)
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub tick: u32,
    pub direction: Option<Direction>,
    pub head: Coord,
    pub body: Vec<Coord>,
    pub apple: Coord,
    pub score: u32,
    pub alive: bool,
}

impl Frame {
    fn capture(agent: &Agent, tick: u32, direction: Option<Direction>) -> Self {
        let board = agent.board();
        Frame {
            tick,
            direction,
            head: board.head(),
            body: board.body().iter().copied().collect(),
            apple: board.apple(),
            score: agent.score(),
            alive: agent.is_alive(),
        }
    }

    /// Text picture of the board: `H` head, `o` body, `*` apple, `.` empty.
    /// A head outside the board is not drawn.
    pub fn render(&self, size: i32) -> String {
        let mut out = String::with_capacity(((size + 1) * size) as usize);
        for row in 0..size {
            for col in 0..size {
                let cell = Coord::new(row, col);
                let ch = if cell == self.head {
                    'H'
                } else if self.body.contains(&cell) {
                    'o'
                } else if cell == self.apple {
                    '*'
                } else {
                    '.'
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}

/// Result of replaying one logged agent
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub generation: usize,
    pub logged_score: u32,
    pub replayed_score: u32,
    pub logged_fitness: f64,
    pub replayed_fitness: f64,
    pub death_cause: Option<DeathCause>,
    pub matches: bool,
    pub frames: Vec<Frame>,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_generations: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for training logs
pub struct ReplayEngine {
    verbose: bool,
}

impl ReplayEngine {
    pub fn new(verbose: bool) -> Self {
        ReplayEngine { verbose }
    }

    /// Restores the agent from `snapshot`, resets it and steps it to the end
    /// of its episode, returning the final agent and every frame
    pub fn replay_snapshot(&self, snapshot: &AgentSnapshot) -> Result<(Agent, Vec<Frame>)> {
        let mut agent = Agent::from_snapshot(snapshot)?;
        agent.reset()?;

        let mut frames = vec![Frame::capture(&agent, 0, None)];
        let mut tick = 0;
        loop {
            let direction = match agent.step()? {
                TickOutcome::Moved { direction, .. } | TickOutcome::Died { direction, .. } => {
                    direction
                }
                TickOutcome::Finished => break,
            };
            tick += 1;
            frames.push(Frame::capture(&agent, tick, Some(direction)));
        }

        Ok((agent, frames))
    }

    /// Replays the best agent of one log entry and compares the outcome
    pub fn replay_entry(&self, entry: &LogEntry) -> Result<ReplayResult> {
        let summary = &entry.summary;
        if self.verbose {
            info!("Replaying best agent of generation {}...", summary.generation);
        }

        let (agent, frames) = self.replay_snapshot(&summary.best_agent)?;
        let logged = &summary.best_agent;
        let matches = agent.score() == logged.score && agent.fitness() == logged.fitness;

        let result = ReplayResult {
            generation: summary.generation,
            logged_score: logged.score,
            replayed_score: agent.score(),
            logged_fitness: logged.fitness,
            replayed_fitness: agent.fitness(),
            death_cause: agent.episode().death_cause,
            matches,
            frames,
        };

        if self.verbose {
            if matches {
                info!(
                    "Generation {}: ✓ MATCH - score {} fitness {:.2} ({} ticks)",
                    result.generation,
                    result.replayed_score,
                    result.replayed_fitness,
                    result.frames.len() - 1
                );
            } else {
                warn!(
                    "Generation {}: ✗ MISMATCH - logged score {} fitness {:.2}, replayed score {} fitness {:.2}",
                    result.generation,
                    result.logged_score,
                    result.logged_fitness,
                    result.replayed_score,
                    result.replayed_fitness
                );
            }
        }

        Ok(result)
    }

    /// Replays every entry; entries that fail are skipped with a warning
    pub fn replay_all(&self, entries: &[LogEntry]) -> Vec<ReplayResult> {
        let mut results = Vec::new();

        for entry in entries {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!(
                        "Failed to replay generation {}: {}",
                        entry.summary.generation, e
                    );
                }
            }
        }

        results
    }

    /// Replays the listed generations
    pub fn replay_generations(
        &self,
        entries: &[LogEntry],
        generations: &[usize],
    ) -> Result<Vec<ReplayResult>> {
        let mut results = Vec::new();

        for generation in generations {
            let entry = entries
                .iter()
                .find(|e| e.summary.generation == *generation)
                .ok_or_else(|| {
                    EvolutionError::Log(format!("Generation {} not found in log file", generation))
                })?;

            results.push(self.replay_entry(entry)?);
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_generations = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_generations - matches;
        let match_rate = if total_generations > 0 {
            (matches as f64 / total_generations as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_generations,
            matches,
            mismatches,
            match_rate,
        }
    }
}
