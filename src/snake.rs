// Agent and episode runner
//
// An agent owns its genome and its board. Each tick runs
// decide -> move -> eat -> death check; the episode ends the first time a
// death condition holds, at which point fitness is computed once.

use log::debug;
use std::sync::Arc;

use crate::board::{AppleSequence, Board};
use crate::brain;
use crate::config::cell_count;
use crate::error::Result;
use crate::genome::Genome;
use crate::types::{AgentSnapshot, DeathCause, Direction};
use crate::vision;

/// Per-episode counters
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeState {
    pub fitness: f64,
    pub alive: bool,
    pub moves_played: u32,
    pub moves_without_apple: u32,
    pub apples_eaten: u32,
    /// Apple eaten last tick; the body grows on the next move
    pub apple_pending: bool,
    pub death_cause: Option<DeathCause>,
}

impl Default for EpisodeState {
    fn default() -> Self {
        EpisodeState {
            fitness: 0.0,
            alive: true,
            moves_played: 0,
            moves_without_apple: 0,
            apples_eaten: 0,
            apple_pending: false,
            death_cause: None,
        }
    }
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The snake moved and is still alive
    Moved { direction: Direction, ate_apple: bool },
    /// The snake moved and died on this tick
    Died { direction: Direction, cause: DeathCause },
    /// The episode had already ended; nothing changed
    Finished,
}

/// Terminal fitness: rewards survival and apples, penalises long games with apples
pub fn fitness(moves_played: u32, apples_eaten: u32) -> f64 {
    let moves = moves_played as f64;
    let apples = apples_eaten as f64;
    moves + (2f64.powf(apples) + 500.0 * apples.powf(2.1))
        - (0.25 * moves).powf(1.3) * apples.powf(1.2)
}

/// A snake controlled by a genome
#[derive(Debug, Clone)]
pub struct Agent {
    genome: Genome,
    board: Board,
    episode: EpisodeState,
}

impl Agent {
    /// Builds an agent on a fresh board over the given apple sequence
    pub fn new(genome: Genome, grid_size: i32, apples: Arc<AppleSequence>) -> Result<Self> {
        Ok(Agent {
            genome,
            board: Board::with_apples(grid_size, apples)?,
            episode: EpisodeState::default(),
        })
    }

    /// Rebuilds an agent from a snapshot, in its initial state, ready for replay
    pub fn from_snapshot(snapshot: &AgentSnapshot) -> Result<Self> {
        let genome = Genome::from_genes(snapshot.genome.clone())?;
        let apples = AppleSequence::generate(snapshot.grid_size, snapshot.apple_seed);
        Self::new(genome, snapshot.grid_size, Arc::new(apples))
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn episode(&self) -> &EpisodeState {
        &self.episode
    }

    pub fn is_alive(&self) -> bool {
        self.episode.alive
    }

    pub fn fitness(&self) -> f64 {
        self.episode.fitness
    }

    pub fn score(&self) -> u32 {
        self.episode.apples_eaten
    }

    /// Restores the start layout and clears the episode; the genome is kept
    pub fn reset(&mut self) -> Result<()> {
        self.board.reset()?;
        self.episode = EpisodeState::default();
        Ok(())
    }

    /// Asks the network for the next direction from the current observation
    pub fn decide(&self) -> Result<Direction> {
        brain::decide(&self.genome, &vision::observe(&self.board))
    }

    /// One tick with the network choosing the direction
    pub fn step(&mut self) -> Result<TickOutcome> {
        if !self.episode.alive {
            return Ok(TickOutcome::Finished);
        }
        let direction = self.decide()?;
        self.step_with(direction)
    }

    /// One tick with an externally chosen direction
    pub fn step_with(&mut self, direction: Direction) -> Result<TickOutcome> {
        if !self.episode.alive {
            return Ok(TickOutcome::Finished);
        }

        if self.episode.apple_pending {
            self.board.grow();
            self.episode.apple_pending = false;
        } else {
            self.board.shift_body();
        }
        self.board.advance_head(direction);
        self.episode.moves_played += 1;
        self.episode.moves_without_apple += 1;

        let ate_apple = self.board.consume_apple_if_present()?;
        if ate_apple {
            self.episode.apple_pending = true;
            self.episode.apples_eaten += 1;
            self.episode.moves_without_apple = 0;
        }

        match self.death_cause() {
            Some(cause) => {
                self.die(cause);
                Ok(TickOutcome::Died { direction, cause })
            }
            None => Ok(TickOutcome::Moved { direction, ate_apple }),
        }
    }

    /// Runs ticks until the episode ends
    pub fn play(&mut self) -> Result<()> {
        while self.episode.alive {
            self.step()?;
        }
        Ok(())
    }

    /// Evaluates all three death conditions; reports the first one that holds
    fn death_cause(&self) -> Option<DeathCause> {
        let out_of_bounds = !self.board.head_in_bounds();
        let self_collision = self.board.head_hits_body();
        let limit = cell_count(self.board.size()).map_or(u32::MAX, |cells| cells as u32);
        let starved = self.episode.moves_without_apple > limit;

        if out_of_bounds {
            Some(DeathCause::OutOfBounds)
        } else if self_collision {
            Some(DeathCause::SelfCollision)
        } else if starved {
            Some(DeathCause::Starvation)
        } else {
            None
        }
    }

    fn die(&mut self, cause: DeathCause) {
        self.episode.alive = false;
        self.episode.death_cause = Some(cause);
        self.episode.fitness = fitness(self.episode.moves_played, self.episode.apples_eaten);
        debug!(
            "Agent died ({}) after {} moves with {} apples, fitness {:.2}",
            cause.as_str(),
            self.episode.moves_played,
            self.episode.apples_eaten,
            self.episode.fitness
        );
    }

    /// Serializable view of the genome and the current state
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            genome: self.genome.genes().to_vec(),
            grid_size: self.board.size(),
            apple_seed: self.board.apple_sequence().seed(),
            head: self.board.head(),
            body: self.board.body().iter().copied().collect(),
            apple: self.board.apple(),
            apples_consumed: self.board.apples_drawn(),
            heading: self.board.heading(),
            alive: self.episode.alive,
            score: self.episode.apples_eaten,
            moves_played: self.episode.moves_played,
            fitness: self.episode.fitness,
            death_cause: self.episode.death_cause,
        }
    }
}
