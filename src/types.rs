// Shared value types: board coordinates, headings and the serializable
// views handed to training-log and replay collaborators

use serde::{Deserialize, Serialize};

use crate::error::{EvolutionError, Result};

/// 2D cell coordinate on the board. Rows grow downwards, columns to the right.
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub fn new(row: i32, col: i32) -> Self {
        Coord { row, col }
    }

    /// True when both axes lie in [0, size)
    pub fn in_bounds(&self, size: i32) -> bool {
        self.row >= 0 && self.row < size && self.col >= 0 && self.col < size
    }
}

/// The four movement directions.
///
/// The declaration order is the network's output order: output 0 steers
/// left, 1 right, 2 up, 3 down. Saved genomes depend on it.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Returns all directions in output-layer order
    pub fn all() -> [Direction; 4] {
        [Direction::Left, Direction::Right, Direction::Up, Direction::Down]
    }

    /// Position of this direction in the output layer
    pub fn index(&self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Up => 2,
            Direction::Down => 3,
        }
    }

    /// Decodes an output-layer index
    pub fn from_index(idx: usize) -> Result<Direction> {
        Direction::all()
            .get(idx)
            .copied()
            .ok_or(EvolutionError::InvalidAction(idx))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// Calculates the neighbouring coordinate in this direction (no clamping)
    pub fn apply(&self, coord: &Coord) -> Coord {
        match self {
            Direction::Left => Coord { row: coord.row, col: coord.col - 1 },
            Direction::Right => Coord { row: coord.row, col: coord.col + 1 },
            Direction::Up => Coord { row: coord.row - 1, col: coord.col },
            Direction::Down => Coord { row: coord.row + 1, col: coord.col },
        }
    }
}

/// Why an episode ended. When several conditions hold on the same tick the
/// first variant listed here is reported.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    OutOfBounds,
    SelfCollision,
    Starvation,
}

impl DeathCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeathCause::OutOfBounds => "out of bounds",
            DeathCause::SelfCollision => "self collision",
            DeathCause::Starvation => "starvation",
        }
    }
}

/// Everything needed to restore an agent and replay it tick by tick
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AgentSnapshot {
    pub genome: Vec<f32>,
    pub grid_size: i32,
    pub apple_seed: u64,
    pub head: Coord,
    pub body: Vec<Coord>,
    pub apple: Coord,
    pub apples_consumed: usize,
    pub heading: Direction,
    pub alive: bool,
    pub score: u32,
    pub moves_played: u32,
    pub fitness: f64,
    pub death_cause: Option<DeathCause>,
}

/// Aggregate statistics for one evaluated generation
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GenerationSummary {
    pub generation: usize,
    pub population_size: usize,
    pub mean_fitness: f64,
    pub mean_score: f64,
    pub best_fitness: f64,
    pub best_score: u32,
    pub best_agent: AgentSnapshot,
}
