// Grid environment: board geometry, the seeded apple sequence and the
// snake's spatial state (head, body, heading)

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::config::{cell_count, validate_board, BoardConfig};
use crate::error::{EvolutionError, Result};
use crate::types::{Coord, Direction};

/// Seed used when a board is built without an explicit one
pub const DEFAULT_APPLE_SEED: u64 = 2;

/// Precomputed apple positions shared by every board of a run.
///
/// Generated from its own ChaCha stream so it never consumes or depends on
/// any other randomness in the process.
#[derive(Debug, Clone, PartialEq)]
pub struct AppleSequence {
    seed: u64,
    apples: Vec<Coord>,
}

impl AppleSequence {
    /// Draws `size * size` apple positions from a stream seeded with `seed`.
    /// Sizes the board validation rejects yield an empty sequence.
    pub fn generate(size: i32, seed: u64) -> Self {
        let count = match cell_count(size) {
            Some(count) if size > 0 => count as usize,
            _ => return AppleSequence { seed, apples: Vec::new() },
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let apples = (0..count)
            .map(|_| Coord {
                row: rng.random_range(0..size),
                col: rng.random_range(0..size),
            })
            .collect();
        AppleSequence { seed, apples }
    }

    /// Builds a sequence from explicit positions
    pub fn from_coords(seed: u64, apples: Vec<Coord>) -> Self {
        AppleSequence { seed, apples }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn len(&self) -> usize {
        self.apples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apples.is_empty()
    }

    pub fn get(&self, idx: usize) -> Result<Coord> {
        self.apples
            .get(idx)
            .copied()
            .ok_or(EvolutionError::ExhaustedSequence {
                consumed: idx,
                len: self.apples.len(),
            })
    }

    pub fn as_slice(&self) -> &[Coord] {
        &self.apples
    }
}

/// One snake's board. The head is never part of `body` in a valid state.
#[derive(Debug, Clone)]
pub struct Board {
    size: i32,
    apples: Arc<AppleSequence>,
    /// Number of apples drawn so far, including the one on the board
    cursor: usize,
    apple: Coord,
    head: Coord,
    /// Neck first, tail last
    body: VecDeque<Coord>,
    heading: Direction,
}

impl Board {
    /// Creates a board with the default apple seed
    pub fn new(size: i32) -> Result<Self> {
        Self::with_seed(size, DEFAULT_APPLE_SEED)
    }

    /// Creates a board whose apple sequence is derived from `seed`
    pub fn with_seed(size: i32, seed: u64) -> Result<Self> {
        Self::with_apples(size, Arc::new(AppleSequence::generate(size, seed)))
    }

    /// Creates a board over an existing (possibly shared) apple sequence
    pub fn with_apples(size: i32, apples: Arc<AppleSequence>) -> Result<Self> {
        validate_board(&BoardConfig {
            grid_size: size,
            apple_seed: apples.seed(),
        })?;

        let (head, body) = Self::start_layout(size);
        let mut board = Board {
            size,
            apples,
            cursor: 0,
            apple: head,
            head,
            body,
            heading: Direction::Right,
        };
        board.draw_apple()?;
        Ok(board)
    }

    /// Head at the centre, two body cells trailing to the left
    fn start_layout(size: i32) -> (Coord, VecDeque<Coord>) {
        let mid = size / 2;
        let head = Coord::new(mid, mid);
        let body = VecDeque::from(vec![Coord::new(mid, mid - 1), Coord::new(mid, mid - 2)]);
        (head, body)
    }

    /// Restores the start layout and rewinds the apple sequence
    pub fn reset(&mut self) -> Result<()> {
        let (head, body) = Self::start_layout(self.size);
        self.head = head;
        self.body = body;
        self.heading = Direction::Right;
        self.cursor = 0;
        self.draw_apple()
    }

    fn draw_apple(&mut self) -> Result<()> {
        self.apple = self.apples.get(self.cursor)?;
        self.cursor += 1;
        Ok(())
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn head(&self) -> Coord {
        self.head
    }

    pub fn body(&self) -> &VecDeque<Coord> {
        &self.body
    }

    pub fn apple(&self) -> Coord {
        self.apple
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn apples_drawn(&self) -> usize {
        self.cursor
    }

    pub fn apple_sequence(&self) -> &Arc<AppleSequence> {
        &self.apples
    }

    /// Moves the head one cell and records the heading.
    /// Out-of-bounds results are kept; the death check observes them.
    pub fn advance_head(&mut self, direction: Direction) {
        self.heading = direction;
        self.head = direction.apply(&self.head);
    }

    /// Inserts a segment at the current head position (apple eaten)
    pub fn grow(&mut self) {
        self.body.push_front(self.head);
    }

    /// Inserts a segment at the current head position and drops the tail
    pub fn shift_body(&mut self) {
        self.body.push_front(self.head);
        self.body.pop_back();
    }

    /// Returns whether the head sits on the apple; if so the next apple is drawn
    pub fn consume_apple_if_present(&mut self) -> Result<bool> {
        if self.head != self.apple {
            return Ok(false);
        }
        self.draw_apple()?;
        Ok(true)
    }

    pub fn head_in_bounds(&self) -> bool {
        self.head.in_bounds(self.size)
    }

    pub fn head_hits_body(&self) -> bool {
        self.body.contains(&self.head)
    }

    pub fn body_contains(&self, coord: &Coord) -> bool {
        self.body.contains(coord)
    }
}
