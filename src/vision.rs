// Perception encoder: turns the board around the head into the fixed
// 24-value observation fed to the network

use crate::board::Board;
use crate::types::{Coord, Direction};

pub const APPLE_FLAGS: usize = 8;
pub const WALL_DISTANCES: usize = 4;
pub const BODY_FLAGS: usize = 8;
pub const HEADING_FLAGS: usize = 4;

/// Length of the observation vector
pub const OBSERVATION_SIZE: usize = APPLE_FLAGS + WALL_DISTANCES + BODY_FLAGS + HEADING_FLAGS;

pub type Observation = [f32; OBSERVATION_SIZE];

/// Offsets of the 8 cells around the head, row-major, centre skipped
const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Builds the observation: apple direction, wall distances, body
/// proximity and heading, in that order. Pure; never mutates the board.
pub fn observe(board: &Board) -> Observation {
    let mut obs = [0.0; OBSERVATION_SIZE];
    let (apple, rest) = obs.split_at_mut(APPLE_FLAGS);
    let (walls, rest) = rest.split_at_mut(WALL_DISTANCES);
    let (body, heading) = rest.split_at_mut(BODY_FLAGS);

    apple.copy_from_slice(&apple_vision(board.head(), board.apple()));
    walls.copy_from_slice(&wall_vision(board.head(), board.size()));
    body.copy_from_slice(&body_vision(board));
    heading.copy_from_slice(&heading_vision(board.heading()));
    obs
}

/// One flag per compass octant: W, E, N, S, NW, NE, SW, SE.
///
/// Only set when the apple is on the head's row, column or an exact
/// diagonal; all zero otherwise (including apple under the head).
pub fn apple_vision(head: Coord, apple: Coord) -> [f32; APPLE_FLAGS] {
    let mut flags = [0.0; APPLE_FLAGS];
    let dr = apple.row - head.row;
    let dc = apple.col - head.col;

    let slot = match (dr.signum(), dc.signum()) {
        (0, 0) => None,
        (0, -1) => Some(0),
        (0, 1) => Some(1),
        (-1, 0) => Some(2),
        (1, 0) => Some(3),
        _ if dr.abs() != dc.abs() => None,
        (-1, -1) => Some(4),
        (-1, 1) => Some(5),
        (1, -1) => Some(6),
        _ => Some(7),
    };
    if let Some(idx) = slot {
        flags[idx] = 1.0;
    }
    flags
}

/// Closeness to the left, right, top and bottom edges: 1.0 touching, 0.0 farthest
pub fn wall_vision(head: Coord, size: i32) -> [f32; WALL_DISTANCES] {
    let span = (size - 1) as f32;
    let row = head.row as f32;
    let col = head.col as f32;
    [
        1.0 - col / span,
        1.0 - (span - col) / span,
        1.0 - row / span,
        1.0 - (span - row) / span,
    ]
}

/// One flag per neighbouring cell occupied by the body
pub fn body_vision(board: &Board) -> [f32; BODY_FLAGS] {
    let head = board.head();
    let mut flags = [0.0; BODY_FLAGS];
    for (flag, (dr, dc)) in flags.iter_mut().zip(NEIGHBOUR_OFFSETS.iter()) {
        let cell = Coord::new(head.row + dr, head.col + dc);
        if board.body_contains(&cell) {
            *flag = 1.0;
        }
    }
    flags
}

/// One-hot heading in output-layer order
pub fn heading_vision(heading: Direction) -> [f32; HEADING_FLAGS] {
    let mut flags = [0.0; HEADING_FLAGS];
    flags[heading.index()] = 1.0;
    flags
}
