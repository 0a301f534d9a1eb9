//! A depth-limited minimax agent for the board game 'Connect 4'
//!
//! The agent searches the game tree to a fixed number of plies with
//! alpha-beta pruning and center-first move ordering, scoring the
//! positions at the search frontier with a window-counting heuristic.
//!
//! # Basic Usage
//!
//! ```
//! use connect4_minimax::{arrayboard::{ArrayBoard, Side}, config::EngineConfig, solver::Solver};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! let config = EngineConfig::default();
//! let board = ArrayBoard::new(&config);
//! let mut solver = Solver::new(config, Side::PlayerTwo)?;
//! let result = solver.choose_move(&board, 1)?;
//!
//! // the center column is the only move that earns a bonus at depth 1
//! assert_eq!((result.column, result.score), (Some(3), 6));
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod error;

pub mod config;

pub mod arrayboard;

pub mod terminal;

pub mod evaluation;

pub mod solver;

pub mod benchmark;

pub mod server;

mod test;

pub use arrayboard::{ArrayBoard, Cell, Side};
pub use config::EngineConfig;
pub use error::EngineError;
pub use solver::{SearchResult, Solver};

/// The width of the canonical game board in tiles
pub const WIDTH: usize = 7;

/// The height of the canonical game board in tiles
pub const HEIGHT: usize = 6;

/// The number of aligned tiles needed to win
pub const WINDOW_LENGTH: usize = 4;

/// Score of a position where the engine's side has four in a row
pub const WIN_SCORE: i64 = 100_000_000_000_000;

/// Score of a position where the opposing side has four in a row
pub const LOSS_SCORE: i64 = -10_000_000_000_000;

/// Initial alpha/beta magnitude, outside every reachable score
pub const SEARCH_BOUND: i64 = 1_000_000_000_000_000_000;

/// Number of 4-tile windows on a board of the given size
pub const fn window_count(width: usize, height: usize) -> usize {
    let horizontal = if width >= WINDOW_LENGTH { height * (width - 3) } else { 0 };
    let vertical = if height >= WINDOW_LENGTH { width * (height - 3) } else { 0 };
    let diagonal = if width >= WINDOW_LENGTH && height >= WINDOW_LENGTH {
        2 * (height - 3) * (width - 3)
    } else {
        0
    };
    horizontal + vertical + diagonal
}

// the terminal sentinels must dominate any heuristic sum on the canonical board
const_assert!(window_count(WIDTH, HEIGHT) == 69);
const_assert!(WIN_SCORE > (window_count(WIDTH, HEIGHT) * 10_000 + HEIGHT * 6) as i64);
const_assert!(-LOSS_SCORE > (window_count(WIDTH, HEIGHT) * 8_000) as i64);
const_assert!(SEARCH_BOUND > WIN_SCORE && SEARCH_BOUND > -LOSS_SCORE);
