//! Heuristic scoring of non-terminal positions

use crate::{arrayboard::*, config::*, WINDOW_LENGTH};

/// Cell coordinates (row, column) of one line of four
pub type Window = [(usize, usize); WINDOW_LENGTH];

fn line(row: usize, column: usize, step: impl Fn(usize, usize, usize) -> (usize, usize)) -> Window {
    let mut window = [(0, 0); WINDOW_LENGTH];
    for (i, cell) in window.iter_mut().enumerate() {
        *cell = step(row, column, i);
    }
    window
}

/// Lists every line of four on a board: rows, then columns, then both diagonals
pub fn windows(width: usize, height: usize) -> Vec<Window> {
    let span = WINDOW_LENGTH - 1;
    let mut windows = Vec::new();

    if width >= WINDOW_LENGTH {
        for row in 0..height {
            for column in 0..width - span {
                windows.push(line(row, column, |r, c, i| (r, c + i)));
            }
        }
    }
    if height >= WINDOW_LENGTH {
        for column in 0..width {
            for row in 0..height - span {
                windows.push(line(row, column, |r, c, i| (r + i, c)));
            }
        }
    }
    if width >= WINDOW_LENGTH && height >= WINDOW_LENGTH {
        for row in 0..height - span {
            for column in 0..width - span {
                windows.push(line(row, column, |r, c, i| (r + i, c + i)));
            }
        }
        for row in 0..height - span {
            for column in 0..width - span {
                windows.push(line(row, column, |r, c, i| (r + span - i, c + i)));
            }
        }
    }
    windows
}

/// Scores positions by counting tiles in every line of four
#[derive(Clone, Debug)]
pub struct Evaluator {
    weights: Weights,
    center_column: usize,
    windows: Vec<Window>,
}

impl Evaluator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            weights: config.weights,
            center_column: config.center_column(),
            windows: windows(config.width, config.height),
        }
    }

    /// Score of a single window given the tile counts inside it
    pub fn score_window(&self, own: usize, opponent: usize, empty: usize) -> i64 {
        let mut score = 0;
        match (own, empty) {
            (4, _) => score += self.weights.four,
            (3, 1) => score += self.weights.three,
            (2, 2) => score += self.weights.two,
            _ => (),
        }
        // blocking is scored on its own, never instead of the offensive terms
        if opponent == 3 && empty == 1 {
            score += self.weights.opponent_three;
        }
        score
    }

    /// Desirability of `board` for `side`; higher is better
    ///
    /// Callers are expected to only evaluate positions that are not won or drawn.
    pub fn evaluate(&self, board: &ArrayBoard, side: Side) -> i64 {
        let own_cell = side.cell();
        let opponent_cell = side.opponent().cell();

        let center = board.count_in_column(self.center_column, side) as i64 * self.weights.center;

        self.windows.iter().fold(center, |score, window| {
            let (mut own, mut opponent, mut empty) = (0, 0, 0);
            for &(row, column) in window.iter() {
                match board.cell(row, column) {
                    c if c == own_cell => own += 1,
                    c if c == opponent_cell => opponent += 1,
                    _ => empty += 1,
                }
            }
            score + self.score_window(own, opponent, empty)
        })
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }
}
