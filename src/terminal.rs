//! Detection of won and drawn positions

use crate::{arrayboard::*, WINDOW_LENGTH};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GameState {
    Playing,
    PlayerOneWin,
    PlayerTwoWin,
    Draw,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameState::Playing)
    }

    pub fn winner(&self) -> Option<Side> {
        match self {
            GameState::PlayerOneWin => Some(Side::PlayerOne),
            GameState::PlayerTwoWin => Some(Side::PlayerTwo),
            _ => None,
        }
    }
}

/// Steps (row, column) of the four line orientations: horizontal, vertical, `/` and `\`
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

/// Returns true if `side` has four consecutive tiles in any row, column or diagonal
pub fn find_four_in_a_row(board: &ArrayBoard, side: Side) -> bool {
    let player = side.cell();
    let (width, height) = (board.width() as isize, board.height() as isize);
    let span = WINDOW_LENGTH as isize - 1;

    for row in 0..height {
        for column in 0..width {
            for &(dy, dx) in DIRECTIONS.iter() {
                let (end_row, end_column) = (row + dy * span, column + dx * span);
                if end_row < 0 || end_row >= height || end_column >= width {
                    continue;
                }
                if (0..=span).all(|i| {
                    board.cell((row + dy * i) as usize, (column + dx * i) as usize) == player
                }) {
                    return true;
                }
            }
        }
    }
    false
}

/// Classifies a position as won, drawn or still in play
pub fn game_state(board: &ArrayBoard) -> GameState {
    if find_four_in_a_row(board, Side::PlayerOne) {
        GameState::PlayerOneWin
    } else if find_four_in_a_row(board, Side::PlayerTwo) {
        GameState::PlayerTwoWin
    } else if board.playable_columns().is_empty() {
        GameState::Draw
    } else {
        GameState::Playing
    }
}

pub fn is_terminal(board: &ArrayBoard) -> bool {
    game_state(board).is_over()
}
