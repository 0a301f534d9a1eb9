use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};

use std::fmt;
use std::io::{stdout, Write};

use crate::{config::EngineConfig, error::EngineError};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Cell {
    PlayerOne,
    PlayerTwo,
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Parses the transport symbol of a cell: 0 empty, 1 player one, 2 player two
    pub fn from_symbol(symbol: i64) -> Option<Self> {
        match symbol {
            0 => Some(Cell::Empty),
            1 => Some(Cell::PlayerOne),
            2 => Some(Cell::PlayerTwo),
            _ => None,
        }
    }

    pub fn symbol(&self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::PlayerOne => 1,
            Cell::PlayerTwo => 2,
        }
    }
}

/// One of the two players
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Side {
    PlayerOne,
    PlayerTwo,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::PlayerOne => Side::PlayerTwo,
            Side::PlayerTwo => Side::PlayerOne,
        }
    }

    pub fn cell(self) -> Cell {
        match self {
            Side::PlayerOne => Cell::PlayerOne,
            Side::PlayerTwo => Cell::PlayerTwo,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::PlayerOne => write!(f, "Player 1 (Red)"),
            Side::PlayerTwo => write!(f, "Player 2 (Yellow)"),
        }
    }
}

/// A board of arbitrary size stored as a flat array of cells
///
/// Row 0 is the bottom row. Tiles always rest on the bottom or on another
/// tile, so `heights[column]` is both the number of tiles in a column and
/// the row the next tile dropped into it lands on.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ArrayBoard {
    width: usize,
    height: usize,
    cells: Vec<Cell>, // cells are stored left-to-right, bottom-to-top
    heights: Vec<usize>,
    num_moves: usize,
}

impl ArrayBoard {
    /// Creates an empty board with the configured dimensions
    pub fn new(config: &EngineConfig) -> Self {
        Self::empty(config.width, config.height)
    }

    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
            heights: vec![0; width],
            num_moves: 0,
        }
    }

    /// Builds a board from rows listed bottom-to-top
    pub fn from_rows(rows: &[Vec<Cell>]) -> Result<Self, EngineError> {
        let height = rows.len();
        let width = rows.first().map(|row| row.len()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(EngineError::InvalidDimensions(format!(
                "{}x{} board has no cells",
                height, width
            )));
        }
        if let Some((row, bad)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(EngineError::InvalidDimensions(format!(
                "row {} has {} cells, expected {}",
                row,
                bad.len(),
                width
            )));
        }

        let mut board = Self::empty(width, height);
        for (row, cells) in rows.iter().enumerate() {
            for (column, &cell) in cells.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                if board.heights[column] != row {
                    return Err(EngineError::FloatingTile { row, column });
                }
                board.cells[column + width * row] = cell;
                board.heights[column] += 1;
                board.num_moves += 1;
            }
        }
        Ok(board)
    }

    /// Builds a board from transport symbols listed top-to-bottom
    pub fn from_symbols_top_down(rows: &[Vec<i64>]) -> Result<Self, EngineError> {
        let height = rows.len();
        let mut bottom_up = Vec::with_capacity(height);
        for (top_row, symbols) in rows.iter().enumerate().rev() {
            let row = height - 1 - top_row;
            let cells = symbols
                .iter()
                .enumerate()
                .map(|(column, &value)| {
                    Cell::from_symbol(value).ok_or(EngineError::InvalidCell { row, column, value })
                })
                .collect::<Result<Vec<_>, _>>()?;
            bottom_up.push(cells);
        }
        Self::from_rows(&bottom_up)
    }

    /// Plays a sequence of one-indexed column digits, player one first
    pub fn from_moves(config: &EngineConfig, moves: &str) -> Result<Self> {
        let mut board = Self::new(config);
        let mut side = Side::PlayerOne;

        for column_char in moves.chars() {
            match column_char.to_digit(10).map(|c| c as usize) {
                Some(column) if column >= 1 => {
                    board.play(column - 1, side)?;
                    side = side.opponent();
                }
                _ => {
                    return Err(anyhow::anyhow!(
                        "could not parse '{}' as a valid move",
                        column_char
                    ))
                }
            }
        }
        Ok(board)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_moves(&self) -> usize {
        self.num_moves
    }

    /// The cell at `row` (counted from the bottom) and `column`
    ///
    /// # Panics
    ///
    /// Panics if `row` or `column` lies outside the board, see [`ArrayBoard::get`]
    pub fn cell(&self, row: usize, column: usize) -> Cell {
        self.cells[column + self.width * row]
    }

    /// The cell at `row` and `column`, or `None` off the board
    pub fn get(&self, row: usize, column: usize) -> Option<Cell> {
        if row < self.height && column < self.width {
            Some(self.cell(row, column))
        } else {
            None
        }
    }

    /// Rows from top to bottom as transport symbols
    pub fn to_symbols_top_down(&self) -> Vec<Vec<u8>> {
        (0..self.height)
            .rev()
            .map(|row| (0..self.width).map(|column| self.cell(row, column).symbol()).collect())
            .collect()
    }

    pub fn is_column_playable(&self, column: usize) -> bool {
        column < self.width && self.heights[column] < self.height
    }

    /// The row the next tile dropped into `column` lands on
    pub fn lowest_empty_row(&self, column: usize) -> Result<usize, EngineError> {
        self.check_column(column)?;
        Ok(self.heights[column])
    }

    /// Returns a copy of this board with `side`'s tile dropped into `column`
    pub fn with_piece_dropped(&self, column: usize, side: Side) -> Result<Self, EngineError> {
        let mut next = self.clone();
        next.play(column, side)?;
        Ok(next)
    }

    /// Drops `side`'s tile into `column` in place, returning the row it landed on
    pub fn play(&mut self, column: usize, side: Side) -> Result<usize, EngineError> {
        let row = self.lowest_empty_row(column)?;
        self.cells[column + self.width * row] = side.cell();
        self.heights[column] += 1;
        self.num_moves += 1;
        Ok(row)
    }

    /// Removes the top tile of `column`, reverting the last `play` into it
    pub fn undo(&mut self, column: usize) -> Result<(), EngineError> {
        if column >= self.width {
            return Err(EngineError::InvalidColumn {
                column,
                width: self.width,
            });
        }
        let height = self.heights[column];
        if height == 0 {
            return Err(EngineError::ColumnEmpty(column));
        }
        self.heights[column] = height - 1;
        self.cells[column + self.width * (height - 1)] = Cell::Empty;
        self.num_moves -= 1;
        Ok(())
    }

    /// Columns with room for another tile, in ascending order
    pub fn playable_columns(&self) -> Vec<usize> {
        (0..self.width)
            .filter(|&column| self.is_column_playable(column))
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.num_moves == self.width * self.height
    }

    /// Number of `side`'s tiles in `column`
    pub fn count_in_column(&self, column: usize, side: Side) -> usize {
        let cell = side.cell();
        (0..self.heights[column])
            .filter(|&row| self.cell(row, column) == cell)
            .count()
    }

    fn check_column(&self, column: usize) -> Result<(), EngineError> {
        if column >= self.width {
            return Err(EngineError::InvalidColumn {
                column,
                width: self.width,
            });
        }
        if self.heights[column] >= self.height {
            return Err(EngineError::ColumnFull(column));
        }
        Ok(())
    }

    pub fn display(&self) -> Result<()> {
        let mut stdout = stdout();

        let cols: String = (1..=self.width).map(|x| (x % 10).to_string()).collect();
        stdout.queue(PrintStyledContent(style(cols + "\n")))?;
        for _ in 0..self.height {
            stdout.queue(PrintStyledContent(style("\n")))?;
        }
        stdout.flush()?;

        let (origin_x, origin_y) = crossterm::cursor::position()?;

        for (idx, cell) in self.cells.iter().enumerate() {
            let (pos_x, pos_y) = (
                origin_x + (idx % self.width) as u16,
                origin_y - (idx / self.width) as u16,
            );

            stdout
                .queue(MoveTo(pos_x, pos_y))?
                .queue(PrintStyledContent(
                    style("O")
                        .attribute(Attribute::Bold)
                        .on(Color::DarkBlue)
                        .with(match cell {
                            Cell::PlayerOne => Color::Red,
                            Cell::PlayerTwo => Color::Yellow,
                            Cell::Empty => Color::DarkBlue,
                        }),
                ))?;
        }
        stdout
            .queue(MoveTo(origin_x + self.width as u16, origin_y))?
            .queue(PrintStyledContent(style("\n")))?;
        stdout.flush()?;
        Ok(())
    }
}

impl fmt::Display for ArrayBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.height).rev() {
            for column in 0..self.width {
                let c = match self.cell(row, column) {
                    Cell::PlayerOne => 'R',
                    Cell::PlayerTwo => 'Y',
                    Cell::Empty => '.',
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
