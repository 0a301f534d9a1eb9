//! Errors raised by the board, the evaluator and the search

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid column {column}, columns must be between 0 and {width}")]
    InvalidColumn { column: usize, width: usize },

    #[error("column {0} is full")]
    ColumnFull(usize),

    #[error("column {0} has no tile to remove")]
    ColumnEmpty(usize),

    #[error("invalid board dimensions: {0}")]
    InvalidDimensions(String),

    #[error("tile at row {row}, column {column} is floating above an empty cell")]
    FloatingTile { row: usize, column: usize },

    #[error("invalid cell value {value} at row {row}, column {column}")]
    InvalidCell { row: usize, column: usize, value: i64 },

    #[error("invalid search depth {0}, depth must be at least 1")]
    InvalidDepth(i64),

    #[error("search depth {depth} exceeds the limit of {max}")]
    DepthLimitExceeded { depth: i64, max: u32 },

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("search aborted after visiting {0} nodes")]
    NodeBudgetExceeded(usize),

    #[error("search deadline exceeded after visiting {0} nodes")]
    DeadlineExceeded(usize),
}
