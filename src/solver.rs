//! A depth-limited minimax agent for Connect 4

use std::time::Instant;

use tracing::debug;

use crate::{arrayboard::*, config::*, error::EngineError, evaluation::Evaluator, terminal::*};

/// The column picked by a search and the minimax value of picking it
///
/// `column` is `None` only when the searched position is already won, drawn
/// or out of depth, in which case there is no move to report.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub column: Option<usize>,
    pub score: i64,
}

impl SearchResult {
    fn leaf(score: i64) -> Self {
        Self {
            column: None,
            score,
        }
    }
}

/// How a search score should be read
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScoreKind {
    /// the engine's side can force four in a row within the search depth
    ForcedWin,
    /// the opposing side can force four in a row within the search depth
    ForcedLoss,
    /// neither side can force a win, the score is a heuristic estimate
    Heuristic,
}

/// Orders `columns` from the middle of the board outwards
///
/// The sort is stable, so of two columns equally far from the middle the
/// lower index comes first.
pub fn order_moves(columns: &mut [usize], center: usize) {
    columns.sort_by_key(|&column| (column as isize - center as isize).abs());
}

/// An agent choosing moves by depth-limited minimax with alpha-beta pruning
///
/// # Notes
/// The agent always plays for one fixed side, the `ai` side. Positions where
/// that side has four in a row score `win_score`, positions the other side
/// has won score `loss_score`, full boards score 0 and every other position at
/// the depth limit is scored by the heuristic [`Evaluator`] from the `ai`
/// side's point of view.
#[derive(Clone)]
pub struct Solver {
    config: EngineConfig,
    evaluator: Evaluator,
    ai: Side,

    /// The number of nodes visited by the most recent search (for diagnostics only)
    pub node_count: usize,
    deadline: Option<Instant>,
}

impl Solver {
    /// Creates a new `Solver` playing for `ai`
    pub fn new(config: EngineConfig, ai: Side) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            evaluator: Evaluator::new(&config),
            config,
            ai,
            node_count: 0,
            deadline: None,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn ai(&self) -> Side {
        self.ai
    }

    /// Picks the best column for the `ai` side searching `depth` plies ahead
    ///
    /// Returns a result without a column when the position is already over.
    pub fn choose_move(&mut self, board: &ArrayBoard, depth: u32) -> Result<SearchResult, EngineError> {
        if depth == 0 {
            return Err(EngineError::InvalidDepth(0));
        }
        let start = Instant::now();
        let bound = self.config.search_bound;
        let result = self.search(board, depth, -bound, bound, true)?;

        debug!(
            column = ?result.column,
            score = result.score,
            depth,
            nodes = self.node_count,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "search finished"
        );
        Ok(result)
    }

    /// Searches `depth` plies with the given alpha-beta window
    ///
    /// `maximizing` is true when the `ai` side is the one to move.
    pub fn search(
        &mut self,
        board: &ArrayBoard,
        depth: u32,
        alpha: i64,
        beta: i64,
        maximizing: bool,
    ) -> Result<SearchResult, EngineError> {
        if board.width() != self.config.width || board.height() != self.config.height {
            return Err(EngineError::InvalidDimensions(format!(
                "board is {}x{}, engine is configured for {}x{}",
                board.height(),
                board.width(),
                self.config.height,
                self.config.width
            )));
        }
        self.node_count = 0;
        self.deadline = self.config.limits.time_limit.map(|limit| Instant::now() + limit);

        self.minimax(board, depth, alpha, beta, maximizing)
    }

    /// Counts a visited node and enforces the search limits
    fn enter_node(&mut self) -> Result<(), EngineError> {
        self.node_count += 1;
        if let Some(max_nodes) = self.config.limits.max_nodes {
            if self.node_count > max_nodes {
                return Err(EngineError::NodeBudgetExceeded(self.node_count));
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(EngineError::DeadlineExceeded(self.node_count));
            }
        }
        Ok(())
    }

    /// Scores a position where the search stops
    fn leaf_score(&self, board: &ArrayBoard, ai_won: bool, opponent_won: bool, full: bool) -> i64 {
        if ai_won {
            self.config.win_score
        } else if opponent_won {
            self.config.loss_score
        } else if full {
            0
        } else {
            self.evaluator.evaluate(board, self.ai)
        }
    }

    /// Performs game tree search
    fn minimax(
        &mut self,
        board: &ArrayBoard,
        depth: u32,
        mut alpha: i64,
        mut beta: i64,
        maximizing: bool,
    ) -> Result<SearchResult, EngineError> {
        self.enter_node()?;

        let mut columns = board.playable_columns();
        let ai_won = find_four_in_a_row(board, self.ai);
        let opponent_won = find_four_in_a_row(board, self.ai.opponent());
        let terminal = ai_won || opponent_won || columns.is_empty();

        if depth == 0 || terminal {
            let score = self.leaf_score(board, ai_won, opponent_won, columns.is_empty());
            return Ok(SearchResult::leaf(score));
        }

        order_moves(&mut columns, self.config.center_column());

        let (side, mut value) = if maximizing {
            (self.ai, -self.config.search_bound)
        } else {
            (self.ai.opponent(), self.config.search_bound)
        };
        // the first column stands until another one is strictly better
        let mut best = columns[0];

        for &column in columns.iter() {
            let child = board.with_piece_dropped(column, side)?;
            let score = self.minimax(&child, depth - 1, alpha, beta, !maximizing)?.score;

            if maximizing {
                if score > value {
                    value = score;
                    best = column;
                }
                alpha = alpha.max(value);
            } else {
                if score < value {
                    value = score;
                    best = column;
                }
                beta = beta.min(value);
            }
            // the other player will never let the game reach this branch
            if alpha >= beta {
                break;
            }
        }

        Ok(SearchResult {
            column: Some(best),
            score: value,
        })
    }

    /// Tells forced wins and losses apart from heuristic estimates
    pub fn score_kind(&self, score: i64) -> ScoreKind {
        if score >= self.config.win_score {
            ScoreKind::ForcedWin
        } else if score <= self.config.loss_score {
            ScoreKind::ForcedLoss
        } else {
            ScoreKind::Heuristic
        }
    }
}
