//! Engine configuration: board dimensions, heuristic weights and search limits

use std::time::Duration;

use crate::{error::EngineError, window_count, HEIGHT, LOSS_SCORE, SEARCH_BOUND, WIDTH, WIN_SCORE};

/// Scores awarded to each 4-tile window and to center column control
///
/// The defensive weight is deliberately much larger than the offensive ones,
/// the evaluator prefers blocking an opponent's three over building its own.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Weights {
    /// four of the evaluated side's tiles
    pub four: i64,
    /// three tiles and one empty cell
    pub three: i64,
    /// two tiles and two empty cells
    pub two: i64,
    /// three opponent tiles and one empty cell
    pub opponent_three: i64,
    /// per tile of the evaluated side in the middle column
    pub center: i64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            four: 10_000,
            three: 10,
            two: 5,
            opponent_three: -8_000,
            center: 6,
        }
    }
}

impl Weights {
    fn largest_magnitude(&self) -> i64 {
        [self.four, self.three, self.two, self.opponent_three]
            .iter()
            .map(|w| w.saturating_abs())
            .max()
            .unwrap_or(0)
    }
}

/// Optional bounds on the work a single search may do
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// abort once this many nodes have been visited
    pub max_nodes: Option<usize>,
    /// abort once this much wall-clock time has passed since the search began
    pub time_limit: Option<Duration>,
}

/// Everything the search needs to know about the game it is playing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub width: usize,
    pub height: usize,
    pub weights: Weights,
    pub win_score: i64,
    pub loss_score: i64,
    /// magnitude of the initial alpha/beta window
    pub search_bound: i64,
    pub limits: SearchLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            weights: Weights::default(),
            win_score: WIN_SCORE,
            loss_score: LOSS_SCORE,
            search_bound: SEARCH_BOUND,
            limits: SearchLimits::default(),
        }
    }
}

impl EngineConfig {
    /// Canonical weights and sentinels on a board of another size
    pub fn with_dimensions(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The column awarded the center control bonus
    pub fn center_column(&self) -> usize {
        self.width / 2
    }

    /// Upper bound on the absolute value the heuristic can return
    pub fn max_heuristic_magnitude(&self) -> Option<i64> {
        let windows = window_count(self.width, self.height) as i64;
        let window_total = windows.checked_mul(self.weights.largest_magnitude())?;
        let center_total = (self.height as i64).checked_mul(self.weights.center.saturating_abs())?;
        window_total.checked_add(center_total)
    }

    /// Checks that the board is non-empty and the sentinels dominate the heuristic
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions(format!(
                "{}x{} board has no cells",
                self.height, self.width
            )));
        }
        let max_heuristic = self.max_heuristic_magnitude().ok_or_else(|| {
            EngineError::InvalidConfig("heuristic weights overflow the score type".into())
        })?;
        if self.win_score <= max_heuristic {
            return Err(EngineError::InvalidConfig(format!(
                "win score {} does not dominate heuristic magnitude {}",
                self.win_score, max_heuristic
            )));
        }
        if self.loss_score >= -max_heuristic {
            return Err(EngineError::InvalidConfig(format!(
                "loss score {} does not dominate heuristic magnitude {}",
                self.loss_score, max_heuristic
            )));
        }
        if self.search_bound <= self.win_score || self.search_bound <= self.loss_score.saturating_neg() {
            return Err(EngineError::InvalidConfig(format!(
                "search bound {} must exceed both terminal scores",
                self.search_bound
            )));
        }
        Ok(())
    }
}
