//! Self-play matches between two search depths

use anyhow::{anyhow, Result};
use indicatif::*;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use rayon::prelude::*;
use tracing::info;

use std::sync::mpsc::*;
use std::thread;

use crate::{arrayboard::*, config::EngineConfig, solver::Solver, terminal::*};

/// Settings for a batch of self-play games
#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub games: usize,
    /// search depth used by player one (red), who always moves first
    pub player_one_depth: u32,
    /// search depth used by player two (yellow)
    pub player_two_depth: u32,
    /// random moves played before the engines take over, so games can differ
    pub random_opening_moves: usize,
    pub seed: u64,
    pub engine: EngineConfig,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            games: 20,
            player_one_depth: 1,
            player_two_depth: 4,
            random_opening_moves: 0,
            seed: 0,
            engine: EngineConfig::default(),
        }
    }
}

/// Outcome of one self-play game
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GameRecord {
    pub game: usize,
    pub winner: Option<Side>,
    pub moves: usize,
}

/// Totals over a batch of games
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BenchmarkReport {
    pub games: usize,
    pub player_one_wins: usize,
    pub player_two_wins: usize,
    pub draws: usize,
    pub total_moves: usize,
}

impl BenchmarkReport {
    pub fn record(&mut self, record: &GameRecord) {
        self.games += 1;
        self.total_moves += record.moves;
        match record.winner {
            Some(Side::PlayerOne) => self.player_one_wins += 1,
            Some(Side::PlayerTwo) => self.player_two_wins += 1,
            None => self.draws += 1,
        }
    }

    /// Percentage of games won by `side`
    pub fn win_rate(&self, side: Side) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        let wins = match side {
            Side::PlayerOne => self.player_one_wins,
            Side::PlayerTwo => self.player_two_wins,
        };
        wins as f64 / self.games as f64 * 100.0
    }

    pub fn average_moves(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_moves as f64 / self.games as f64
    }
}

/// Plays one game between the two configured depths
///
/// Each player searches on its own behalf: the player to move is always the
/// maximizing side of its own search.
pub fn play_match(config: &BenchmarkConfig, game: usize) -> Result<GameRecord> {
    let mut board = ArrayBoard::new(&config.engine);
    let mut players = (
        Solver::new(config.engine.clone(), Side::PlayerOne)?,
        Solver::new(config.engine.clone(), Side::PlayerTwo)?,
    );
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(game as u64));
    let mut side = Side::PlayerOne;

    loop {
        let column = if board.num_moves() < config.random_opening_moves {
            board.playable_columns().choose(&mut rng).copied()
        } else {
            let (solver, depth) = match side {
                Side::PlayerOne => (&mut players.0, config.player_one_depth),
                Side::PlayerTwo => (&mut players.1, config.player_two_depth),
            };
            solver.choose_move(&board, depth)?.column
        };

        let column = match column {
            Some(column) => column,
            // nothing left to play
            None => {
                return Ok(GameRecord {
                    game,
                    winner: game_state(&board).winner(),
                    moves: board.num_moves(),
                })
            }
        };

        board
            .play(column, side)
            .map_err(|err| anyhow!("game {}: engine picked an illegal move: {}", game, err))?;

        if find_four_in_a_row(&board, side) {
            return Ok(GameRecord {
                game,
                winner: Some(side),
                moves: board.num_moves(),
            });
        }
        if board.is_full() {
            return Ok(GameRecord {
                game,
                winner: None,
                moves: board.num_moves(),
            });
        }
        side = side.opponent();
    }
}

/// Plays all configured games in parallel and tallies the results
pub fn run(config: &BenchmarkConfig, show_progress: bool) -> Result<BenchmarkReport> {
    info!(
        games = config.games,
        player_one_depth = config.player_one_depth,
        player_two_depth = config.player_two_depth,
        "starting benchmark"
    );

    let progress = if show_progress {
        ProgressBar::new(config.games as u64)
    } else {
        ProgressBar::hidden()
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template("Playing games: {bar:40.cyan/blue} {pos}/{len} ~{eta} remaining")
            .progress_chars("█▓▒░  "),
    );

    let (tx, rx) = channel();
    let worker_config = config.clone();
    let worker = thread::spawn(move || {
        // stops handing out games once the receiver hangs up
        let _ = (1..=worker_config.games)
            .into_par_iter()
            .try_for_each_with(tx, |tx, game| tx.send(play_match(&worker_config, game)));
    });

    let mut records = Vec::with_capacity(config.games);
    let mut failure = None;
    for record in rx.iter() {
        match record {
            Ok(record) => {
                records.push(record);
                progress.inc(1);
            }
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }
    drop(rx);
    worker
        .join()
        .map_err(|_| anyhow!("benchmark worker thread panicked"))?;
    if let Some(err) = failure {
        progress.abandon();
        return Err(err);
    }
    progress.finish();

    records.sort_unstable_by_key(|record| record.game);

    let mut report = BenchmarkReport::default();
    for record in records.iter() {
        let winner = match record.winner {
            Some(side) => side.to_string(),
            None => "Draw".to_string(),
        };
        info!(
            "Game {}/{}: Winner = {} ({} moves)",
            record.game, config.games, winner, record.moves
        );
        report.record(record);
    }
    Ok(report)
}
