#[cfg(test)]
pub mod test {
    use anyhow::{anyhow, Result};
    use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

    use std::time::Duration;

    use crate::{
        arrayboard::*,
        benchmark::{self, BenchmarkConfig, BenchmarkReport, GameRecord},
        config::*,
        error::EngineError,
        evaluation::{windows, Evaluator},
        solver::*,
        terminal::*,
        window_count, LOSS_SCORE, WIN_SCORE,
    };

    /// Builds a board from rows drawn top-to-bottom: 'R' player one, 'Y' player two, '.' empty
    fn board_from(rows: &[&str]) -> Result<ArrayBoard> {
        let mut bottom_up = Vec::new();
        for row in rows.iter().rev() {
            let cells = row
                .chars()
                .map(|c| match c {
                    'R' => Ok(Cell::PlayerOne),
                    'Y' => Ok(Cell::PlayerTwo),
                    '.' => Ok(Cell::Empty),
                    _ => Err(anyhow!("unknown cell '{}'", c)),
                })
                .collect::<Result<Vec<_>>>()?;
            bottom_up.push(cells);
        }
        Ok(ArrayBoard::from_rows(&bottom_up)?)
    }

    /// A full board where nobody has four in a row
    fn drawn_board() -> Result<ArrayBoard> {
        board_from(&[
            "YRYRYRY", "YRYRYRY", "RYRYRYR", "RYRYRYR", "YRYRYRY", "YRYRYRY",
        ])
    }

    /// Plays up to `plies` random moves, stopping early once the game is over
    fn random_board(rng: &mut StdRng, config: &EngineConfig, plies: usize) -> Result<ArrayBoard> {
        let mut board = ArrayBoard::new(config);
        let mut side = Side::PlayerOne;
        for _ in 0..plies {
            if is_terminal(&board) {
                break;
            }
            let column = *board
                .playable_columns()
                .choose(rng)
                .ok_or(anyhow!("no playable column"))?;
            board.play(column, side)?;
            side = side.opponent();
        }
        Ok(board)
    }

    /// Minimax without pruning or move ordering, for comparison
    fn exhaustive(solver: &Solver, board: &ArrayBoard, depth: u32, maximizing: bool) -> i64 {
        let config = solver.config();
        let columns = board.playable_columns();
        let ai_won = find_four_in_a_row(board, solver.ai());
        let opponent_won = find_four_in_a_row(board, solver.ai().opponent());

        if ai_won {
            return config.win_score;
        }
        if opponent_won {
            return config.loss_score;
        }
        if columns.is_empty() {
            return 0;
        }
        if depth == 0 {
            return solver.evaluator().evaluate(board, solver.ai());
        }

        let side = if maximizing {
            solver.ai()
        } else {
            solver.ai().opponent()
        };
        let scores = columns.iter().map(|&column| {
            let child = board.with_piece_dropped(column, side).unwrap();
            exhaustive(solver, &child, depth - 1, !maximizing)
        });
        if maximizing {
            scores.max().unwrap()
        } else {
            scores.min().unwrap()
        }
    }

    #[test]
    pub fn gravity_drop() -> Result<()> {
        let config = EngineConfig::default();
        let board = ArrayBoard::new(&config);

        assert_eq!(board.playable_columns(), (0..7).collect::<Vec<_>>());
        assert_eq!(board.lowest_empty_row(2)?, 0);

        let next = board.with_piece_dropped(2, Side::PlayerOne)?;
        let next = next.with_piece_dropped(2, Side::PlayerTwo)?;
        assert_eq!(next.cell(0, 2), Cell::PlayerOne);
        assert_eq!(next.cell(1, 2), Cell::PlayerTwo);
        assert_eq!(next.lowest_empty_row(2)?, 2);
        assert_eq!(next.num_moves(), 2);

        assert_eq!(next.get(1, 2), Some(Cell::PlayerTwo));
        assert_eq!(next.get(5, 6), Some(Cell::Empty));
        assert_eq!(next.get(6, 0), None);
        assert_eq!(next.get(0, 7), None);

        // the parent is never touched by a drop
        assert_eq!(board, ArrayBoard::new(&config));
        Ok(())
    }

    #[test]
    pub fn illegal_drops() -> Result<()> {
        let config = EngineConfig::default();
        let board = ArrayBoard::from_moves(&config, "444444")?;

        assert!(!board.is_column_playable(3));
        assert_eq!(board.playable_columns(), vec![0, 1, 2, 4, 5, 6]);
        assert_eq!(board.lowest_empty_row(3), Err(EngineError::ColumnFull(3)));
        assert_eq!(
            board.with_piece_dropped(3, Side::PlayerOne),
            Err(EngineError::ColumnFull(3))
        );
        assert_eq!(
            board.with_piece_dropped(7, Side::PlayerOne),
            Err(EngineError::InvalidColumn { column: 7, width: 7 })
        );
        assert!(ArrayBoard::from_moves(&config, "4444444").is_err());
        assert!(ArrayBoard::from_moves(&config, "40").is_err());
        Ok(())
    }

    #[test]
    pub fn play_and_undo() -> Result<()> {
        let config = EngineConfig::default();
        let mut board = ArrayBoard::from_moves(&config, "3344")?;
        let before = board.clone();

        assert_eq!(board.play(3, Side::PlayerOne)?, 2);
        board.undo(3)?;
        assert_eq!(board, before);
        assert_eq!(board.undo(0), Err(EngineError::ColumnEmpty(0)));
        assert_eq!(
            board.undo(7),
            Err(EngineError::InvalidColumn { column: 7, width: 7 })
        );
        Ok(())
    }

    #[test]
    pub fn board_parsing() -> Result<()> {
        // transport rows arrive top first
        let mut symbols = vec![vec![0i64; 7]; 6];
        symbols[5][3] = 1;
        symbols[4][3] = 2;
        let board = ArrayBoard::from_symbols_top_down(&symbols)?;
        assert_eq!(board.cell(0, 3), Cell::PlayerOne);
        assert_eq!(board.cell(1, 3), Cell::PlayerTwo);
        assert_eq!(board.to_symbols_top_down()[4][3], 2);

        symbols[0][0] = 1;
        assert_eq!(
            ArrayBoard::from_symbols_top_down(&symbols),
            Err(EngineError::FloatingTile { row: 5, column: 0 })
        );

        symbols[0][0] = 5;
        assert!(matches!(
            ArrayBoard::from_symbols_top_down(&symbols),
            Err(EngineError::InvalidCell { value: 5, .. })
        ));

        let ragged = vec![vec![0i64; 7], vec![0i64; 6]];
        assert!(matches!(
            ArrayBoard::from_symbols_top_down(&ragged),
            Err(EngineError::InvalidDimensions(_))
        ));
        assert!(ArrayBoard::from_symbols_top_down(&[]).is_err());
        Ok(())
    }

    #[test]
    pub fn four_in_a_row_orientations() -> Result<()> {
        let horizontal = board_from(&[
            ".......", ".......", ".......", ".......", ".YYY...", ".RRRR..",
        ])?;
        let vertical = board_from(&[
            ".......", ".......", "..Y....", "..Y....", "..YR...", "..YRR..",
        ])?;
        let rising = board_from(&[
            ".......", ".......", "......R", ".....RY", "....RYY", "...RYYR",
        ])?;
        let falling = board_from(&[
            ".......", ".......", "Y......", "RY.....", "RRY....", "RRRY...",
        ])?;
        let three = board_from(&[
            ".......", ".......", ".......", ".......", "YY.....", "RRR.Y..",
        ])?;

        assert!(find_four_in_a_row(&horizontal, Side::PlayerOne));
        assert!(!find_four_in_a_row(&horizontal, Side::PlayerTwo));
        assert!(find_four_in_a_row(&vertical, Side::PlayerTwo));
        assert!(find_four_in_a_row(&rising, Side::PlayerOne));
        assert!(find_four_in_a_row(&falling, Side::PlayerTwo));
        assert!(!find_four_in_a_row(&three, Side::PlayerOne));

        assert_eq!(game_state(&horizontal), GameState::PlayerOneWin);
        assert_eq!(game_state(&vertical), GameState::PlayerTwoWin);
        assert_eq!(game_state(&three), GameState::Playing);
        assert_eq!(game_state(&drawn_board()?), GameState::Draw);
        Ok(())
    }

    #[test]
    pub fn four_in_a_row_matches_windows() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(7);
        for (width, height) in [(7, 6), (4, 4), (5, 7), (3, 5)].iter() {
            let config = EngineConfig::with_dimensions(*width, *height);
            let lines = windows(*width, *height);
            assert_eq!(lines.len(), window_count(*width, *height));

            for _ in 0..200 {
                let plies = rng.gen_range(0..=width * height);
                let mut board = ArrayBoard::new(&config);
                let mut side = Side::PlayerOne;
                for _ in 0..plies {
                    let column = *board.playable_columns().choose(&mut rng).unwrap();
                    board.play(column, side)?;
                    side = side.opponent();
                }

                for side in [Side::PlayerOne, Side::PlayerTwo].iter() {
                    let expected = lines
                        .iter()
                        .any(|line| line.iter().all(|&(r, c)| board.cell(r, c) == side.cell()));
                    assert_eq!(find_four_in_a_row(&board, *side), expected, "\n{}", board);
                }
            }
        }
        Ok(())
    }

    #[test]
    pub fn heuristic_weights() -> Result<()> {
        let evaluator = Evaluator::new(&EngineConfig::default());
        assert_eq!(evaluator.window_count(), 69);

        let empty = ArrayBoard::new(&EngineConfig::default());
        assert_eq!(evaluator.evaluate(&empty, Side::PlayerOne), 0);

        let center = board_from(&[
            ".......", ".......", ".......", ".......", "...R...", "...R...",
        ])?;
        // two center tiles plus the vertical pair with two empty cells above it
        assert_eq!(evaluator.evaluate(&center, Side::PlayerOne), 2 * 6 + 5);

        let pair = board_from(&[
            ".......", ".......", ".......", ".......", ".......", "RR.....",
        ])?;
        assert_eq!(evaluator.evaluate(&pair, Side::PlayerOne), 5);

        let three = board_from(&[
            ".......", ".......", ".......", ".......", ".......", "RRR....",
        ])?;
        // blocking weighs far more than building
        assert_eq!(evaluator.evaluate(&three, Side::PlayerTwo), -8000);
        assert_eq!(evaluator.evaluate(&three, Side::PlayerOne), 10 + 5);

        let four = board_from(&[
            ".......", ".......", ".......", ".......", ".......", "YYYY...",
        ])?;
        // one window of four, one of three, one of two and a center tile
        assert_eq!(evaluator.evaluate(&four, Side::PlayerTwo), 10000 + 10 + 5 + 6);

        assert_eq!(evaluator.score_window(0, 3, 1), -8000);
        assert_eq!(evaluator.score_window(2, 1, 1), 0);
        assert_eq!(evaluator.score_window(1, 0, 3), 0);
        Ok(())
    }

    #[test]
    pub fn center_first_ordering() {
        let mut columns: Vec<usize> = (0..7).collect();
        order_moves(&mut columns, 3);
        assert_eq!(columns, vec![3, 2, 4, 1, 5, 0, 6]);

        let mut columns: Vec<usize> = (0..6).collect();
        order_moves(&mut columns, 3);
        assert_eq!(columns, vec![3, 2, 4, 1, 5, 0]);

        let mut columns = vec![0, 1, 5, 6];
        order_moves(&mut columns, 3);
        assert_eq!(columns, vec![1, 5, 0, 6]);
    }

    #[test]
    pub fn depth_zero_is_heuristic() -> Result<()> {
        let config = EngineConfig::default();
        let board = ArrayBoard::from_moves(&config, "4453")?;
        let mut solver = Solver::new(config.clone(), Side::PlayerTwo)?;
        let bound = config.search_bound;

        let result = solver.search(&board, 0, -bound, bound, true)?;
        assert_eq!(result.column, None);
        assert_eq!(result.score, solver.evaluator().evaluate(&board, Side::PlayerTwo));
        assert_eq!(solver.node_count, 1);
        Ok(())
    }

    #[test]
    pub fn empty_board_plays_center() -> Result<()> {
        let config = EngineConfig::default();
        let board = ArrayBoard::new(&config);
        let mut solver = Solver::new(config, Side::PlayerTwo)?;

        let result = solver.choose_move(&board, 1)?;
        assert_eq!(result, SearchResult { column: Some(3), score: 6 });
        Ok(())
    }

    #[test]
    pub fn takes_immediate_win_at_every_depth() -> Result<()> {
        let board = board_from(&[
            ".......", ".......", ".......", ".......", ".......", "RRR.YY.",
        ])?;
        let mut solver = Solver::new(EngineConfig::default(), Side::PlayerOne)?;

        for depth in 1..=5 {
            let result = solver.choose_move(&board, depth)?;
            assert_eq!(result.column, Some(3), "depth {}", depth);
            assert_eq!(result.score, WIN_SCORE, "depth {}", depth);
            assert_eq!(solver.score_kind(result.score), ScoreKind::ForcedWin);
        }
        Ok(())
    }

    #[test]
    pub fn blocks_open_three() -> Result<()> {
        let board = board_from(&[
            ".......", ".......", ".......", ".......", "....Y..", "RRR.Y..",
        ])?;
        let mut solver = Solver::new(EngineConfig::default(), Side::PlayerTwo)?;

        let result = solver.choose_move(&board, 2)?;
        assert_eq!(result.column, Some(3));
        assert!(result.score > LOSS_SCORE);

        // with a single ply the engine still sees the -8000 window disappear
        let result = solver.choose_move(&board, 1)?;
        assert_eq!(result.column, Some(3));
        Ok(())
    }

    #[test]
    pub fn full_board_is_a_draw() -> Result<()> {
        let board = drawn_board()?;
        assert!(board.playable_columns().is_empty());

        for side in [Side::PlayerOne, Side::PlayerTwo].iter() {
            let mut solver = Solver::new(EngineConfig::default(), *side)?;
            for depth in 1..=4 {
                let result = solver.choose_move(&board, depth)?;
                assert_eq!(result, SearchResult { column: None, score: 0 });
            }
        }
        Ok(())
    }

    #[test]
    pub fn won_position_has_no_move() -> Result<()> {
        let board = board_from(&[
            ".......", ".......", ".......", ".......", "YYY....", "RRRR...",
        ])?;
        let mut solver = Solver::new(EngineConfig::default(), Side::PlayerTwo)?;

        let result = solver.choose_move(&board, 3)?;
        assert_eq!(result, SearchResult { column: None, score: LOSS_SCORE });
        assert_eq!(solver.score_kind(result.score), ScoreKind::ForcedLoss);
        Ok(())
    }

    #[test]
    pub fn last_empty_cell_is_chosen() -> Result<()> {
        let mut board = drawn_board()?;
        board.undo(5)?;
        assert_eq!(board.playable_columns(), vec![5]);

        for side in [Side::PlayerOne, Side::PlayerTwo].iter() {
            let mut solver = Solver::new(EngineConfig::default(), *side)?;
            for depth in 1..=3 {
                assert_eq!(solver.choose_move(&board, depth)?.column, Some(5));
            }
        }
        Ok(())
    }

    #[test]
    pub fn ties_prefer_the_center() -> Result<()> {
        // without the center bonus every first move on an empty board is worth 0
        let mut config = EngineConfig::default();
        config.weights.center = 0;
        let mut solver = Solver::new(config.clone(), Side::PlayerOne)?;
        let result = solver.choose_move(&ArrayBoard::new(&config), 1)?;
        assert_eq!(result, SearchResult { column: Some(3), score: 0 });

        // the board is mirror symmetric around the full center column,
        // so columns 2 and 4 are worth the same and the lower one wins
        let board = board_from(&[
            "...Y...", "...R...", "...Y...", "...R...", "...Y...", "...R...",
        ])?;
        let mut solver = Solver::new(EngineConfig::default(), Side::PlayerOne)?;
        assert_eq!(solver.choose_move(&board, 1)?, SearchResult { column: Some(2), score: 33 });
        Ok(())
    }

    #[test]
    pub fn pruning_preserves_scores() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(42);

        for (width, height) in [(7, 6), (5, 4)].iter() {
            let config = EngineConfig::with_dimensions(*width, *height);
            let bound = config.search_bound;

            for _ in 0..25 {
                let plies = rng.gen_range(0..(width * height) / 2);
                let board = random_board(&mut rng, &config, plies)?;
                let side = if rng.gen() { Side::PlayerOne } else { Side::PlayerTwo };
                let mut solver = Solver::new(config.clone(), side)?;

                for depth in 0..=4 {
                    for &maximizing in [true, false].iter() {
                        let pruned = solver.search(&board, depth, -bound, bound, maximizing)?;
                        let full = exhaustive(&solver, &board, depth, maximizing);
                        assert_eq!(pruned.score, full, "depth {}\n{}", depth, board);
                    }
                }
            }
        }
        Ok(())
    }

    #[test]
    pub fn search_is_deterministic() -> Result<()> {
        let config = EngineConfig::default();
        let board = ArrayBoard::from_moves(&config, "44352")?;
        let mut solver = Solver::new(config, Side::PlayerTwo)?;

        let first = solver.choose_move(&board, 4)?;
        let nodes = solver.node_count;
        let second = solver.choose_move(&board, 4)?;
        assert_eq!(first, second);
        assert_eq!(nodes, solver.node_count);
        assert!(first.column.is_some());
        Ok(())
    }

    #[test]
    pub fn rejects_bad_requests() -> Result<()> {
        let config = EngineConfig::default();
        let mut solver = Solver::new(config.clone(), Side::PlayerTwo)?;

        assert_eq!(
            solver.choose_move(&ArrayBoard::new(&config), 0),
            Err(EngineError::InvalidDepth(0))
        );
        assert!(matches!(
            solver.choose_move(&ArrayBoard::empty(6, 6), 2),
            Err(EngineError::InvalidDimensions(_))
        ));

        let mut weak = config.clone();
        weak.win_score = 1000;
        assert!(matches!(Solver::new(weak, Side::PlayerOne), Err(EngineError::InvalidConfig(_))));

        let mut narrow = config.clone();
        narrow.search_bound = WIN_SCORE;
        assert!(matches!(narrow.validate(), Err(EngineError::InvalidConfig(_))));

        assert!(matches!(
            EngineConfig::with_dimensions(0, 6).validate(),
            Err(EngineError::InvalidDimensions(_))
        ));
        Ok(())
    }

    #[test]
    pub fn search_limits() -> Result<()> {
        let board = ArrayBoard::new(&EngineConfig::default());

        let config = EngineConfig::default().with_limits(SearchLimits {
            max_nodes: Some(10),
            time_limit: None,
        });
        let mut solver = Solver::new(config, Side::PlayerOne)?;
        assert_eq!(solver.choose_move(&board, 4), Err(EngineError::NodeBudgetExceeded(11)));

        let config = EngineConfig::default().with_limits(SearchLimits {
            max_nodes: None,
            time_limit: Some(Duration::from_secs(0)),
        });
        let mut solver = Solver::new(config, Side::PlayerOne)?;
        assert!(matches!(
            solver.choose_move(&board, 4),
            Err(EngineError::DeadlineExceeded(_))
        ));

        // generous limits leave the result untouched
        let config = EngineConfig::default().with_limits(SearchLimits {
            max_nodes: Some(1_000_000),
            time_limit: Some(Duration::from_secs(60)),
        });
        let mut limited = Solver::new(config, Side::PlayerOne)?;
        let mut unlimited = Solver::new(EngineConfig::default(), Side::PlayerOne)?;
        assert_eq!(limited.choose_move(&board, 3)?, unlimited.choose_move(&board, 3)?);
        Ok(())
    }

    #[test]
    pub fn smaller_boards() -> Result<()> {
        let config = EngineConfig::with_dimensions(4, 4);
        let board = board_from(&["....", "....", "Y...", "YRR."])?;
        let mut solver = Solver::new(config, Side::PlayerOne)?;

        assert_eq!(solver.evaluator().window_count(), 10);
        let result = solver.choose_move(&board, 2)?;
        assert!(result.column.is_some());
        assert!(board.is_column_playable(result.column.unwrap()));
        Ok(())
    }

    #[test]
    pub fn self_play_match() -> Result<()> {
        let config = BenchmarkConfig {
            games: 2,
            player_one_depth: 1,
            player_two_depth: 2,
            ..BenchmarkConfig::default()
        };

        let record = benchmark::play_match(&config, 1)?;
        assert!(record.moves >= 7 && record.moves <= 42);
        if record.moves < 42 {
            assert!(record.winner.is_some());
        }

        // engines are deterministic, so with no random opening every game is identical
        let report = benchmark::run(&config, false)?;
        assert_eq!(report.games, 2);
        assert_eq!(report.total_moves, 2 * record.moves);
        assert_eq!(
            report.player_one_wins + report.player_two_wins + report.draws,
            2
        );
        Ok(())
    }

    #[test]
    pub fn failed_game_stops_the_benchmark() -> Result<()> {
        let config = BenchmarkConfig {
            games: 50,
            player_one_depth: 4,
            player_two_depth: 4,
            engine: EngineConfig::default().with_limits(SearchLimits {
                max_nodes: Some(10),
                time_limit: None,
            }),
            ..BenchmarkConfig::default()
        };

        let err = benchmark::run(&config, false).unwrap_err();
        assert_eq!(
            err.downcast_ref::<EngineError>(),
            Some(&EngineError::NodeBudgetExceeded(11))
        );
        Ok(())
    }

    #[test]
    pub fn random_openings_are_reproducible() -> Result<()> {
        let config = BenchmarkConfig {
            games: 3,
            player_one_depth: 2,
            player_two_depth: 2,
            random_opening_moves: 4,
            seed: 11,
            ..BenchmarkConfig::default()
        };
        for game in 1..=3 {
            assert_eq!(
                benchmark::play_match(&config, game)?,
                benchmark::play_match(&config, game)?
            );
        }
        Ok(())
    }

    #[test]
    pub fn benchmark_report_tally() {
        let mut report = BenchmarkReport::default();
        assert_eq!(report.average_moves(), 0.0);

        for (game, winner, moves) in [
            (1, Some(Side::PlayerTwo), 10),
            (2, Some(Side::PlayerTwo), 20),
            (3, None, 42),
            (4, Some(Side::PlayerOne), 8),
        ]
        .iter()
        {
            report.record(&GameRecord {
                game: *game,
                winner: *winner,
                moves: *moves,
            });
        }

        assert_eq!(report.games, 4);
        assert_eq!(report.draws, 1);
        assert_eq!(report.win_rate(Side::PlayerTwo), 50.0);
        assert_eq!(report.win_rate(Side::PlayerOne), 25.0);
        assert_eq!(report.average_moves(), 20.0);
    }
}
