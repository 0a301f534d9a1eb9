use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use std::io::{stdin, stdout, Write};

use connect4_minimax::{solver::ScoreKind, terminal::*, *};

/// Play Connect 4 in the terminal against the engine
#[derive(Parser)]
#[command(name = "connect4", about = "Play Connect 4 against a minimax engine")]
struct Cli {
    /// Search depth of AI controlled players
    #[arg(long, env = "CONNECT4_DEPTH", default_value_t = 4)]
    depth: u32,
}

/// Asks a yes/no question until a recognisable answer is given
fn ask(question: &str) -> Result<bool> {
    let stdin = stdin();
    loop {
        let mut buffer = String::new();
        print!("{} y/n: ", question);
        stdout().flush()?;
        stdin.read_line(&mut buffer)?;
        match buffer.to_lowercase().chars().next() {
            Some('y') => return Ok(true),
            Some('n') => return Ok(false),
            _ => println!("Unknown answer given"),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    if cli.depth == 0 {
        anyhow::bail!("search depth must be at least 1");
    }

    let config = EngineConfig::default();
    let mut board = ArrayBoard::new(&config);
    let stdin = stdin();

    println!("Welcome to Connect 4\n");

    let ai_players = (
        ask("Is player 1 AI controlled?")?,
        ask("Is player 2 AI controlled?")?,
    );
    let mut solvers = (
        Solver::new(config.clone(), Side::PlayerOne)?,
        Solver::new(config.clone(), Side::PlayerTwo)?,
    );
    let mut side = Side::PlayerOne;

    // game loop
    loop {
        board.display()?;

        match game_state(&board) {
            GameState::Playing => {
                let ai_controlled = match side {
                    Side::PlayerOne => ai_players.0,
                    Side::PlayerTwo => ai_players.1,
                };
                let next_move =
                    // AI player
                    if ai_controlled {
                        println!("AI is thinking...");
                        stdout().flush()?;

                        // slow down play if both players are AI
                        if ai_players == (true, true) {
                            std::thread::sleep(std::time::Duration::new(3, 0));
                        }

                        let solver = match side {
                            Side::PlayerOne => &mut solvers.0,
                            Side::PlayerTwo => &mut solvers.1,
                        };
                        let result = solver.choose_move(&board, cli.depth)?;

                        match solver.score_kind(result.score) {
                            ScoreKind::ForcedWin => {
                                println!("{} can force a win within {} moves.", side, cli.depth)
                            }
                            ScoreKind::ForcedLoss => println!(
                                "{} can force a win within {} moves.",
                                side.opponent(),
                                cli.depth
                            ),
                            ScoreKind::Heuristic => {
                                println!("Position score for {}: {}", side, result.score)
                            }
                        }

                        match result.column {
                            Some(column) => {
                                println!("Best move: {}", column + 1);
                                column + 1
                            }
                            None => break,
                        }

                    // human player
                    } else {
                        print!("Move input > ");
                        stdout().flush()?;
                        let mut input_str = String::new();
                        stdin.read_line(&mut input_str)?;

                        match input_str.trim().parse::<usize>() {
                            Ok(column) if column >= 1 => column,
                            _ => {
                                println!("Invalid number: {}", input_str.trim());
                                continue;
                            }
                        }
                    };

                if let Err(err) = board.play(next_move - 1, side) {
                    println!("Invalid move: {}", err);
                    // try the move again
                    continue;
                }
                side = side.opponent();
            }

            // end states
            GameState::PlayerOneWin => {
                println!("Player 1 wins!");
                break;
            }
            GameState::PlayerTwoWin => {
                println!("Player 2 wins!");
                break;
            }
            GameState::Draw => {
                println!("Draw!");
                break;
            }
        }
    }
    Ok(())
}
