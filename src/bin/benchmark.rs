//! Plays the engine against itself at two depths and reports the tally

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use connect4_minimax::{
    arrayboard::Side,
    benchmark::{self, BenchmarkConfig},
};

/// Benchmark two search depths against each other
#[derive(Parser)]
#[command(name = "benchmark", about = "Play the engine against itself")]
struct Cli {
    /// Number of games to play
    #[arg(long, env = "CONNECT4_GAMES", default_value_t = 20)]
    games: usize,

    /// Search depth of player 1 (red, moves first)
    #[arg(long, env = "CONNECT4_PLAYER_ONE_DEPTH", default_value_t = 1)]
    player_one_depth: u32,

    /// Search depth of player 2 (yellow)
    #[arg(long, env = "CONNECT4_PLAYER_TWO_DEPTH", default_value_t = 4)]
    player_two_depth: u32,

    /// Random moves played at the start of every game
    #[arg(long, default_value_t = 0)]
    random_opening_moves: usize,

    /// Seed for the random opening moves
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("connect4_minimax=info")),
        )
        .init();

    let cli = Cli::parse();
    if cli.player_one_depth == 0 || cli.player_two_depth == 0 {
        bail!("search depths must be at least 1");
    }

    let config = BenchmarkConfig {
        games: cli.games,
        player_one_depth: cli.player_one_depth,
        player_two_depth: cli.player_two_depth,
        random_opening_moves: cli.random_opening_moves,
        seed: cli.seed,
        ..BenchmarkConfig::default()
    };

    println!("--- STARTING BENCHMARK: {} GAMES ---", config.games);
    println!("Player 1 (Red) Depth: {}", config.player_one_depth);
    println!("Player 2 (Yellow) Depth: {}", config.player_two_depth);
    println!("{}", "-".repeat(40));

    let report = benchmark::run(&config, !cli.quiet)?;

    println!("\n{}", "=".repeat(40));
    println!("FINAL RESULTS");
    println!("{}", "=".repeat(40));
    println!(
        "Player 1 (Depth {}) Wins: {} ({:.1}%)",
        config.player_one_depth,
        report.player_one_wins,
        report.win_rate(Side::PlayerOne)
    );
    println!(
        "Player 2 (Depth {}) Wins: {} ({:.1}%)",
        config.player_two_depth,
        report.player_two_wins,
        report.win_rate(Side::PlayerTwo)
    );
    println!("Draws: {}", report.draws);
    println!("Avg Moves per Game: {:.1}", report.average_moves());
    println!("{}", "=".repeat(40));
    Ok(())
}
