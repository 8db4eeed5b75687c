// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point for playing and evaluating episodes
// ═══════════════════════════════════════════════════════════════════════

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tactics_agents::AGENT_NAMES;
use tactics_engine::{render_text, Config};
use tactics_tournament::{make_agents, run_episodes, Database, Environment};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tactics-runner", about = "Reinforce Tactics Lab")]
struct Cli {
    /// JSON configuration file; missing keys take their defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single episode and print the board after every step
    Play {
        #[arg(short, long)]
        seed: Option<u64>,
        /// Agent for the first seat
        #[arg(long, default_value = "random")]
        p1: String,
        /// Agent for the second seat
        #[arg(long, default_value = "aggressive")]
        p2: String,
        /// Colour the board with ANSI escapes
        #[arg(long)]
        ansi: bool,
        /// Only print the final position
        #[arg(short, long)]
        quiet: bool,
    },
    /// Evaluate two agents over N episodes in parallel
    Evaluate {
        #[arg(short, long, default_value_t = 100)]
        episodes: usize,
        #[arg(long, default_value = "random")]
        p1: String,
        #[arg(long, default_value = "aggressive")]
        p2: String,
        /// Store results and ratings in this SQLite file
        #[arg(short, long)]
        db: Option<PathBuf>,
        /// Print every episode result as a JSON line
        #[arg(long)]
        json: bool,
    },
    /// Show leaderboard from database
    Leaderboard {
        #[arg(short, long, default_value = "results.db")]
        db: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Play { seed, p1, p2, ansi, quiet } => cmd_play(config, seed, [p1.as_str(), p2.as_str()], ansi, quiet),
        Commands::Evaluate { episodes, p1, p2, db, json } => {
            cmd_evaluate(&config, episodes, [p1.as_str(), p2.as_str()], db.as_deref(), json)
        }
        Commands::Leaderboard { db } => cmd_leaderboard(&db),
    }
}

fn cmd_play(mut config: Config, seed: Option<u64>, names: [&str; 2], ansi: bool, quiet: bool) -> Result<()> {
    if let Some(seed) = seed {
        config.map_seed = seed;
    }
    println!("=== Reinforce Tactics Lab ===\n");
    println!("Single episode: seed={}, P1={}, P2={}\n", config.map_seed, names[0], names[1]);

    let mut agents = make_agents(names, config.map_seed)
        .with_context(|| format!("known agents: {}", AGENT_NAMES.join(", ")))?;
    let mut env = Environment::new(config)?;
    env.run_with(&mut agents, |state| {
        if !quiet {
            println!("{}", render_text(state, ansi));
        }
    })?;
    if quiet {
        print!("{}", env.render(ansi));
    }

    let state = env.state();
    println!();
    println!("Episode finished after {} steps ({} rounds)", state.step_count(), state.turn_number());
    match state.outcome().and_then(|o| o.winner()) {
        Some(winner) => println!("  Winner: {} ({})", winner, names[winner.index()]),
        None => println!("  Draw"),
    }
    Ok(())
}

fn cmd_evaluate(config: &Config, episodes: usize, names: [&str; 2], db_path: Option<&Path>, json: bool) -> Result<()> {
    println!("=== Evaluate: {} episodes, {} vs {} ===\n", episodes, names[0], names[1]);

    let started = std::time::Instant::now();
    let results = run_episodes(config, names, episodes)?;
    tracing::info!(
        target: "tactics::runner",
        event = "evaluate.finished",
        episodes = results.len(),
        millis = started.elapsed().as_millis() as u64,
    );
    if json {
        for r in &results {
            println!("{}", serde_json::to_string(r)?);
        }
    }

    let mut tally = [0u32; 3];
    for r in &results {
        match r.winner() {
            Some(p) => tally[p.index()] += 1,
            None => tally[2] += 1,
        }
    }
    let pct = |n: u32| if episodes > 0 { n as f64 / episodes as f64 * 100.0 } else { 0.0 };
    println!("--- Summary ({} episodes) ---", results.len());
    println!("  P1 {:12}: {:>4} wins ({:.1}%)", names[0], tally[0], pct(tally[0]));
    println!("  P2 {:12}: {:>4} wins ({:.1}%)", names[1], tally[1], pct(tally[1]));
    println!("  {:15}: {:>4}      ({:.1}%)", "draws", tally[2], pct(tally[2]));

    if let Some(path) = db_path {
        let db = Database::open(path).with_context(|| format!("opening {}", path.display()))?;
        for r in &results {
            db.store_episode(r)?;
        }
        println!("\nResults saved to: {}", path.display());
        println!("Total episodes in DB: {}", db.episode_count()?);
    }
    Ok(())
}

fn cmd_leaderboard(db_path: &Path) -> Result<()> {
    let db = Database::open(db_path).with_context(|| format!("opening {}", db_path.display()))?;
    let board = db.leaderboard()?;
    if board.is_empty() {
        println!("No agents found. Run some evaluations first.");
        return Ok(());
    }
    println!("=== Leaderboard ===\n");
    println!("{:<20} {:>8} {:>8} {:>8} {:>8}", "Agent", "ELO", "Played", "Wins", "Draws");
    println!("{}", "-".repeat(56));
    for row in &board {
        println!("{:<20} {:>8.1} {:>8} {:>8} {:>8}", row.name, row.elo, row.episodes, row.wins, row.draws);
    }
    Ok(())
}
