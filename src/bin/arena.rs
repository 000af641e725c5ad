//! Arena CLI: run bot-vs-bot experiments from the command line.
//!
//! Usage:
//!   cargo run --release --bin arena -- --games 200 --bots heuristic,random
//!   cargo run --release --bin arena -- --games 50 --players 4 --max-draw-length 2

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use diamond_game_engine::engine::arena::run_arena;
use diamond_game_engine::engine::bot_strategy::BotStrategy;
use diamond_game_engine::engine::models::SettingValue;
use diamond_game_engine::engine::plugin::GamePlugin;
use diamond_game_engine::engine::settings::{load_default_settings, load_settings};
use diamond_game_engine::games::diamond::ai::strategy_by_name;
use diamond_game_engine::games::diamond::plugin::DiamondPlugin;

#[derive(Parser)]
#[command(name = "arena", about = "Run bot-vs-bot arena experiments for Diamond Triangles")]
struct Cli {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    games: usize,

    /// Random seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Seats at the table (2-4)
    #[arg(long, default_value = "2")]
    players: usize,

    /// Maximum unit edges per move (overrides the settings file)
    #[arg(long)]
    max_draw_length: Option<String>,

    /// Comma-separated strategies: "heuristic", "random"
    #[arg(long, default_value = "heuristic,random", value_delimiter = ',')]
    bots: Vec<String>,

    /// Keep every strategy in the same seat for the whole run
    #[arg(long)]
    no_alternate_seats: bool,

    /// Path to diamond.toml
    #[arg(long)]
    settings: Option<PathBuf>,
}

/// Unique arena name for each requested bot: repeats get a numeric suffix.
fn bot_names(requested: &[String]) -> Vec<(String, String)> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    requested
        .iter()
        .map(|kind| {
            let count = seen.entry(kind.as_str()).or_insert(0);
            *count += 1;
            let name = if *count == 1 {
                kind.clone()
            } else {
                format!("{}_{}", kind, count)
            };
            (name, kind.clone())
        })
        .collect()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => load_settings(path).unwrap_or_else(|e| {
            eprintln!("Error loading settings: {}", e);
            std::process::exit(1);
        }),
        None => load_default_settings(),
    };
    let mut config = settings.game.clone();
    if let Some(raw) = &cli.max_draw_length {
        config.max_draw_length = SettingValue::from_raw(raw);
    }

    let plugin = DiamondPlugin;
    let (min, max) = (plugin.min_players() as usize, plugin.max_players() as usize);
    if !(min..=max).contains(&cli.players) {
        eprintln!("Error: --players must be between {} and {}", min, max);
        std::process::exit(1);
    }

    let mut strategies: HashMap<String, Box<dyn BotStrategy<DiamondPlugin>>> = HashMap::new();
    for (name, kind) in bot_names(&cli.bots) {
        let Some(strategy) = strategy_by_name(&kind) else {
            eprintln!("Error: unknown bot '{}' (expected heuristic or random)", kind);
            std::process::exit(1);
        };
        strategies.insert(name, strategy);
    }
    if strategies.is_empty() {
        eprintln!("Error: no bots given");
        std::process::exit(1);
    }

    let alternate_seats = !cli.no_alternate_seats;
    eprintln!(
        "{} arena: {} games, {} seats, seed={}, alternate_seats={}, max_draw_length={}",
        plugin.display_name(),
        cli.games,
        cli.players,
        cli.seed,
        alternate_seats,
        config.max_draw_length
    );
    let mut names: Vec<&String> = strategies.keys().collect();
    names.sort();
    eprintln!("  bots: {:?}", names);
    eprintln!();

    let total = cli.games;
    let progress_cb = move |done: usize, _total: usize| {
        eprint!("\r  [{}/{}] games completed", done, total);
    };

    let result = run_arena(
        &plugin,
        &strategies,
        cli.games,
        cli.seed,
        cli.players,
        &config,
        alternate_seats,
        Some(&progress_cb),
    );

    eprintln!("\r                                    "); // clear progress line
    println!("{}", result.summary());
}
