use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;
use tracing_subscriber::EnvFilter;

use diamond_game_engine::driver::{parse_command, run_session, Command, Update};
use diamond_game_engine::engine::models::SettingValue;
use diamond_game_engine::engine::plugin::GamePlugin;
use diamond_game_engine::engine::settings::{load_default_settings, load_settings};
use diamond_game_engine::games::diamond::ai::strategy_by_name;
use diamond_game_engine::games::diamond::plugin::DiamondPlugin;
use diamond_game_engine::games::diamond::session::GameSession;

#[derive(Parser)]
#[command(
    name = "diamond-game-engine",
    about = "Diamond Triangles engine: line commands on stdin, JSON updates on stdout"
)]
struct Cli {
    /// Number of players; 1 plays against the computer
    #[arg(long, env = "DIAMOND_PLAYERS")]
    players: Option<String>,

    /// Maximum unit edges per move
    #[arg(long, env = "DIAMOND_MAX_DRAW_LENGTH")]
    max_draw_length: Option<String>,

    /// Path to diamond.toml (default: auto-discover)
    #[arg(long, env = "DIAMOND_SETTINGS")]
    settings: Option<PathBuf>,

    /// Seed for the computer player
    #[arg(long)]
    seed: Option<u64>,

    /// Computer thinking time in milliseconds
    #[arg(long)]
    think_delay_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => load_settings(path).map_err(|e| format!("Failed to load settings: {}", e))?,
        None => load_default_settings(),
    };
    if let Some(raw) = &cli.players {
        settings.game.player_count = SettingValue::from_raw(raw);
    }
    if let Some(raw) = &cli.max_draw_length {
        settings.game.max_draw_length = SettingValue::from_raw(raw);
    }
    if let Some(ms) = cli.think_delay_ms {
        settings.bot.think_delay_ms = ms;
    }
    let mut config = settings.game.clone();
    config.random_seed = cli.seed.or(settings.bot.seed).or(config.random_seed);

    let strategy = strategy_by_name(&settings.bot.strategy)
        .ok_or_else(|| format!("Unknown bot strategy {:?}", settings.bot.strategy))?;
    let session = GameSession::with_strategy(config, strategy);

    tracing::info!(
        game = DiamondPlugin.display_name(),
        players = %settings.game.player_count,
        max_draw_length = %settings.game.max_draw_length,
        bot = %settings.bot.strategy,
        think_delay_ms = settings.bot.think_delay_ms,
        "starting session"
    );

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>(32);
    let (up_tx, mut up_rx) = mpsc::channel::<Update>(64);
    let parse_errors = up_tx.clone();

    let session_task = tokio::spawn(run_session(
        session,
        Duration::from_millis(settings.bot.think_delay_ms),
        cmd_rx,
        up_tx,
    ));

    let writer_task = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(update) = up_rx.recv().await {
            let mut line = serde_json::to_string(&update)?;
            line.push('\n');
            stdout.write_all(line.as_bytes()).await?;
            stdout.flush().await?;
        }
        Ok::<_, Box<dyn std::error::Error + Send + Sync>>(())
    });

    cmd_tx.send(Command::State).await?;

    let mut lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
    while let Some(line) = lines.next().await {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(command) => {
                let quit = command == Command::Quit;
                if cmd_tx.send(command).await.is_err() || quit {
                    break;
                }
            }
            Err(reason) => {
                tracing::warn!(%line, %reason, "unparseable command");
                if parse_errors.send(Update::Rejected { reason }).await.is_err() {
                    break;
                }
            }
        }
    }

    drop(cmd_tx);
    drop(parse_errors);
    session_task.await?;
    writer_task.await?.map_err(|e| e as Box<dyn std::error::Error>)?;
    Ok(())
}
