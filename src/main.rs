mod commands;
mod gateway;

use clap::{Parser, Subcommand};
use foresight_channels::telegram::TelegramChannel;
use foresight_core::config::{self, shellexpand, Config, ForesightConfig};
use foresight_store::{
    ForesightPool, ForesightService, JsonFileAdapter, MemoryAdapter, SnapshotAdapter,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "foresight",
    version,
    about = "Foresight — one stable daily prediction per user"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot.
    Start,
    /// Show pool, state file, and channel configuration.
    Status,
    /// Print today's foresight for a user.
    ///
    /// Without `--dry-run` this writes the live state file; do not run it
    /// while the bot is up, or the bot's next save overwrites the result.
    Draw {
        /// Platform user ID.
        #[arg(allow_negative_numbers = true)]
        user_id: i64,
        /// Work on an in-memory copy of the state; nothing is written.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;
    let _log_guard = init_logging(&cfg.foresight)?;
    if cfg.loaded_from.is_none() {
        warn!("Config file not found at {}, using defaults", cli.config);
    }

    match cli.command {
        Commands::Start => start(cfg).await?,
        Commands::Status => status(&cli.config, &cfg),
        Commands::Draw { user_id, dry_run } => {
            let service = if dry_run {
                let saved = JsonFileAdapter::new(&cfg.storage.state_path).load()?;
                open_service(
                    &cfg,
                    Box::new(MemoryAdapter::with_snapshot(saved.unwrap_or_default())),
                )?
            } else {
                open_service(&cfg, Box::new(JsonFileAdapter::new(&cfg.storage.state_path)))?
            };
            println!("{}", service.get_foresight(user_id, &chrono::Local::now())?);
        }
    }

    Ok(())
}

/// Console logging, plus a daily-rolling file under `{data_dir}/logs` when enabled.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(cfg: &ForesightConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    let (file_layer, guard) = if cfg.log_file {
        let dir = PathBuf::from(shellexpand(&cfg.data_dir)).join("logs");
        std::fs::create_dir_all(&dir)?;
        let appender = tracing_appender::rolling::daily(dir, "foresight.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (
            Some(fmt::layer().with_writer(writer).with_ansi(false)),
            Some(guard),
        )
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Load the pool and open the assignment store behind `adapter`.
fn open_service(
    cfg: &Config,
    adapter: Box<dyn SnapshotAdapter>,
) -> anyhow::Result<ForesightService> {
    let pool = ForesightPool::load(shellexpand(&cfg.pool.path))?;
    Ok(ForesightService::open(
        pool,
        adapter,
        cfg.storage.durability,
    )?)
}

/// Run the bot until Ctrl-C.
async fn start(cfg: Config) -> anyhow::Result<()> {
    let service = open_service(&cfg, Box::new(JsonFileAdapter::new(&cfg.storage.state_path)))?;

    let mut channels: HashMap<String, Arc<dyn foresight_core::traits::Channel>> =
        HashMap::new();

    if let Some(ref tg) = cfg.channel.telegram {
        if tg.enabled {
            if tg.bot_token.is_empty() {
                anyhow::bail!(
                    "Telegram is enabled but bot_token is empty. \
                     Set it in config.toml or {} env var.",
                    config::TOKEN_ENV
                );
            }
            let channel = TelegramChannel::new(tg.clone());
            channels.insert("telegram".to_string(), Arc::new(channel));
        }
    }

    if channels.is_empty() {
        anyhow::bail!("No channels enabled. Enable at least one channel in config.toml.");
    }

    println!("{} — Starting bot...", cfg.foresight.name);
    let gw = Arc::new(gateway::Gateway::new(
        Arc::new(service),
        channels,
        cfg.reply.clone(),
    ));
    gw.run().await
}

/// Print a status report without touching the state file.
fn status(config_path: &str, cfg: &Config) {
    println!("{} — Status Check\n", cfg.foresight.name);
    println!("Config: {config_path}");

    let pool_path = shellexpand(&cfg.pool.path);
    match ForesightPool::load(&pool_path) {
        Ok(pool) => println!("Foresights: {} ({pool_path})", pool.len()),
        Err(e) => println!("Foresights: unusable ({e})"),
    }

    let adapter = JsonFileAdapter::new(&cfg.storage.state_path);
    println!(
        "State: {} [{}]",
        adapter.describe(),
        cfg.storage.durability.display_name()
    );
    match adapter.load() {
        Ok(Some(snapshot)) => {
            let day = foresight_store::DayKey::from(snapshot.last_day);
            println!("  last reset: {day}");
            println!("  users assigned: {}", snapshot.user_mapping.len());
        }
        Ok(None) => println!("  not created yet"),
        Err(e) => println!("  unreadable ({e})"),
    }
    println!();

    if let Some(ref tg) = cfg.channel.telegram {
        println!(
            "  telegram: {}",
            if tg.enabled && !tg.bot_token.is_empty() {
                "configured"
            } else if tg.enabled {
                "enabled but missing bot_token"
            } else {
                "disabled"
            }
        );
    } else {
        println!("  telegram: not configured");
    }
}
