use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use playlist_drop as lib;
use lib::api::mock::MockCatalog;
use lib::config::Config;
use lib::service::PlaylistService;
use lib::token::StaticTokenProvider;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::subscriber as tracing_subscriber_global;
use tracing_log::LogTracer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "playlist-drop", version)]
struct Cli {
    /// Path to config TOML. Without it, settings come from the environment (and `.env`).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Use the in-memory catalog instead of Spotify (no credentials needed)
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web UI and API server (long-running)
    Serve,
    /// Search the catalog once and print the hits
    Search {
        query: String,
    },
    /// Add one track URI to the playlist unless it is already there
    Add {
        uri: String,
    },
    /// Validate configuration and exit
    ConfigValidate,
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => {
            // a missing .env is fine
            let _ = dotenvy::dotenv();
            Config::from_env().context("loading config from environment")
        }
    }
}

/// stdout always; a daily-rotated file too when `log_dir` is configured.
fn init_logging(cfg: &Config) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let _ = LogTracer::init();

    // Honor RUST_LOG if set, otherwise default to info.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match &cfg.log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "playlist-drop.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (Some(fmt::layer().with_writer(non_blocking).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer);

    tracing_subscriber_global::set_global_default(subscriber)
        .context("installing global tracing subscriber")?;
    Ok(guard)
}

fn build_service(cfg: &Config, mock: bool) -> PlaylistService {
    if mock {
        tracing::info!("using in-memory mock catalog");
        PlaylistService::with_parts(
            cfg,
            Arc::new(StaticTokenProvider::new("mock-token")),
            Arc::new(MockCatalog::with_demo_tracks()),
        )
    } else {
        PlaylistService::from_config(cfg)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(&cli)?;
    let _guard = init_logging(&cfg)?;

    match &cli.command {
        Commands::Serve => {
            let missing = cfg.missing_required();
            if !cli.mock && !missing.is_empty() {
                tracing::warn!("missing settings: {}; remote calls will fail", missing.join(", "));
            }
            let service = Arc::new(build_service(&cfg, cli.mock));
            lib::server::serve(&cfg, service).await?;
        }
        Commands::Search { query } => {
            let service = build_service(&cfg, cli.mock);
            let tracks = service.search(query).await?;
            if tracks.is_empty() {
                println!("No tracks found.");
            }
            for t in tracks {
                println!("{} - {} [{}]", t.artists.join(", "), t.name, t.uri);
            }
        }
        Commands::Add { uri } => {
            let service = build_service(&cfg, cli.mock);
            let data = service.add_track(uri).await?;
            println!("Added {}: {}", uri, data);
        }
        Commands::ConfigValidate => {
            let missing = cfg.missing_required();
            if missing.is_empty() {
                println!("OK");
            } else {
                eprintln!("Config validation failed: missing {}", missing.join(", "));
                std::process::exit(2);
            }
        }
    }
    Ok(())
}
