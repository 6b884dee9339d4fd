//! Main application entry point for PicSeek.

use clap::Parser;
use std::path::PathBuf;
use tracing_appender::rolling;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

mod config;

#[derive(Parser)]
#[command(
    name = "picseek",
    author,
    version,
    about = "PicSeek image similarity search client"
)]
struct Cli {
    /// Backend server base URL
    #[arg(long)]
    server_url: Option<String>,
    /// Override log level (e.g. info, debug)
    #[arg(long)]
    log_level: Option<String>,
    /// Override number of thumbnails to preload
    #[arg(long)]
    thumbnails_preload: Option<usize>,
    /// Override the concurrent image fetch limit
    #[arg(long)]
    fetch_concurrency: Option<usize>,
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = config::AppConfigOverrides {
        server_url: cli.server_url.clone(),
        log_level: cli.log_level.clone(),
        thumbnails_preload: cli.thumbnails_preload,
        fetch_concurrency: cli.fetch_concurrency,
    };
    let cfg = config::AppConfig::load_from(cli.config.clone()).apply_overrides(&overrides);

    std::fs::create_dir_all(&cfg.data_path)?;
    let file_appender = rolling::daily(&cfg.data_path, "picseek.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cfg.log_level.clone()))
        .with_writer(std::io::stdout.and(file_writer))
        .init();

    tracing::info!("starting PicSeek against {}", cfg.server_url);

    ui::run(
        cfg.server_url.clone(),
        cfg.thumbnails_preload,
        cfg.fetch_concurrency,
    )?;

    Ok(())
}
