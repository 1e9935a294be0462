use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use sync::SyncConfig;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "sync")]
#[command(about = "Mirror configured source roots into a destination tree")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = SyncConfig::load(&cli.config).await.with_context(|| {
        format!(
            "Failed to load configuration from '{}'",
            cli.config.display()
        )
    })?;

    let _guard = init_tracing(&config)?;

    info!(
        "Synchronizing {} source root(s) into '{}'",
        config.sources.len(),
        config.destination.display()
    );

    if let Err(e) = sync::synchronize(config).await {
        error!("Synchronization failed: {e}");
        process::exit(1);
    }

    info!("Synchronization complete");
    Ok(())
}

/// Console output plus a daily-rotated log file.
///
/// The returned guard must live until exit so buffered lines are flushed.
fn init_tracing(config: &SyncConfig) -> Result<WorkerGuard> {
    let log_path = config.log_path();
    let log_dir = log_path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory '{}'", log_dir.display()))?;
    let file_name = log_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stdout.log".to_string());

    let file_appender = tracing_appender::rolling::daily(log_dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    Ok(guard)
}
