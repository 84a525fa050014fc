use anyhow::{Context, Result};
use clap::Parser;
use cv_analyzer::cli::{handle_command, Cli};
use cv_analyzer::AnalyzerConfig;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AnalyzerConfig::load()?;
    init_logging(&config)?;
    info!("Loaded configuration for environment: {}", config.environment);

    handle_command(cli, config).await
}

/// JSON lines to the configured log file, or plain text on stderr
fn init_logging(config: &AnalyzerConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(Mutex::new(file))
                    .with_current_span(false)
                    .with_span_list(false),
            )
        }
        None => None,
    };

    let stderr_layer = if file_layer.is_none() {
        Some(fmt::layer().with_writer(std::io::stderr))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}
