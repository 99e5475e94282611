//! PageHands - page affordances and form auto-fill
//!
//! Main entry point for the PageHands CLI.

mod cli;
mod cmd_demo;
mod cmd_page;

use std::path::Path;

use clap::Parser;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use pagehands_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};

use cli::{Cli, Commands};
use cmd_demo::handle_demo_command;
use cmd_page::handle_page_command;

/// Initialize tracing with console and optional file output.
///
/// Log files rotate daily under the configured directory, `~/.pagehands/logs`
/// by default.
fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let file_layer = if logging.file {
        let log_dir = logging.resolved_dir();
        std::fs::create_dir_all(&log_dir)?;
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("pagehands")
            .filename_suffix("log")
            .max_log_files(30)
            .build(&log_dir)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // Flushes on drop; must outlive every log call.
        static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
            std::sync::OnceLock::new();
        let _ = GUARD.set(guard);

        Some(fmt::layer().with_writer(non_blocking).with_ansi(false).boxed())
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(())
}

/// Load and validate the config file; returns the config and its warnings.
fn load_config(path: &Path) -> Result<(Config, Vec<String>), Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_or_default(path)?;
    let validation = ConfigValidator::validate(&config)?;
    if !validation.is_valid() {
        let errors: Vec<String> = validation
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect();
        return Err(format!("invalid configuration: {}", errors.join("; ")).into());
    }
    let warnings = validation
        .warnings
        .iter()
        .map(|w| format!("{}: {}", w.path, w.message))
        .collect();
    Ok((config, warnings))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let (config, warnings) = load_config(&cli.config)?;
    init_tracing(&config.logging)?;

    info!("PageHands v{}", env!("CARGO_PKG_VERSION"));
    for warning in warnings {
        warn!("{}", warning);
    }

    match cli.command {
        Commands::Demo {
            fixture,
            fill,
            highlight,
            resume,
            settings,
        } => handle_demo_command(config, fixture, fill, highlight, resume, settings).await,
        command => handle_page_command(command, &config),
    }
}
