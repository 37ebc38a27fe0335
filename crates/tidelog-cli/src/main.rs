//! Tidelog CLI
//!
//! Thin wrapper around tidelog-core for command-line usage.
//!
//! ## Usage
//!
//! ```bash
//! # Validate the properties file and show the resolved configuration
//! tidelog check
//!
//! # Same, as JSON
//! tidelog --config resources/logger.properties check --json
//!
//! # Hammer the logger from 20 simulated components
//! tidelog stress --threads 20
//!
//! # Write a few lines and exit
//! tidelog log "service started" "listening on :8080"
//! ```

mod stress;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tidelog_core::{Logger, LoggerConfig, DEFAULT_PROPERTIES_PATH};
use tracing::debug;

use crate::stress::StressSettings;

/// Tidelog - buffered rotating file logger
#[derive(Parser)]
#[command(name = "tidelog")]
#[command(version = "0.1.0")]
#[command(about = "Tidelog - buffered rotating file logger")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Properties file with the logger settings
    #[arg(short, long, global = true, default_value = DEFAULT_PROPERTIES_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and print it
    Check {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the load generator against the configured logger
    Stress {
        /// Number of simulated components
        #[arg(short, long, default_value_t = 20)]
        threads: usize,
    },

    /// Log the given messages, one line each
    Log {
        /// Messages to write
        #[arg(required = true)]
        messages: Vec<String>,
    },
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, props) = LoggerConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    // The writer reports its per-line diagnostics at info level.
    let verbosity = if config.tracing() {
        cli.verbose.max(1)
    } else {
        cli.verbose
    };
    setup_logging(verbosity);
    debug!(
        path = %cli.config.display(),
        entries = props.len(),
        "configuration loaded"
    );

    match cli.command {
        Commands::Check { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Configuration: {}", cli.config.display());
                println!("  Queue capacity: {}", config.queue_capacity());
                println!(
                    "  Rotation interval: {}s",
                    config.rotation_interval().as_secs()
                );
                println!("  Output directory: {}", config.output_dir().display());
                println!("  Tracing: {}", config.tracing());
            }
        }

        Commands::Stress { threads } => {
            let settings = StressSettings::from_properties(&props)?;
            let logger = Logger::new(config)?;

            println!(
                "Starting {} components x {} messages",
                threads, settings.logs_per_thread
            );
            let report = stress::run(logger, threads, settings)?;

            println!("Threads: {}", report.threads);
            println!("Sent: {}", report.sent);
            println!("Written: {}", report.stats.lines_written);
            println!("Dropped: {}", report.stats.lines_dropped);
            println!("Rotations: {}", report.stats.rotations);
            println!("Elapsed: {:?}", report.elapsed);
        }

        Commands::Log { messages } => {
            let logger = Logger::new(config)?;
            logger.start()?;
            for message in &messages {
                logger.log(message);
            }
            logger.shutdown();

            let stats = logger.stats();
            println!("Written: {}", stats.lines_written);
        }
    }

    Ok(())
}
