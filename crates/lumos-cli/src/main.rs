//! Lumos CLI - Publish, monitor and sample lumos values
//!
//! Tools for exercising the lumos bus from the command line.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod commands;

/// Lumos - value types and event bus for visualization applications
#[derive(Parser)]
#[command(name = "lumos")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show progress events as they arrive
    Monitor {
        /// Publisher address
        #[arg(short, long, default_value = "127.0.0.1:7878")]
        address: String,

        /// Seconds without updates before an operation is dropped
        #[arg(long, default_value = "60")]
        max_age: u64,
    },

    /// Publish the events of a script
    Send {
        /// Script file; read from stdin when omitted
        script: Option<PathBuf>,

        /// Listen address
        #[arg(short, long, default_value = "127.0.0.1:7878")]
        address: String,

        /// Wait for this many subscribers before sending
        #[arg(short, long, default_value = "0")]
        wait_for: usize,
    },

    /// Print the lookup table of a color map file
    Sample {
        /// Color map file (JSON)
        input: PathBuf,

        /// Number of samples
        #[arg(short, long, default_value = "256")]
        count: usize,

        /// Lower bound of the sampled range
        #[arg(long, allow_negative_numbers = true)]
        min: Option<f32>,

        /// Upper bound of the sampled range
        #[arg(long, allow_negative_numbers = true)]
        max: Option<f32>,

        /// Output element type
        #[arg(short, long, value_enum, default_value = "float")]
        format: SampleFormat,

        /// Fall back to the default color map if the file cannot be loaded
        #[arg(long)]
        default_on_error: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SampleFormat {
    /// 32 bit floating point values
    Float,
    /// 8 bit unsigned integers
    U8,
}

fn log_filter(verbose: bool) -> EnvFilter {
    EnvFilter::new(if verbose { "debug" } else { "info" })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG overrides --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter(cli.verbose));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Monitor { address, max_age } => {
            let config = commands::monitor::MonitorConfig {
                address,
                max_age: Duration::from_secs(max_age),
            };
            commands::monitor::run(config).await?;
        }

        Commands::Send {
            script,
            address,
            wait_for,
        } => {
            commands::send::run(script.as_deref(), &address, wait_for).await?;
        }

        Commands::Sample {
            input,
            count,
            min,
            max,
            format,
            default_on_error,
        } => {
            let options = commands::sample::SampleOptions {
                count,
                min,
                max,
                format,
                default_on_error,
            };
            commands::sample::run(&input, &options)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(false).to_string(), "info");
        assert_eq!(log_filter(true).to_string(), "debug");
    }

    #[test]
    fn test_parse_sample() {
        let cli = Cli::parse_from(["lumos", "-v", "sample", "map.json", "--min", "-1", "-f", "u8"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Sample { min, format, .. } => {
                assert_eq!(min, Some(-1.0));
                assert_eq!(format, SampleFormat::U8);
            }
            _ => panic!("expected the sample command"),
        }
    }
}
