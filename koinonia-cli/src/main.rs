use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod perf;

use perf::run_perf_command;

#[derive(Parser, Debug)]
#[command(name = "koinonia", version)]
#[command(about = "Koinonia Connect performance tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Performance baseline and regression detection tools
    Perf {
        #[command(subcommand)]
        perf_command: PerfCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum PerfCommands {
    /// Create a baseline from a metrics file
    Baseline {
        /// JSON file with an array of {name, duration} samples
        #[arg(long)]
        input: PathBuf,
        /// Baseline name
        #[arg(long)]
        name: String,
        /// Baseline version
        #[arg(long)]
        version: Option<String>,
        /// Baseline storage directory
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Check a metrics file against the latest baseline (exits 1 on failure)
    Check {
        /// JSON file with an array of {name, duration} samples
        #[arg(long)]
        input: PathBuf,
        /// Baseline name to compare against
        #[arg(long)]
        name: String,
        /// Baseline storage directory
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// List all stored baseline files
    List {
        /// Baseline storage directory
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Print the latest baseline for a name as JSON
    Show {
        /// Baseline name
        name: String,
        /// Baseline storage directory
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() {
    // Initialize JSON logging once.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let env_filter = match "info".parse() {
        Ok(directive) => env_filter.add_directive(directive),
        Err(_) => env_filter, // fallback to default if parsing fails
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Perf { perf_command } => {
            if let Err(e) = run_perf_command(perf_command) {
                tracing::error!(error = %e, "Performance command failed");
                std::process::exit(1);
            }
        }
    }
}
