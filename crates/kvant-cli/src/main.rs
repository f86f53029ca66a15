//! Kvant Command-Line Interface
//!
//! Loads a circuit description (JSON or YAML), samples it on the local
//! statevector simulator, and prints or exports the outcome histogram.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::EngineArgs;
use commands::{run, statevector, version};

/// Kvant - statevector simulation of small quantum circuits
#[derive(Parser)]
#[command(name = "kvant")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample a circuit and print the outcome histogram
    Run {
        /// Input file (JSON or YAML circuit description)
        #[arg(short, long)]
        input: String,

        /// Number of shots
        #[arg(short, long, default_value = "1024")]
        shots: u32,

        /// Base seed; the same seed reproduces the same histogram
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        engine: EngineArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Write the JSON result to this file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print the statevector before the first measurement
    Statevector {
        /// Input file (JSON or YAML circuit description)
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        engine: EngineArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Run {
            input,
            shots,
            seed,
            engine,
            format,
            output,
        } => run::execute(&input, shots, seed, &engine, format, output.as_deref()).await,

        Commands::Statevector {
            input,
            engine,
            format,
        } => statevector::execute(&input, &engine, format),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
