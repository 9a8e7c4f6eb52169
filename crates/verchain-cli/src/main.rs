use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// verchain: inspect and rewrite embedded-version frames.
///
/// A frame is a 2-byte little-endian schema version followed by the payload
/// encoded at that version.
#[derive(Parser)]
#[command(name = "verchain", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the version and payload size of a framed file.
    Inspect {
        /// Path to the framed file.
        file: String,

        /// Dump the first bytes of the payload as hex.
        #[arg(long)]
        hex: bool,

        /// Number of payload bytes to dump with --hex.
        #[arg(long, default_value = "64")]
        limit: usize,
    },

    /// Prepend a version header to a raw payload.
    Wrap {
        /// Raw payload file.
        input: String,

        /// Where to write the framed output.
        output: String,

        /// Schema version the payload is encoded at.
        #[arg(short, long)]
        version: u16,
    },

    /// Strip the version header from a framed file.
    Unwrap {
        /// Framed input file.
        input: String,

        /// Where to write the raw payload.
        output: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("verchain=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Commands::Inspect { file, hex, limit } => commands::inspect(&file, hex.then_some(limit)),
        Commands::Wrap {
            input,
            output,
            version,
        } => commands::wrap(&input, &output, version),
        Commands::Unwrap { input, output } => commands::unwrap(&input, &output),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
