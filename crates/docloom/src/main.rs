//! docloom CLI - Documentation generator.
//!
//! Reads a YAML page configuration and writes reStructuredText documents
//! for Sphinx:
//!
//! ```text
//! docloom docs.yaml -o docs
//! docloom docs.yaml --dry-run --strict
//! ```

mod commands;
mod error;
mod output;
mod writer;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::GenerateArgs;
use output::Output;

/// docloom - Generate Sphinx documentation from YAML page definitions.
#[derive(Parser)]
#[command(name = "docloom", version, about)]
struct Cli {
    #[command(flatten)]
    args: GenerateArgs,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli.args.execute() {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
