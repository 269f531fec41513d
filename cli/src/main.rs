#![deny(missing_docs)]

//! # oas2zod CLI
//!
//! Command Line Interface for the OpenAPI to Zod compiler.
//!
//! Supported Commands:
//! - `compile`: Whole document -> one Zod module.
//! - `split`: Document -> one OpenAPI document per path.
//! - `generate`: Document -> one Zod module per path.
//! - `prune`: Dead-code elimination of an existing module.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

mod common;
mod compile;
mod error;
mod generate;
mod prune;
mod split;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI 3.0 to Zod compiler")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a whole OpenAPI document into one Zod module.
    Compile(compile::CompileArgs),
    /// Split an OpenAPI document into one document per path.
    Split(split::SplitArgs),
    /// Split a document and compile one Zod module per path.
    Generate(generate::GenerateArgs),
    /// Remove unreferenced bindings from a JavaScript or TypeScript module.
    Prune(prune::PruneArgs),
}

fn run(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Compile(args) => compile::execute(args),
        Commands::Split(args) => split::execute(args),
        Commands::Generate(args) => generate::execute(args),
        Commands::Prune(args) => prune::execute(args),
    }
}

fn main() {
    // Logs go to stderr so generated output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
