#![deny(missing_docs)]

//! # Prune Command
//!
//! Removes unreferenced top-level bindings from an existing module.

use crate::common::write_file;
use crate::error::CliResult;
use oas2zod_core::eliminate;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Arguments for the prune command.
#[derive(clap::Args, Debug, Clone)]
pub struct PruneArgs {
    /// JavaScript or TypeScript module to clean up.
    pub input: PathBuf,

    /// Output file; may be the input itself.
    pub output: PathBuf,
}

/// Executes dead-code elimination.
pub fn execute(args: &PruneArgs) -> CliResult<()> {
    let source = fs::read_to_string(&args.input)?;
    let pruned = eliminate(&source)?;
    write_file(&args.output, &pruned)?;

    info!(
        removed_bytes = source.len().saturating_sub(pruned.len()),
        "Pruned module"
    );
    println!("Pruned module written to {}", args.output.display());
    Ok(())
}
