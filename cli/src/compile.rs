#![deny(missing_docs)]

//! # Compile Command
//!
//! Compiles a whole OpenAPI document into a single Zod module.

use crate::common::{read_document, write_file, OutputArgs};
use crate::error::CliResult;
use oas2zod_core::{transform_document, GenerateOptions};
use std::path::PathBuf;
use tracing::info;

/// Arguments for the compile command.
#[derive(clap::Args, Debug, Clone)]
pub struct CompileArgs {
    /// OpenAPI document (YAML or JSON).
    pub input: PathBuf,

    /// Output TypeScript file.
    pub output: PathBuf,

    #[clap(flatten)]
    pub output_args: OutputArgs,
}

/// Executes the compilation.
pub fn execute(args: &CompileArgs) -> CliResult<()> {
    let document = read_document(&args.input)?;
    let options = GenerateOptions::from(&args.output_args);
    let source = transform_document(&document, &options)?;
    write_file(&args.output, &source)?;

    info!(input = %args.input.display(), ?options, "Compiled document");
    println!("Zod schemas written to {}", args.output.display());
    Ok(())
}
