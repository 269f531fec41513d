#![deny(missing_docs)]

//! # Generate Command
//!
//! Splits a document per path and writes one Zod module for each.

use crate::common::{read_document, write_file, OutputArgs};
use crate::error::CliResult;
use oas2zod_core::{path_file_stem, transform_paths, GenerateOptions};
use std::path::PathBuf;
use tracing::info;

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// OpenAPI document (YAML or JSON).
    pub input: PathBuf,

    /// Directory receiving `<path>.ts` modules.
    pub output_dir: PathBuf,

    #[clap(flatten)]
    pub output_args: OutputArgs,
}

/// Executes per-path generation.
pub fn execute(args: &GenerateArgs) -> CliResult<()> {
    let document = read_document(&args.input)?;
    let modules = transform_paths(&document, &GenerateOptions::from(&args.output_args))?;

    for (path, source) in &modules {
        let target = args
            .output_dir
            .join(format!("{}.ts", path_file_stem(path)));
        write_file(&target, source)?;
    }

    info!(modules = modules.len(), "Generated path modules");
    println!(
        "Generated {} modules in {}",
        modules.len(),
        args.output_dir.display()
    );
    Ok(())
}
