#![deny(missing_docs)]

//! # Split Command
//!
//! Writes one self-contained OpenAPI document per path.

use crate::common::{read_document, write_file};
use crate::error::{CliError, CliResult};
use oas2zod_core::{path_file_stem, split_document};
use std::path::PathBuf;
use tracing::info;

/// Arguments for the split command.
#[derive(clap::Args, Debug, Clone)]
pub struct SplitArgs {
    /// OpenAPI document (YAML or JSON).
    pub input: PathBuf,

    /// Directory receiving `<path>.json` files.
    pub output_dir: PathBuf,
}

/// Executes the split.
pub fn execute(args: &SplitArgs) -> CliResult<()> {
    let document = read_document(&args.input)?;
    let documents = split_document(&document)?;

    for (path, sub) in &documents {
        let json = serde_json::to_string_pretty(sub)
            .map_err(|e| CliError::General(format!("Failed to serialize {}: {}", path, e)))?;
        let target = args
            .output_dir
            .join(format!("{}.json", path_file_stem(path)));
        write_file(&target, &json)?;
    }

    info!(paths = documents.len(), "Split document");
    println!(
        "Split {} paths into {}",
        documents.len(),
        args.output_dir.display()
    );
    Ok(())
}
