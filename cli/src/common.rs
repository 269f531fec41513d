#![deny(missing_docs)]

//! # Shared Command Helpers
//!
//! Output flags and file handling used by several commands.

use crate::error::CliResult;
use oas2zod_core::{parse_document, GenerateOptions};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Flags controlling how Zod modules are emitted.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Emit component schemas as `export const` bindings.
    #[clap(long, env = "OAS2ZOD_EXPORT_COMPONENTS")]
    pub export_components: bool,

    /// Keep unreferenced bindings in the generated module.
    #[clap(long, env = "OAS2ZOD_NO_PRUNE")]
    pub no_prune: bool,
}

impl From<&OutputArgs> for GenerateOptions {
    fn from(args: &OutputArgs) -> Self {
        GenerateOptions {
            export_components: args.export_components,
            prune: !args.no_prune,
        }
    }
}

/// Reads and parses an OpenAPI document (YAML or JSON).
pub fn read_document(path: &Path) -> CliResult<Value> {
    let content = fs::read_to_string(path)?;
    Ok(parse_document(&content)?)
}

/// Writes `content` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, content: &str) -> CliResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    debug!(path = %path.display(), bytes = content.len(), "Wrote file");
    Ok(())
}
