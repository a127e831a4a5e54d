//! `appack merge` — Convert a package to the single-file encoding.

use std::path::PathBuf;

use clap::Args;

use appack_common::types::Encoding;

/// Arguments for the `merge` command.
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Package name or path (defaults to the one in the working directory).
    pub app: Option<String>,

    /// Destination file; converts in place when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Replace the destination if it already exists.
    #[arg(long)]
    pub overwrite: bool,
}

/// Executes the `merge` command.
///
/// # Errors
///
/// Returns an error if the package cannot be loaded or the destination
/// exists without `--overwrite`.
pub fn execute(args: MergeArgs) -> anyhow::Result<()> {
    super::convert(
        args.app.as_deref(),
        args.output.as_deref(),
        args.overwrite,
        Encoding::SingleFile,
    )
}
