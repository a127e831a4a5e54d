//! `appack split` — Convert a package to the multi-file encoding.

use std::path::PathBuf;

use clap::Args;

use appack_common::types::Encoding;

/// Arguments for the `split` command.
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Package name or path (defaults to the one in the working directory).
    pub app: Option<String>,

    /// Destination directory; converts in place when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Replace the destination if it already exists.
    #[arg(long)]
    pub overwrite: bool,
}

/// Executes the `split` command.
///
/// # Errors
///
/// Returns an error if the package cannot be loaded or the destination
/// exists without `--overwrite`.
pub fn execute(args: SplitArgs) -> anyhow::Result<()> {
    super::convert(
        args.app.as_deref(),
        args.output.as_deref(),
        args.overwrite,
        Encoding::MultiFile,
    )
}
