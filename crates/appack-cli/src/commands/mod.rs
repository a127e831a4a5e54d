//! CLI command definitions and dispatch.

pub mod init;
pub mod inspect;
pub mod merge;
pub mod render;
pub mod split;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use appack_common::types::Encoding;
use appack_package::{PackageLocation, Replace, locate, transform};

/// appack — Package multi-service applications.
#[derive(Parser, Debug)]
#[command(name = "appack", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new application package from a compose file.
    Init(init::InitArgs),
    /// Render the compose file with resolved parameters.
    Render(render::RenderArgs),
    /// Convert a package to the multi-file encoding.
    Split(split::SplitArgs),
    /// Convert a package to the single-file encoding.
    Merge(merge::MergeArgs),
    /// Show metadata, services, parameters, and attachments.
    Inspect(inspect::InspectArgs),
    /// Check metadata, parameters, and the rendered compose file.
    Validate(validate::ValidateArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init(args) => init::execute(args),
        Command::Render(args) => render::execute(args),
        Command::Split(args) => split::execute(args),
        Command::Merge(args) => merge::execute(args),
        Command::Inspect(args) => inspect::execute(args),
        Command::Validate(args) => validate::execute(args),
    }
}

/// Returns the process working directory.
fn current_dir() -> anyhow::Result<PathBuf> {
    std::env::current_dir().context("cannot determine the working directory")
}

/// Locates the package named on the command line, or the one in the
/// working directory.
fn locate_app(app: Option<&str>) -> anyhow::Result<PackageLocation> {
    let cwd = current_dir()?;
    Ok(locate(app, &cwd)?)
}

/// Shared body of `split` and `merge`.
fn convert(
    app: Option<&str>,
    output: Option<&Path>,
    overwrite: bool,
    target: Encoding,
) -> anyhow::Result<()> {
    let location = locate_app(app)?;
    let written = transform(&location, output, Replace::from_flag(overwrite), target)?;
    println!("Wrote {target} package {}", written.display());
    Ok(())
}
