//! `appack validate` — Check a package and its rendered compose file.

use std::path::PathBuf;

use clap::Args;

use appack_package::load;
use appack_package::render::{RenderOptions, parameter_sources};
use appack_package::validate::validate_package;
use appack_params::Environment;

/// Arguments for the `validate` command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Package name or path (defaults to the one in the working directory).
    pub app: Option<String>,

    /// Parameters file; may be repeated, later files win.
    #[arg(short = 'f', long = "parameters-files")]
    pub parameters_files: Vec<PathBuf>,

    /// Override a parameter as `key=value`; may be repeated.
    #[arg(short, long = "set")]
    pub sets: Vec<String>,
}

/// Executes the `validate` command.
///
/// Every problem found is logged; the command fails with the first one.
///
/// # Errors
///
/// Returns an error if the package cannot be loaded, a parameter source is
/// invalid, or validation finds a problem.
pub fn execute(args: ValidateArgs) -> anyhow::Result<()> {
    let location = super::locate_app(args.app.as_deref())?;
    let package = load(&location.path, location.encoding)?;

    let options = RenderOptions {
        parameter_files: args.parameters_files,
        sets: args.sets,
        ..RenderOptions::default()
    };
    let sources = parameter_sources(&package, &options)?;
    let report = validate_package(&package, &sources, &Environment::capture());

    for problem in report.problems() {
        tracing::error!(%problem, "validation problem");
    }
    report.into_result()?;

    println!("{} is valid", location.path.display());
    Ok(())
}
