//! `appack inspect` — Show a summary of a package.

use clap::Args;

use appack_package::inspect::inspect;
use appack_package::load;
use appack_params::Environment;

use crate::output::format_report;

/// Arguments for the `inspect` command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Package name or path (defaults to the one in the working directory).
    pub app: Option<String>,
}

/// Executes the `inspect` command.
///
/// Renders the compose file with the package defaults and prints
/// metadata, services in start order, parameters, and attachments.
///
/// # Errors
///
/// Returns an error if the package cannot be found or loaded, or its
/// compose file is malformed.
pub fn execute(args: InspectArgs) -> anyhow::Result<()> {
    let location = super::locate_app(args.app.as_deref())?;
    let package = load(&location.path, location.encoding)?;
    let report = inspect(&package, &Environment::capture())?;

    print!("{}", format_report(&report));
    Ok(())
}
