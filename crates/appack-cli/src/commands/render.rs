//! `appack render` — Render the compose file with resolved parameters.

use std::io::Write as _;
use std::path::PathBuf;

use clap::Args;

use appack_common::config::AppConfig;
use appack_common::types::OutputFormat;
use appack_package::load;
use appack_package::render::{RenderOptions, render_package};
use appack_package::staging::{Replace, StagedWrite};
use appack_params::Environment;

/// Arguments for the `render` command.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Package name or path (defaults to the one in the working directory).
    pub app: Option<String>,

    /// Output format.
    #[arg(long, env = "APPACK_FORMATTER", default_value_t = AppConfig::default().default_format)]
    pub formatter: OutputFormat,

    /// Parameters file; may be repeated, later files win.
    #[arg(short = 'f', long = "parameters-files")]
    pub parameters_files: Vec<PathBuf>,

    /// Override a parameter as `key=value`; may be repeated.
    #[arg(short, long = "set")]
    pub sets: Vec<String>,

    /// Write the rendered document to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Executes the `render` command.
///
/// # Errors
///
/// Returns an error if the package cannot be found or loaded, a parameter
/// source is invalid, or the output cannot be written.
pub fn execute(args: RenderArgs) -> anyhow::Result<()> {
    let location = super::locate_app(args.app.as_deref())?;
    let package = load(&location.path, location.encoding)?;

    let options = RenderOptions {
        parameter_files: args.parameters_files,
        sets: args.sets,
        format: args.formatter,
    };
    let rendered = render_package(&package, &options, &Environment::capture())?;

    match args.output {
        Some(path) => {
            StagedWrite::file(&path, &rendered.bytes)?.commit(&path, Replace::Always)?;
            tracing::info!(path = %path.display(), "wrote rendered compose file");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&rendered.bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
