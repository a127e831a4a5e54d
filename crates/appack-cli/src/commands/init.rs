//! `appack init` — Create a new application package.

use std::path::PathBuf;

use clap::Args;

use appack_common::config::AppConfig;
use appack_package::init::{InitRequest, init};

/// Arguments for the `init` command.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Application name.
    pub name: String,

    /// Compose file to start from (defaults to ./docker-compose.yml).
    #[arg(long)]
    pub compose_file: Option<PathBuf>,

    /// Short description of the application.
    #[arg(long)]
    pub description: Option<String>,

    /// Maintainer as `name` or `name:email`; may be repeated.
    #[arg(long = "maintainer")]
    pub maintainers: Vec<String>,

    /// Environment file used to seed parameter defaults.
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Version of the new application.
    #[arg(long)]
    pub app_version: Option<String>,

    /// Write a single-file package instead of a directory.
    #[arg(short, long)]
    pub single_file: bool,
}

/// Executes the `init` command.
///
/// # Errors
///
/// Returns an error if the compose or env file cannot be read, or the
/// package already exists.
pub fn execute(args: InitArgs) -> anyhow::Result<()> {
    let request = InitRequest {
        name: args.name,
        compose_file: args.compose_file,
        description: args.description,
        maintainers: args.maintainers,
        env_file: args.env_file,
        version: args.app_version,
        single_file: args.single_file,
    };
    let cwd = super::current_dir()?;
    let path = init(&request, &cwd, &AppConfig::default())?;

    println!("Created {}", path.display());
    Ok(())
}
