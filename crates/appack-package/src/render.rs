//! Rendering a loaded package.

use std::path::PathBuf;

use appack_common::error::Result;
use appack_common::types::OutputFormat;
use appack_compose::Rendered;
use appack_params::{Environment, ParameterSources, resolve};

use crate::package::Package;

/// Parameter inputs and output format of one render.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Parameters files, lowest precedence first.
    pub parameter_files: Vec<PathBuf>,
    /// `key=value` overrides, applied after every file.
    pub sets: Vec<String>,
    /// Output format.
    pub format: OutputFormat,
}

/// Builds the source chain: package defaults, then each file, then each
/// `--set` entry.
///
/// # Errors
///
/// Returns an error if a file cannot be read or parsed, or a `--set` entry
/// is malformed.
pub fn parameter_sources(package: &Package, options: &RenderOptions) -> Result<ParameterSources> {
    let mut sources = ParameterSources::with_defaults(package.parameters());
    for file in &options.parameter_files {
        sources.push_file(file)?;
    }
    sources.push_sets(&options.sets)?;
    Ok(sources)
}

/// Resolves parameters and renders the package's compose template.
///
/// Unfilled references are passed through and reported in the result.
///
/// # Errors
///
/// Returns an error if the parameter sources are invalid or JSON output was
/// requested for text that is not valid YAML.
pub fn render_package(
    package: &Package,
    options: &RenderOptions,
    env: &Environment,
) -> Result<Rendered> {
    let sources = parameter_sources(package, options)?;
    let params = resolve(&sources);
    tracing::info!(
        app = %package.name(),
        parameters = params.len(),
        sources = sources.len(),
        "rendering package"
    );
    appack_compose::render(package.compose(), &params, env, options.format)
}
