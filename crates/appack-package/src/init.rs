//! Creating a new package from a compose file.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use appack_common::config::AppConfig;
use appack_common::constants::{COMPOSE_FILE_NAME, DEFAULT_APP_VERSION, SKELETON_COMPOSE};
use appack_common::error::{AppError, Result};
use appack_common::types::{Encoding, Maintainer};
use appack_compose::ComposeTemplate;
use appack_params::ParameterSchema;
use appack_params::envfile::read_env_file;

use crate::codec;
use crate::naming::{dir_name_from_app_name, has_app_extension};
use crate::package::Package;
use crate::staging::Replace;

/// Everything `init` needs to build a package.
#[derive(Debug, Clone, Default)]
pub struct InitRequest {
    /// Application name.
    pub name: String,
    /// Compose file to start from.
    pub compose_file: Option<PathBuf>,
    /// Short description.
    pub description: Option<String>,
    /// `name` or `name:email` tokens.
    pub maintainers: Vec<String>,
    /// `.env` file used to seed defaults. Defaults to the one beside the
    /// compose file.
    pub env_file: Option<PathBuf>,
    /// Application version. Defaults to `0.1.0`.
    pub version: Option<String>,
    /// Write the single-file encoding.
    pub single_file: bool,
}

/// Builds the package described by `request`, resolving relative paths
/// against `cwd`.
///
/// # Errors
///
/// Returns [`AppError::SchemaViolation`] if the name is empty, or an error
/// if the compose file or an explicitly requested `.env` file cannot be
/// read, or the generated documents are invalid.
pub fn init_package(request: &InitRequest, cwd: &Path, config: &AppConfig) -> Result<Package> {
    let dir_name = dir_name_from_app_name(&request.name);
    if request.name.trim().is_empty() || !has_app_extension(&dir_name) {
        return Err(AppError::SchemaViolation {
            field: "metadata.name".into(),
            reason: format!("\"{}\" is not a usable application name", request.name),
        });
    }
    let (compose_text, compose_dir) = read_compose_source(request, cwd)?;
    let template = ComposeTemplate::new(compose_text.clone());

    let mut schema = ParameterSchema::new();
    for reference in template.references() {
        let seed = reference
            .default
            .unwrap_or_else(|| config.fill_placeholder.clone());
        schema.insert(reference.name, seed);
    }

    // Only the implicit env file beside the compose file may be absent.
    let env_file = match &request.env_file {
        Some(path) => Some(cwd.join(path)),
        None => compose_dir
            .map(|dir| dir.join(&config.env_file_name))
            .filter(|p| p.is_file()),
    };
    if let Some(path) = env_file {
        for (key, value) in read_env_file(&path)? {
            if schema.contains(&key) {
                tracing::debug!(parameter = %key, env_file = %path.display(), "default taken from env file");
                schema.insert(key, value);
            }
        }
    }

    let maintainers: Vec<Maintainer> = request
        .maintainers
        .iter()
        .map(|m| Maintainer::parse(m))
        .collect();
    let metadata_text = metadata_document(
        request.version.as_deref().unwrap_or(DEFAULT_APP_VERSION),
        &request.name,
        request.description.as_deref().unwrap_or_default(),
        &maintainers,
    );
    let encoding = if request.single_file {
        Encoding::SingleFile
    } else {
        Encoding::MultiFile
    };

    Package::from_documents(
        Path::new(&dir_name),
        metadata_text,
        compose_text,
        schema.to_yaml()?,
        Vec::new(),
        encoding,
    )
}

/// Builds and writes a new package into `cwd`, returning its path.
///
/// # Errors
///
/// Returns [`AppError::DestinationExists`] if the package already exists,
/// or any error from [`init_package`].
pub fn init(request: &InitRequest, cwd: &Path, config: &AppConfig) -> Result<PathBuf> {
    let package = init_package(request, cwd, config)?;
    let dest = cwd.join(dir_name_from_app_name(&request.name));
    codec::save(&package, &dest, Replace::Never)?;
    tracing::info!(name = %request.name, path = %dest.display(), "initialized package");
    Ok(dest)
}

/// Reads the compose source, returning its text and the directory it came
/// from (if it came from a file).
fn read_compose_source(request: &InitRequest, cwd: &Path) -> Result<(String, Option<PathBuf>)> {
    let path = match &request.compose_file {
        Some(path) => cwd.join(path),
        None => {
            let default = cwd.join(COMPOSE_FILE_NAME);
            if !default.is_file() {
                tracing::debug!("no compose file found, using skeleton");
                return Ok((SKELETON_COMPOSE.to_string(), None));
            }
            default
        }
    };
    let text = std::fs::read_to_string(&path).map_err(|e| AppError::io(&path, e))?;
    let dir = path.parent().map(Path::to_path_buf);
    Ok((text, dir))
}

/// Renders the metadata document with one comment line before each key.
#[must_use]
pub fn metadata_document(
    version: &str,
    name: &str,
    description: &str,
    maintainers: &[Maintainer],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Version of the application");
    let _ = writeln!(out, "version: {}", yaml_scalar(version));
    let _ = writeln!(out, "# Name of the application");
    let _ = writeln!(out, "name: {}", yaml_scalar(name));
    let _ = writeln!(out, "# A short description of the application");
    let _ = writeln!(out, "description: {}", yaml_scalar(description));
    let _ = writeln!(
        out,
        "# List of application maintainers with name and email for each"
    );
    let _ = writeln!(out, "maintainers:");
    for m in maintainers {
        let _ = writeln!(out, "  - name: {}", yaml_scalar(&m.name));
        let _ = writeln!(out, "    email: {}", yaml_scalar(&m.email));
    }
    out
}

/// Writes a string as a plain scalar when it reads back unchanged, quoting
/// it otherwise. Empty strings stay empty and read back as null.
fn yaml_scalar(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let reads_back = matches!(
        serde_yaml::from_str::<serde_yaml::Value>(value),
        Ok(serde_yaml::Value::String(ref s)) if s == value
    );
    if reads_back && !value.contains(['#', '\n']) {
        value.to_string()
    } else {
        serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| format!("{value:?}"))
    }
}
