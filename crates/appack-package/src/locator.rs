//! Finds the package a command operates on.
//!
//! An explicit argument is resolved as a path, retried with the package
//! suffix when missing. With no argument (or `.`) the working directory is
//! used if it is itself a package, otherwise its entries are scanned and
//! exactly one package must be found.

use std::path::{Path, PathBuf};

use appack_common::constants::{APP_EXTENSION, METADATA_FILE_NAME};
use appack_common::error::{AppError, Result};
use appack_common::types::Encoding;

use crate::naming::has_app_extension;

/// Where a package lives and how it is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLocation {
    /// Path of the package file or directory.
    pub path: PathBuf,
    /// Its encoding.
    pub encoding: Encoding,
}

/// Outcome of scanning a directory listing for packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detected {
    /// The directory itself is the package.
    WorkingDirectory,
    /// The named entry is the package.
    Entry(String),
}

/// Chooses the package from a directory name and its entry names.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] if no candidate exists, or
/// [`AppError::MultipleApplications`] listing every candidate if there is
/// more than one.
pub fn detect_application<S: AsRef<str>>(cwd_name: &str, entries: &[S]) -> Result<Detected> {
    if has_app_extension(cwd_name) {
        return Ok(Detected::WorkingDirectory);
    }
    let mut candidates: Vec<String> = entries
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| has_app_extension(name))
        .map(str::to_string)
        .collect();
    candidates.sort();
    match candidates.len() {
        0 => Err(AppError::NotFound {
            location: format!("no {APP_EXTENSION} package in current directory"),
        }),
        1 => Ok(Detected::Entry(candidates.remove(0))),
        _ => Err(AppError::MultipleApplications { candidates }),
    }
}

/// Resolves the package named by `app` relative to `cwd`.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] or [`AppError::MultipleApplications`] as
/// described in the module docs, or an I/O error if `cwd` cannot be listed.
pub fn locate(app: Option<&str>, cwd: &Path) -> Result<PackageLocation> {
    let location = match app {
        None | Some("" | ".") => locate_in(cwd)?,
        Some(name) => locate_explicit(name, cwd)?,
    };
    tracing::debug!(
        path = %location.path.display(),
        encoding = %location.encoding,
        "located package"
    );
    Ok(location)
}

fn locate_in(cwd: &Path) -> Result<PackageLocation> {
    let cwd_name = cwd
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default();
    let entries: Vec<String> = std::fs::read_dir(cwd)
        .map_err(|e| AppError::io(cwd, e))?
        .filter_map(std::result::Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();

    let path = match detect_application(&cwd_name, &entries)? {
        Detected::WorkingDirectory => cwd.to_path_buf(),
        Detected::Entry(name) => cwd.join(name),
    };
    classify(&path)?.ok_or_else(|| not_found(&path))
}

fn locate_explicit(name: &str, cwd: &Path) -> Result<PackageLocation> {
    let path = cwd.join(name);
    if path.exists() {
        return classify(&path)?.ok_or_else(|| not_found(&path));
    }
    let suffixed = cwd.join(format!("{name}{APP_EXTENSION}"));
    if suffixed.exists() {
        return classify(&suffixed)?.ok_or_else(|| not_found(&suffixed));
    }
    Err(not_found(&path))
}

/// Determines the encoding of an existing path, or `None` if it is a
/// directory that does not look like a package.
fn classify(path: &Path) -> Result<Option<PackageLocation>> {
    let meta = std::fs::metadata(path).map_err(|e| AppError::io(path, e))?;
    let encoding = if meta.is_file() {
        Encoding::SingleFile
    } else if meta.is_dir() {
        let named = path
            .file_name()
            .is_some_and(|n| has_app_extension(&n.to_string_lossy()));
        if named || path.join(METADATA_FILE_NAME).is_file() {
            Encoding::MultiFile
        } else {
            return Ok(None);
        }
    } else {
        return Ok(None);
    };
    Ok(Some(PackageLocation {
        path: path.to_path_buf(),
        encoding,
    }))
}

fn not_found(path: &Path) -> AppError {
    AppError::NotFound {
        location: path.display().to_string(),
    }
}
