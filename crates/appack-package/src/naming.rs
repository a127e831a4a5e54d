//! Package naming rules.

use std::path::Path;

use appack_common::constants::APP_EXTENSION;

/// Derives a package file or directory name from an application name.
///
/// Lowercases, replaces characters outside `[a-z0-9._-]` with `-`, and
/// appends the package suffix unless already present.
#[must_use]
pub fn dir_name_from_app_name(name: &str) -> String {
    let mut out: String = name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    if !out.ends_with(APP_EXTENSION) {
        out.push_str(APP_EXTENSION);
    }
    out
}

/// Application name implied by a package path: its file name without the
/// package suffix.
#[must_use]
pub fn app_name_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    file_name
        .strip_suffix(APP_EXTENSION)
        .map_or_else(|| file_name.clone(), str::to_string)
}

/// Returns `true` if `name` carries the package suffix.
#[must_use]
pub fn has_app_extension(name: &str) -> bool {
    name.len() > APP_EXTENSION.len() && name.ends_with(APP_EXTENSION)
}
