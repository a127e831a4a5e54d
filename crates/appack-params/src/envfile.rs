//! `.env` file parsing.
//!
//! One `KEY=value` per line. Blank lines and `#` comments are ignored, an
//! optional `export ` prefix is accepted, and matching surrounding quotes
//! are stripped from the value.

use std::path::Path;

use appack_common::error::{AppError, Result};

/// Parses `.env` text into ordered `(key, value)` pairs.
///
/// Lines without `=` carry no value and are skipped.
#[must_use]
pub fn parse_env_file(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                tracing::debug!(line, "skipping .env line without a value");
                return None;
            };
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

/// Reads and parses a `.env` file.
///
/// # Errors
///
/// Returns [`AppError::Io`] if the file cannot be read.
pub fn read_env_file(path: &Path) -> Result<Vec<(String, String)>> {
    let text = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    Ok(parse_env_file(&text))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
