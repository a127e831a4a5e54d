//! Ordered, named parameter sources.
//!
//! The precedence chain is data: a [`ParameterSources`] list is built in
//! the order sources were given, and the resolver folds it front to back.

use std::fmt;
use std::path::Path;

use appack_common::error::{AppError, Result};
use indexmap::IndexMap;

use crate::schema::ParameterSchema;

/// Where a parameter source came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Defaults from the package's own parameter schema.
    Defaults,
    /// A `--parameters-files` entry.
    File,
    /// A `--set key=value` override.
    Set,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defaults => write!(f, "defaults"),
            Self::File => write!(f, "file"),
            Self::Set => write!(f, "set"),
        }
    }
}

/// A single named layer of parameter values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSource {
    /// Label shown to operators: a path, `defaults`, or `--set`.
    pub name: String,
    /// Kind of source.
    pub kind: SourceKind,
    /// Values contributed by this source, in definition order.
    pub values: IndexMap<String, String>,
}

/// An ordered list of parameter sources, lowest precedence first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSources {
    sources: Vec<ParameterSource>,
}

impl ParameterSources {
    /// Creates an empty source list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source list seeded with the schema defaults.
    #[must_use]
    pub fn with_defaults(schema: &ParameterSchema) -> Self {
        let mut sources = Self::new();
        sources.push_defaults(schema);
        sources
    }

    /// Appends the defaults of `schema`.
    pub fn push_defaults(&mut self, schema: &ParameterSchema) {
        self.sources.push(ParameterSource {
            name: "defaults".into(),
            kind: SourceKind::Defaults,
            values: schema
                .string_entries()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        });
    }

    /// Reads and appends a parameters file.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Io`] if the file cannot be read, or
    /// [`AppError::InvalidParameterFile`] if it is not a flat mapping.
    pub fn push_file(&mut self, path: &Path) -> Result<()> {
        tracing::debug!(path = %path.display(), "reading parameters file");
        let text = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
        self.push_file_contents(&path.display().to_string(), &text)
    }

    /// Appends an already-read parameters document labelled `name`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidParameterFile`] if the text is not a flat
    /// mapping of scalars.
    pub fn push_file_contents(&mut self, name: &str, text: &str) -> Result<()> {
        let schema = ParameterSchema::from_yaml(name, text)?;
        self.sources.push(ParameterSource {
            name: name.to_string(),
            kind: SourceKind::File,
            values: schema
                .string_entries()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        });
        Ok(())
    }

    /// Appends `--set` overrides in the order given, one source per entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidSetSyntax`] on the first malformed entry;
    /// nothing is appended in that case.
    pub fn push_sets<S: AsRef<str>>(&mut self, entries: &[S]) -> Result<()> {
        let parsed = entries
            .iter()
            .map(|e| parse_set(e.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        for (key, value) in parsed {
            let mut values = IndexMap::new();
            let _ = values.insert(key, value);
            self.sources.push(ParameterSource {
                name: "--set".into(),
                kind: SourceKind::Set,
                values,
            });
        }
        Ok(())
    }

    /// Appends an arbitrary source.
    pub fn push(&mut self, source: ParameterSource) {
        self.sources.push(source);
    }

    /// Iterates sources, lowest precedence first.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterSource> {
        self.sources.iter()
    }

    /// Number of sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns `true` if there are no sources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Splits a `--set` entry at its first `=`.
///
/// The value is taken verbatim and may itself contain `=`.
///
/// # Errors
///
/// Returns [`AppError::InvalidSetSyntax`] if there is no `=` or the key is
/// empty.
pub fn parse_set(entry: &str) -> Result<(String, String)> {
    match entry.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(AppError::InvalidSetSyntax {
            entry: entry.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_set_splits_at_first_equals() {
        let (k, v) = parse_set("opts=a=b").expect("parse");
        assert_eq!(k, "opts");
        assert_eq!(v, "a=b");
    }

    #[test]
    fn parse_set_keeps_empty_value() {
        let (k, v) = parse_set("empty=").expect("parse");
        assert_eq!(k, "empty");
        assert!(v.is_empty());
    }

    #[test]
    fn parse_set_without_separator_fails() {
        let err = parse_set("web_port").unwrap_err();
        assert!(matches!(err, AppError::InvalidSetSyntax { .. }));
    }

    #[test]
    fn parse_set_with_empty_key_fails() {
        assert!(parse_set("=8080").is_err());
    }

    #[test]
    fn push_sets_is_all_or_nothing() {
        let mut sources = ParameterSources::new();
        let result = sources.push_sets(&["a=1", "broken", "b=2"]);
        assert!(result.is_err());
        assert!(sources.is_empty());
    }

    #[test]
    fn push_sets_adds_one_source_per_entry_in_order() {
        let mut sources = ParameterSources::new();
        sources.push_sets(&["a=1", "a=2"]).expect("push");
        let values: Vec<_> = sources
            .iter()
            .map(|s| s.values.get("a").cloned().unwrap_or_default())
            .collect();
        assert_eq!(values, vec!["1", "2"]);
        assert!(sources.iter().all(|s| s.kind == SourceKind::Set));
    }

    #[test]
    fn push_file_reads_flat_mapping() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("params.yml");
        std::fs::write(&path, "web_port: 8080\n").expect("write");

        let mut sources = ParameterSources::new();
        sources.push_file(&path).expect("push");
        let source = sources.iter().next().expect("one source");
        assert_eq!(source.kind, SourceKind::File);
        assert_eq!(source.values.get("web_port").map(String::as_str), Some("8080"));
    }

    #[test]
    fn push_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sources = ParameterSources::new();
        let err = sources.push_file(&dir.path().join("nope.yml")).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }
}
