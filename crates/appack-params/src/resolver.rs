//! Folds ordered parameter sources into one flat mapping.

use indexmap::IndexMap;

use crate::source::{ParameterSources, SourceKind};

/// A resolved value and the source that supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValue {
    /// Final string value.
    pub value: String,
    /// Label of the winning source.
    pub source: String,
    /// Kind of the winning source.
    pub kind: SourceKind,
}

/// The final parameter mapping of one render call.
///
/// Keys keep the position of their first definition across all sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedParameters {
    values: IndexMap<String, ResolvedValue>,
}

impl ResolvedParameters {
    /// Returns the value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|v| v.value.as_str())
    }

    /// Returns the value of `name` with its provenance.
    #[must_use]
    pub fn get_resolved(&self, name: &str) -> Option<&ResolvedValue> {
        self.values.get(name)
    }

    /// Iterates `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(k, v)| (k.as_str(), v.value.as_str()))
    }

    /// Number of resolved parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResolvedParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let values = iter
            .into_iter()
            .map(|(k, v)| {
                (
                    k.into(),
                    ResolvedValue {
                        value: v.into(),
                        source: "inline".into(),
                        kind: SourceKind::Set,
                    },
                )
            })
            .collect();
        Self { values }
    }
}

/// Resolves `sources` front to back; on a key collision the later source wins.
///
/// Names absent from the schema are accepted like any other.
#[must_use]
pub fn resolve(sources: &ParameterSources) -> ResolvedParameters {
    let mut values: IndexMap<String, ResolvedValue> = IndexMap::new();
    for source in sources.iter() {
        tracing::debug!(source = %source.name, kind = %source.kind, count = source.values.len(), "applying parameter source");
        for (name, value) in &source.values {
            let _ = values.insert(
                name.clone(),
                ResolvedValue {
                    value: value.clone(),
                    source: source.name.clone(),
                    kind: source.kind,
                },
            );
        }
    }
    ResolvedParameters { values }
}
