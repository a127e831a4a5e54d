//! The parameter schema: parameter name to default value.
//!
//! Keys keep the order of their first definition so that re-serializing a
//! schema produces stable diffs.

use appack_common::error::{AppError, Result};
use indexmap::IndexMap;
use serde_yaml::Value;

/// Ordered mapping of parameter name to scalar default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSchema {
    entries: IndexMap<String, Value>,
}

impl ParameterSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a flat YAML mapping of scalars.
    ///
    /// `source_name` labels the document in error messages (usually a path).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidParameterFile`] if the text is not YAML, is
    /// not a mapping, or holds a non-scalar key or value.
    pub fn from_yaml(source_name: &str, text: &str) -> Result<Self> {
        if appack_common::types::is_blank_document(text) {
            return Ok(Self::new());
        }
        let invalid = |reason: String| AppError::InvalidParameterFile {
            source_name: source_name.to_string(),
            reason,
        };
        let doc: Value = serde_yaml::from_str(text).map_err(|e| invalid(e.to_string()))?;
        let mapping = match doc {
            Value::Null => return Ok(Self::new()),
            Value::Mapping(mapping) => mapping,
            other => {
                return Err(invalid(format!(
                    "expected a mapping of parameter names to values, got {}",
                    kind_of(&other)
                )));
            }
        };

        let mut schema = Self::new();
        for (key, value) in mapping {
            let name = scalar_to_string(&key)
                .ok_or_else(|| invalid(format!("parameter name must be a scalar, got {}", kind_of(&key))))?;
            let value = untag(value);
            if !is_scalar(&value) {
                return Err(invalid(format!(
                    "parameter \"{name}\" must be a scalar, got {}",
                    kind_of(&value)
                )));
            }
            schema.insert(name, value);
        }
        Ok(schema)
    }

    /// Inserts or replaces a default, keeping the original position of an
    /// existing key.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let _ = self.entries.insert(name.into(), value.into());
    }

    /// Returns the default for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Returns the default for `name` as a string.
    #[must_use]
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.entries.get(name).and_then(scalar_to_string)
    }

    /// Returns `true` if the schema defines `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates entries in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates entries in definition order with values rendered as strings.
    pub fn string_entries(&self) -> impl Iterator<Item = (&str, String)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), scalar_to_string(v).unwrap_or_default()))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no parameter is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the schema as a flat YAML mapping, one key per line.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidParameterFile`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        if self.entries.is_empty() {
            return Ok(String::new());
        }
        let mapping: serde_yaml::Mapping = self
            .entries
            .iter()
            .map(|(k, v)| (Value::String(k.clone()), v.clone()))
            .collect();
        serde_yaml::to_string(&mapping).map_err(|e| AppError::InvalidParameterFile {
            source_name: "parameters".into(),
            reason: e.to_string(),
        })
    }
}

/// Renders a YAML scalar the way it is substituted into a template.
///
/// `null` renders as the empty string. Returns `None` for sequences and
/// mappings.
#[must_use]
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn untag(value: Value) -> Value {
    match value {
        Value::Tagged(tagged) => untag(tagged.value),
        other => other,
    }
}

const fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Sequence(_) | Value::Mapping(_))
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
