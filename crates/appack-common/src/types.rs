//! Domain primitive types used across the appack workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// A person responsible for an application package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maintainer {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Contact address; empty when unknown.
    #[serde(default)]
    pub email: String,
}

impl Maintainer {
    /// Parses a `name` or `name:email` token as given on the command line.
    ///
    /// A bare name yields an empty email.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        match token.split_once(':') {
            Some((name, email)) => Self {
                name: name.to_string(),
                email: email.to_string(),
            },
            None => Self {
                name: token.to_string(),
                email: String::new(),
            },
        }
    }
}

impl fmt::Display for Maintainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.email.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} <{}>", self.name, self.email)
        }
    }
}

/// A metadata field present with the wrong type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProblem {
    /// Dotted field path, e.g. `metadata.name`.
    pub field: String,
    /// What was found instead.
    pub reason: String,
}

/// Identity of an application package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Semver-like version string.
    #[serde(default)]
    pub version: String,
    /// Application name.
    #[serde(default)]
    pub name: String,
    /// Free-form description, possibly empty.
    #[serde(default)]
    pub description: String,
    /// Maintainers in declaration order.
    #[serde(default)]
    pub maintainers: Vec<Maintainer>,
    /// Fields read as empty because they had the wrong type.
    #[serde(skip)]
    pub problems: Vec<FieldProblem>,
}

impl Metadata {
    /// Parses a metadata document. An empty document yields default metadata.
    ///
    /// Parsing is lenient: any scalar is accepted as a string, `null` reads as
    /// empty, and a field of the wrong type reads as empty and is recorded in
    /// [`Metadata::problems`].
    ///
    /// # Errors
    ///
    /// Returns the YAML error if the document is not YAML or its top level is
    /// not a mapping.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        use serde::de::Error as _;

        if is_blank_document(text) {
            return Ok(Self::default());
        }
        let root = match serde_yaml::from_str::<Value>(text)? {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(m) => m,
            other => {
                return Err(serde_yaml::Error::custom(format!(
                    "expected a metadata mapping, got {}",
                    kind_of(&other)
                )));
            }
        };

        let mut problems = Vec::new();
        let version = scalar_field(&root, "version", "metadata", &mut problems);
        let name = scalar_field(&root, "name", "metadata", &mut problems);
        let description = scalar_field(&root, "description", "metadata", &mut problems);
        let mut maintainers = Vec::new();
        match root.get("maintainers") {
            None | Some(Value::Null) => {}
            Some(Value::Sequence(items)) => {
                for (i, item) in items.iter().enumerate() {
                    let field = format!("metadata.maintainers[{i}]");
                    match item {
                        Value::Mapping(m) => maintainers.push(Maintainer {
                            name: scalar_field(m, "name", &field, &mut problems),
                            email: scalar_field(m, "email", &field, &mut problems),
                        }),
                        other => problems.push(FieldProblem {
                            field,
                            reason: format!("expected a mapping, got {}", kind_of(other)),
                        }),
                    }
                }
            }
            Some(other) => problems.push(FieldProblem {
                field: "metadata.maintainers".into(),
                reason: format!("expected a list, got {}", kind_of(other)),
            }),
        }

        Ok(Self {
            version,
            name,
            description,
            maintainers,
            problems,
        })
    }

    /// Returns `true` if `field` was present with the wrong type.
    #[must_use]
    pub fn has_problem(&self, field: &str) -> bool {
        self.problems.iter().any(|p| p.field == field)
    }
}

/// Returns `true` if a YAML document holds nothing but blank and comment lines.
#[must_use]
pub fn is_blank_document(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

/// Reads `key` of `mapping` as a string, recording a problem under
/// `parent.key` when it is not a scalar.
fn scalar_field(
    mapping: &Mapping,
    key: &str,
    parent: &str,
    problems: &mut Vec<FieldProblem>,
) -> String {
    match mapping.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            problems.push(FieldProblem {
                field: format!("{parent}.{key}"),
                reason: format!("expected a scalar value, got {}", kind_of(other)),
            });
            String::new()
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) | Value::Number(_) | Value::String(_) => "a scalar",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// On-disk encoding of a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    /// One regular file holding every document.
    SingleFile,
    /// A directory with one file per document plus attachments.
    MultiFile,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleFile => write!(f, "single-file"),
            Self::MultiFile => write!(f, "multi-file"),
        }
    }
}

/// Output format of a rendered compose document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The substituted template text.
    #[default]
    Yaml,
    /// A structural JSON re-encoding.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "yaml"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown formatter \"{other}\" (expected yaml or json)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maintainer_parse_with_email() {
        let m = Maintainer::parse("joe:joe@joe.com");
        assert_eq!(m.name, "joe");
        assert_eq!(m.email, "joe@joe.com");
        assert_eq!(m.to_string(), "joe <joe@joe.com>");
    }

    #[test]
    fn maintainer_parse_bare_name_has_empty_email() {
        let m = Maintainer::parse("bob");
        assert_eq!(m.name, "bob");
        assert!(m.email.is_empty());
        assert_eq!(m.to_string(), "bob");
    }

    #[test]
    fn metadata_null_fields_read_as_empty() {
        let text = "version: 0.1.0\nname: app-test\ndescription:\nmaintainers:\n  - name: bob\n    email: \n  - name: joe\n    email: joe@joe.com\n";
        let meta = Metadata::from_yaml(text).expect("parse");
        assert_eq!(meta.name, "app-test");
        assert_eq!(meta.version, "0.1.0");
        assert!(meta.description.is_empty());
        assert_eq!(meta.maintainers.len(), 2);
        assert_eq!(meta.maintainers[0].name, "bob");
        assert!(meta.maintainers[0].email.is_empty());
        assert_eq!(meta.maintainers[1].email, "joe@joe.com");
    }

    #[test]
    fn metadata_numeric_version_is_stringified() {
        let meta = Metadata::from_yaml("version: 1.5\nname: x\n").expect("parse");
        assert_eq!(meta.version, "1.5");
    }

    #[test]
    fn metadata_empty_document_is_default() {
        let meta = Metadata::from_yaml("").expect("parse");
        assert_eq!(meta, Metadata::default());
    }

    #[test]
    fn metadata_rejects_non_mapping() {
        assert!(Metadata::from_yaml("just a string").is_err());
    }

    #[test]
    fn metadata_wrong_types_are_recorded() {
        let text = "version: 0.1.0\nname: [a]\nmaintainers:\n  - name: {first: joe}\n    email: joe@joe.com\n  - bob\n";
        let meta = Metadata::from_yaml(text).expect("parse");
        assert!(meta.name.is_empty());
        assert_eq!(meta.version, "0.1.0");
        assert_eq!(meta.maintainers.len(), 1);
        assert_eq!(meta.maintainers[0].email, "joe@joe.com");
        let fields: Vec<_> = meta.problems.iter().map(|p| p.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "metadata.name",
                "metadata.maintainers[0].name",
                "metadata.maintainers[1]",
            ]
        );
        assert!(meta.has_problem("metadata.name"));
        assert!(!meta.has_problem("metadata.version"));
    }

    #[test]
    fn metadata_maintainers_must_be_a_list() {
        let meta = Metadata::from_yaml("name: x\nmaintainers: bob\n").expect("parse");
        assert!(meta.maintainers.is_empty());
        assert!(meta.has_problem("metadata.maintainers"));
    }

    #[test]
    fn output_format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("yml".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
        assert!("toml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn encoding_display() {
        assert_eq!(Encoding::SingleFile.to_string(), "single-file");
        assert_eq!(Encoding::MultiFile.to_string(), "multi-file");
    }
}
