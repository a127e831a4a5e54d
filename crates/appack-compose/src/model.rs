//! A lenient structural view of a rendered compose file.
//!
//! Only the parts `inspect` and `validate` look at are extracted: services
//! with their image, replica count, ports, and `depends_on`, plus the
//! top-level network and volume names. Everything else is ignored.

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

use appack_common::error::{AppError, Result};
use appack_common::types::is_blank_document;

/// One service of a compose file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Service {
    /// Image reference, if declared.
    pub image: Option<String>,
    /// `deploy.replicas`, if declared.
    pub replicas: Option<u64>,
    /// Port specs, normalized to their short string form.
    pub ports: Vec<String>,
    /// Names of the services this one depends on.
    pub depends_on: Vec<String>,
}

/// The structural content of a compose file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeFile {
    /// Whether the file has a `services` section at all.
    pub declares_services: bool,
    /// Services keyed by name, in declaration order.
    pub services: IndexMap<String, Service>,
    /// Top-level network names.
    pub networks: Vec<String>,
    /// Top-level volume names.
    pub volumes: Vec<String>,
}

impl ComposeFile {
    /// Parses compose text.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::MalformedCompose`] if the text is not YAML, the
    /// top level is not a mapping, or a section has the wrong shape.
    pub fn parse(text: &str) -> Result<Self> {
        if is_blank_document(text) {
            return Ok(Self::default());
        }
        let mut value: Value = serde_yaml::from_str(text).map_err(|e| malformed(e.to_string()))?;
        value.apply_merge().map_err(|e| malformed(e.to_string()))?;
        let root = match value {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(m) => m,
            other => {
                return Err(malformed(format!(
                    "top level must be a mapping, found {}",
                    kind_of(&other)
                )));
            }
        };

        let mut services = IndexMap::new();
        let declares_services = root.contains_key("services");
        if let Some(section) = section(&root, "services")? {
            for (name, body) in section {
                let name = key_string(name)?;
                let service = parse_service(&name, body)?;
                let _ = services.insert(name, service);
            }
        }

        Ok(Self {
            declares_services,
            services,
            networks: section_names(&root, "networks")?,
            volumes: section_names(&root, "volumes")?,
        })
    }

    /// Service names in declaration order.
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }
}

fn parse_service(name: &str, body: &Value) -> Result<Service> {
    let body = match body {
        Value::Null => return Ok(Service::default()),
        Value::Mapping(m) => m,
        other => {
            return Err(malformed(format!(
                "service \"{name}\" must be a mapping, found {}",
                kind_of(other)
            )));
        }
    };

    let image = match body.get("image") {
        None | Some(Value::Null) => None,
        Some(v) => Some(scalar(v).ok_or_else(|| {
            malformed(format!("service \"{name}\": image must be a string"))
        })?),
    };

    let replicas = body
        .get("deploy")
        .and_then(|d| d.get("replicas"))
        .and_then(Value::as_u64);

    let ports = match body.get("ports") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Sequence(items)) => items.iter().filter_map(port_spec).collect(),
        Some(_) => {
            return Err(malformed(format!(
                "service \"{name}\": ports must be a list"
            )));
        }
    };

    let depends_on = match body.get("depends_on") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|v| {
                scalar(v).ok_or_else(|| {
                    malformed(format!(
                        "service \"{name}\": depends_on entries must be service names"
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?,
        Some(Value::Mapping(m)) => m.keys().map(key_string).collect::<Result<Vec<_>>>()?,
        Some(_) => {
            return Err(malformed(format!(
                "service \"{name}\": depends_on must be a list or mapping"
            )));
        }
    };

    Ok(Service {
        image,
        replicas,
        ports,
        depends_on,
    })
}

/// Short form of a port entry: `"8080:80"` stays as is, long syntax becomes
/// `published:target`.
fn port_spec(value: &Value) -> Option<String> {
    if let Some(s) = scalar(value) {
        return Some(s);
    }
    let m = value.as_mapping()?;
    let target = m.get("target").and_then(scalar)?;
    match m.get("published").and_then(scalar) {
        Some(published) => Some(format!("{published}:{target}")),
        None => Some(target),
    }
}

fn section<'a>(root: &'a Mapping, key: &str) -> Result<Option<&'a Mapping>> {
    match root.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Mapping(m)) => Ok(Some(m)),
        Some(other) => Err(malformed(format!(
            "{key} must be a mapping, found {}",
            kind_of(other)
        ))),
    }
}

fn section_names(root: &Mapping, key: &str) -> Result<Vec<String>> {
    section(root, key)?.map_or_else(
        || Ok(Vec::new()),
        |m| m.keys().map(key_string).collect(),
    )
}

fn key_string(key: &Value) -> Result<String> {
    scalar(key).ok_or_else(|| malformed("mapping keys must be scalars"))
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

fn malformed(reason: impl Into<String>) -> AppError {
    AppError::MalformedCompose {
        reason: reason.into(),
    }
}
