//! Rendering: substitute resolved parameters into a template and format it.

use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

use appack_common::error::{AppError, Result};
use appack_common::types::OutputFormat;
use appack_params::{Environment, ResolvedParameters};

use crate::template::ComposeTemplate;

/// A rendered compose document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Formatted output.
    pub bytes: Vec<u8>,
    /// References that had no value and were passed through unchanged.
    pub unfilled: Vec<String>,
}

/// Renders `template` with `params` and `env` into `format`.
///
/// YAML output is the substituted text byte for byte. JSON output re-parses
/// the substituted text and pretty-prints it with sorted keys.
///
/// # Errors
///
/// Returns [`AppError::MalformedCompose`] if JSON output was requested and
/// the substituted text is not valid YAML.
pub fn render(
    template: &ComposeTemplate,
    params: &ResolvedParameters,
    env: &Environment,
    format: OutputFormat,
) -> Result<Rendered> {
    let interpolation = template.interpolate(params, env);
    for name in &interpolation.unfilled {
        tracing::warn!(parameter = %name, "no value for variable, left unsubstituted");
    }

    let bytes = match format {
        OutputFormat::Yaml => interpolation.text.into_bytes(),
        OutputFormat::Json => to_json(&interpolation.text)?.into_bytes(),
    };
    tracing::info!(%format, bytes = bytes.len(), "rendered compose template");

    Ok(Rendered {
        bytes,
        unfilled: interpolation.unfilled,
    })
}

/// Converts YAML text to pretty-printed JSON with a trailing newline.
///
/// Merge keys (`<<: *anchor`) are expanded first.
///
/// # Errors
///
/// Returns [`AppError::MalformedCompose`] if `text` is not valid YAML.
pub fn to_json(text: &str) -> Result<String> {
    let malformed = |e: serde_yaml::Error| AppError::MalformedCompose {
        reason: e.to_string(),
    };
    let mut yaml: YamlValue = serde_yaml::from_str(text).map_err(malformed)?;
    yaml.apply_merge().map_err(malformed)?;
    let json = yaml_to_json(yaml);
    let mut out = serde_json::to_string_pretty(&json).map_err(|e| AppError::MalformedCompose {
        reason: e.to_string(),
    })?;
    out.push('\n');
    Ok(out)
}

fn yaml_to_json(value: YamlValue) -> JsonValue {
    match value {
        YamlValue::Null => JsonValue::Null,
        YamlValue::Bool(b) => JsonValue::Bool(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::from(i)
            } else if let Some(u) = n.as_u64() {
                JsonValue::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(JsonValue::Null, JsonValue::Number)
            }
        }
        YamlValue::String(s) => JsonValue::String(s),
        YamlValue::Sequence(items) => {
            JsonValue::Array(items.into_iter().map(yaml_to_json).collect())
        }
        YamlValue::Mapping(m) => JsonValue::Object(
            m.into_iter()
                .map(|(k, v)| (key_to_string(k), yaml_to_json(v)))
                .collect(),
        ),
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn key_to_string(key: YamlValue) -> String {
    match key {
        YamlValue::String(s) => s,
        YamlValue::Null => "null".into(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Tagged(tagged) => key_to_string(tagged.value),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
