//! The compose template: opaque text with a variable-reference surface.

pub mod lexer;

use appack_params::{Environment, ResolvedParameters};

use self::lexer::{DefaultWhen, Segment};

/// A variable referenced by a template, with its inline default if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    /// Variable name.
    pub name: String,
    /// Inline default text (`${NAME:-default}` or `${NAME-default}`).
    pub default: Option<String>,
}

/// Compose template text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeTemplate {
    raw: String,
}

impl ComposeTemplate {
    /// Wraps template text.
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The template text, byte for byte.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Every distinct variable the template references, in order of first
    /// appearance. The first inline default seen for a name is kept.
    #[must_use]
    pub fn references(&self) -> Vec<VariableReference> {
        let mut refs: Vec<VariableReference> = Vec::new();
        for segment in lexer::segments(&self.raw) {
            let Segment::Reference(r) = segment else {
                continue;
            };
            match refs.iter_mut().find(|v| v.name == r.name) {
                Some(existing) => {
                    if existing.default.is_none() {
                        existing.default = r.default.map(|d| d.value.to_string());
                    }
                }
                None => refs.push(VariableReference {
                    name: r.name.to_string(),
                    default: r.default.map(|d| d.value.to_string()),
                }),
            }
        }
        refs
    }

    /// Substitutes variables in a single pass.
    ///
    /// Lookup order: resolved parameters, then the environment snapshot, then
    /// the inline default. A reference with no value is copied through
    /// verbatim and reported in [`Interpolation::unfilled`]. Substituted
    /// values are never scanned again.
    #[must_use]
    pub fn interpolate(&self, params: &ResolvedParameters, env: &Environment) -> Interpolation {
        let mut text = String::with_capacity(self.raw.len());
        let mut unfilled: Vec<String> = Vec::new();

        for segment in lexer::segments(&self.raw) {
            match segment {
                Segment::Literal(s) => text.push_str(s),
                Segment::EscapedDollar => text.push('$'),
                Segment::Reference(r) => {
                    let found = params.get(r.name).or_else(|| env.get(r.name));
                    let chosen = match (found, r.default) {
                        (Some(v), Some(d)) if v.is_empty() && d.when == DefaultWhen::UnsetOrEmpty => {
                            Some(d.value)
                        }
                        (Some(v), _) => Some(v),
                        (None, Some(d)) => Some(d.value),
                        (None, None) => None,
                    };
                    if let Some(v) = chosen {
                        text.push_str(v);
                    } else {
                        text.push_str(r.raw);
                        if !unfilled.iter().any(|n| n == r.name) {
                            unfilled.push(r.name.to_string());
                        }
                    }
                }
            }
        }

        Interpolation { text, unfilled }
    }
}

/// Result of substituting variables into a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolation {
    /// Substituted text.
    pub text: String,
    /// Names left unresolved, in order of first appearance.
    pub unfilled: Vec<String>,
}
