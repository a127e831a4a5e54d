//! # appack-params
//!
//! Parameter handling for application packages.
//!
//! Handles:
//! - **Schema**: The insertion-ordered parameter defaults shipped in a package.
//! - **Sources**: An explicit, ordered list of named value sources.
//! - **Resolver**: Overlays the sources into one flat mapping, last source wins.
//! - **Environment**: The process environment snapshot used during rendering.
//! - **Env files**: `.env` parsing used to seed defaults at `init` time.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod envfile;
pub mod environment;
pub mod resolver;
pub mod schema;
pub mod source;

pub use environment::Environment;
pub use resolver::{ResolvedParameters, ResolvedValue, resolve};
pub use schema::ParameterSchema;
pub use source::{ParameterSource, ParameterSources, SourceKind, parse_set};
