//! # appack-compose
//!
//! Compose template handling for application packages.
//!
//! Handles:
//! - **Template**: Variable-reference lexing (`nom`) and single-pass substitution.
//! - **Render**: YAML passthrough and JSON conversion of the substituted text.
//! - **Model**: A lenient structural view of services, networks, and volumes.
//! - **Graph**: Service dependency graph and start order (`petgraph`).
//! - **Validator**: Structural checks on rendered compose files.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod graph;
pub mod model;
pub mod render;
pub mod template;
pub mod validator;

pub use model::{ComposeFile, Service};
pub use render::{Rendered, render};
pub use template::{ComposeTemplate, Interpolation, VariableReference};
