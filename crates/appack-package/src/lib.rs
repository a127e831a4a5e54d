//! # appack-package
//!
//! Application packages and the operations on them.
//!
//! Handles:
//! - **Package**: The encoding-agnostic model and its content digest.
//! - **Codecs**: Single-file and multi-file encodings, `merge` and `split`.
//! - **Staging**: Temporary-sibling writes committed with a rename.
//! - **Locator**: Finding the package a command operates on.
//! - **Init**: Creating a package from a compose file.
//! - **Render / Inspect / Validate**: Read-only operations on a loaded package.
//! - **Boundary**: Traits for bundle builders and orchestrators.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod boundary;
pub mod codec;
pub mod digest;
pub mod init;
pub mod inspect;
pub mod locator;
pub mod multi_file;
pub mod naming;
pub mod package;
pub mod render;
pub mod single_file;
pub mod staging;
pub mod validate;

pub use codec::{load, merge, save, split, transform};
pub use locator::{PackageLocation, locate};
pub use package::{Attachment, Package};
pub use staging::Replace;
