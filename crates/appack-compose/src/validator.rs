//! Structural checks on a rendered compose file.
//!
//! Checks for a missing `services` section, services without an image, and
//! `depends_on` references that are undefined or cyclic.

use appack_common::error::{AppError, Result};

use crate::graph::ServiceGraph;
use crate::model::ComposeFile;

/// Validates a parsed compose file for structural correctness.
///
/// # Checks performed
///
/// 1. The file declares a `services` section.
/// 2. Every service declares an `image`.
/// 3. Every `depends_on` entry names a declared service.
/// 4. Service dependencies are acyclic.
///
/// # Errors
///
/// Returns [`AppError::MalformedCompose`] for the first failed check.
pub fn validate(file: &ComposeFile) -> Result<()> {
    tracing::debug!(services = file.services.len(), "validating compose structure");
    check_services_declared(file)?;
    check_image_required(file)?;
    let _ = ServiceGraph::from_compose(file)?.start_order()?;
    Ok(())
}

fn check_services_declared(file: &ComposeFile) -> Result<()> {
    if file.declares_services {
        Ok(())
    } else {
        Err(AppError::MalformedCompose {
            reason: "no services section".into(),
        })
    }
}

fn check_image_required(file: &ComposeFile) -> Result<()> {
    for (name, service) in &file.services {
        if service.image.as_deref().is_none_or(str::is_empty) {
            return Err(AppError::MalformedCompose {
                reason: format!("service \"{name}\" has no image"),
            });
        }
    }
    Ok(())
}
