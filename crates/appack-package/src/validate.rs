//! Strict validation of a package.
//!
//! Unlike `render`, which passes unfilled references through, validation
//! treats them as errors. Every check runs; the report collects all
//! problems found.

use appack_common::error::{AppError, Result};
use appack_common::types::Metadata;
use appack_compose::ComposeFile;
use appack_params::{Environment, ParameterSources, resolve};

use crate::package::Package;

/// Outcome of validating a package.
#[derive(Debug, Default)]
pub struct ValidationReport {
    problems: Vec<AppError>,
}

impl ValidationReport {
    /// Returns `true` if no problem was found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }

    /// Problems in the order they were found.
    #[must_use]
    pub fn problems(&self) -> &[AppError] {
        &self.problems
    }

    /// Converts the report into a result carrying the first problem.
    ///
    /// # Errors
    ///
    /// Returns the first problem if the package is invalid.
    pub fn into_result(self) -> Result<()> {
        match self.problems.into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }
}

/// Validates metadata, parameters, and the rendered compose structure.
#[must_use]
pub fn validate_package(
    package: &Package,
    sources: &ParameterSources,
    env: &Environment,
) -> ValidationReport {
    let mut problems = check_metadata(package.metadata());

    let params = resolve(sources);
    let interpolation = package.compose().interpolate(&params, env);
    if !interpolation.unfilled.is_empty() {
        problems.push(AppError::UnfilledParameters {
            names: interpolation.unfilled.clone(),
        });
    }

    if let Err(e) =
        ComposeFile::parse(&interpolation.text).and_then(|file| appack_compose::validator::validate(&file))
    {
        problems.push(e);
    }

    tracing::info!(
        app = %package.name(),
        problems = problems.len(),
        "validated package"
    );
    ValidationReport { problems }
}

fn check_metadata(metadata: &Metadata) -> Vec<AppError> {
    let violation = |field: String, reason: &str| AppError::SchemaViolation {
        field,
        reason: reason.to_string(),
    };
    let mut problems: Vec<AppError> = metadata
        .problems
        .iter()
        .map(|p| violation(p.field.clone(), &p.reason))
        .collect();

    if metadata.name.trim().is_empty() && !metadata.has_problem("metadata.name") {
        problems.push(violation("metadata.name".into(), "must not be empty"));
    }
    let version = (!metadata.has_problem("metadata.version"))
        .then(|| semver::Version::parse(&metadata.version));
    if let Some(Err(e)) = version {
        problems.push(violation(
            "metadata.version".into(),
            &format!("\"{}\" is not a semantic version ({e})", metadata.version),
        ));
    }
    for (i, maintainer) in metadata.maintainers.iter().enumerate() {
        let name_field = format!("metadata.maintainers[{i}].name");
        if maintainer.name.trim().is_empty() && !metadata.has_problem(&name_field) {
            problems.push(violation(name_field, "must not be empty"));
        }
        if !maintainer.email.is_empty() && !is_plausible_email(&maintainer.email) {
            problems.push(violation(
                format!("metadata.maintainers[{i}].email"),
                "is not an email address",
            ));
        }
    }
    problems
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
