//! Interfaces to collaborators outside this crate.
//!
//! Building a distributable bundle and deploying it are done elsewhere; the
//! package core only hands them a rendered document and resolved
//! parameters.

use appack_common::error::Result;
use appack_common::types::Metadata;
use appack_params::ResolvedParameters;

use crate::digest::ContentDigest;

/// Input of a bundle build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    /// Package metadata.
    pub metadata: Metadata,
    /// The rendered compose document.
    pub rendered: Vec<u8>,
    /// Digest of the package the document was rendered from.
    pub digest: ContentDigest,
}

/// Opaque reference to a built bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BundleReference(pub String);

/// Status of an installed application as reported by an orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationStatus {
    /// Installation name.
    pub name: String,
    /// Free-form status lines.
    pub details: Vec<String>,
}

/// Builds distributable bundles from rendered packages.
pub trait BundleBuilder {
    /// Builds a bundle.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundle cannot be built.
    fn build(&self, request: &BundleRequest) -> Result<BundleReference>;
}

/// Installs bundles into a target environment.
pub trait Orchestrator {
    /// Installs a bundle under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if installation fails.
    fn install(
        &self,
        name: &str,
        bundle: &BundleReference,
        params: &ResolvedParameters,
    ) -> Result<()>;

    /// Upgrades an installation to a new bundle or parameter set.
    ///
    /// # Errors
    ///
    /// Returns an error if the upgrade fails.
    fn upgrade(
        &self,
        name: &str,
        bundle: &BundleReference,
        params: &ResolvedParameters,
    ) -> Result<()>;

    /// Reports the status of an installation.
    ///
    /// # Errors
    ///
    /// Returns an error if the status cannot be queried.
    fn status(&self, name: &str) -> Result<InstallationStatus>;

    /// Removes an installation.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn uninstall(&self, name: &str) -> Result<()>;
}

/// Builds a bundle request for a package rendered with `params`.
///
/// # Errors
///
/// Returns an error if the template cannot be rendered.
pub fn bundle_request(
    package: &crate::package::Package,
    params: &ResolvedParameters,
    env: &appack_params::Environment,
) -> Result<BundleRequest> {
    let rendered = appack_compose::render(
        package.compose(),
        params,
        env,
        appack_common::types::OutputFormat::Yaml,
    )?;
    Ok(BundleRequest {
        metadata: package.metadata().clone(),
        rendered: rendered.bytes,
        digest: package.digest(),
    })
}
