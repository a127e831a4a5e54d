//! The encoding-agnostic package model.

use std::path::Path;

use appack_common::constants::{
    COMPOSE_FILE_NAME, COMPONENT_FILE_NAMES, METADATA_FILE_NAME, PARAMETERS_FILE_NAME,
};
use appack_common::error::{AppError, Result};
use appack_common::types::{Encoding, Metadata};
use appack_compose::ComposeTemplate;
use appack_params::ParameterSchema;

use crate::digest::ContentDigest;

/// A non-component file shipped with a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Path relative to the package root, `/`-separated.
    pub path: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment after checking its path.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidPackageFormat`] if the path is empty,
    /// absolute, escapes the package root, or names a component document.
    pub fn new(origin: &Path, path: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let path = path.into();
        check_attachment_path(origin, &path)?;
        Ok(Self { path, bytes })
    }

    /// Size of the contents in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

fn check_attachment_path(origin: &Path, path: &str) -> Result<()> {
    let bad = |reason: &str| AppError::invalid_package(origin, format!("attachment \"{path}\": {reason}"));
    if path.is_empty() {
        return Err(bad("empty path"));
    }
    if path.starts_with('/') || path.contains('\\') {
        return Err(bad("path must be relative and '/'-separated"));
    }
    if path.split('/').any(|part| part.is_empty() || part == "." || part == "..") {
        return Err(bad("path must not contain empty, '.' or '..' segments"));
    }
    if COMPONENT_FILE_NAMES.contains(&path) {
        return Err(bad("path collides with a component document"));
    }
    Ok(())
}

/// An application package: metadata, compose template, parameter schema,
/// and attachments, in one of two on-disk encodings.
///
/// The three component documents keep their exact text so that encoding
/// transforms are lossless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    metadata_text: String,
    metadata: Metadata,
    compose: ComposeTemplate,
    parameters_text: String,
    parameters: ParameterSchema,
    attachments: Vec<Attachment>,
    encoding: Encoding,
}

impl Package {
    /// Builds a package from its component documents.
    ///
    /// Attachments are sorted by path. `origin` only labels errors.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidPackageFormat`] if a document cannot be
    /// parsed or two attachments share a path.
    pub fn from_documents(
        origin: &Path,
        metadata_text: String,
        compose_text: String,
        parameters_text: String,
        mut attachments: Vec<Attachment>,
        encoding: Encoding,
    ) -> Result<Self> {
        let metadata = Metadata::from_yaml(&metadata_text).map_err(|e| {
            AppError::invalid_package(origin, format!("{METADATA_FILE_NAME}: {e}"))
        })?;
        let parameters = ParameterSchema::from_yaml(PARAMETERS_FILE_NAME, &parameters_text)
            .map_err(|e| AppError::invalid_package(origin, e.to_string()))?;

        attachments.sort_by(|a, b| a.path.cmp(&b.path));
        if let Some(pair) = attachments.windows(2).find(|w| w[0].path == w[1].path) {
            return Err(AppError::invalid_package(
                origin,
                format!("duplicate attachment \"{}\"", pair[0].path),
            ));
        }

        Ok(Self {
            metadata_text,
            metadata,
            compose: ComposeTemplate::new(compose_text),
            parameters_text,
            parameters,
            attachments,
            encoding,
        })
    }

    /// Parsed metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Exact metadata document text.
    #[must_use]
    pub fn metadata_text(&self) -> &str {
        &self.metadata_text
    }

    /// The compose template.
    #[must_use]
    pub const fn compose(&self) -> &ComposeTemplate {
        &self.compose
    }

    /// The parameter schema.
    #[must_use]
    pub const fn parameters(&self) -> &ParameterSchema {
        &self.parameters
    }

    /// Exact parameters document text.
    #[must_use]
    pub fn parameters_text(&self) -> &str {
        &self.parameters_text
    }

    /// Attachments sorted by path.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Current encoding.
    #[must_use]
    pub const fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Application name from metadata.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// The three component documents as `(file name, text)`, in
    /// single-file order.
    #[must_use]
    pub fn documents(&self) -> [(&'static str, &str); 3] {
        [
            (METADATA_FILE_NAME, self.metadata_text.as_str()),
            (COMPOSE_FILE_NAME, self.compose.as_str()),
            (PARAMETERS_FILE_NAME, self.parameters_text.as_str()),
        ]
    }

    /// The same package in another encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Digest of the package payload, independent of its encoding.
    #[must_use]
    pub fn digest(&self) -> ContentDigest {
        ContentDigest::of_package(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> &'static Path {
        Path::new("test.dockerapp")
    }

    fn package(attachments: Vec<Attachment>) -> Result<Package> {
        Package::from_documents(
            origin(),
            "version: 0.1.0\nname: demo\n".into(),
            "services: {}\n".into(),
            "port: 80\n".into(),
            attachments,
            Encoding::MultiFile,
        )
    }

    #[test]
    fn from_documents_parses_components() {
        let pkg = package(Vec::new()).expect("package");
        assert_eq!(pkg.name(), "demo");
        assert_eq!(pkg.parameters().get_string("port").as_deref(), Some("80"));
        assert_eq!(pkg.compose().as_str(), "services: {}\n");
    }

    #[test]
    fn attachments_are_sorted() {
        let pkg = package(vec![
            Attachment::new(origin(), "z.txt", b"z".to_vec()).expect("z"),
            Attachment::new(origin(), "a/b.txt", b"b".to_vec()).expect("b"),
        ])
        .expect("package");
        let paths: Vec<_> = pkg.attachments().iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["a/b.txt", "z.txt"]);
    }

    #[test]
    fn duplicate_attachment_rejected() {
        let err = package(vec![
            Attachment::new(origin(), "a.txt", b"1".to_vec()).expect("a"),
            Attachment::new(origin(), "a.txt", b"2".to_vec()).expect("a"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate attachment"), "got: {err}");
    }

    #[test]
    fn attachment_path_rules() {
        assert!(Attachment::new(origin(), "config/nginx.conf", Vec::new()).is_ok());
        for bad in ["", "/etc/passwd", "../x", "a//b", "a/./b", "metadata.yml", "a\\b"] {
            assert!(
                Attachment::new(origin(), bad, Vec::new()).is_err(),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn explicit_document_markers_are_kept() {
        let pkg = Package::from_documents(
            origin(),
            "---\nname: demo\n".into(),
            "---\nservices: {}\n".into(),
            "---\nport: 80\n".into(),
            Vec::new(),
            Encoding::MultiFile,
        )
        .expect("package");
        assert_eq!(pkg.name(), "demo");
        assert_eq!(pkg.compose().as_str(), "---\nservices: {}\n");
        assert_eq!(pkg.parameters().get_string("port").as_deref(), Some("80"));
    }

    #[test]
    fn bad_parameters_rejected() {
        let err = Package::from_documents(
            origin(),
            "name: demo\n".into(),
            String::new(),
            "nested:\n  key: value\n".into(),
            Vec::new(),
            Encoding::MultiFile,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidPackageFormat { .. }));
    }

    #[test]
    fn with_encoding_keeps_payload() {
        let pkg = package(Vec::new()).expect("package");
        let merged = pkg.clone().with_encoding(Encoding::SingleFile);
        assert_eq!(merged.encoding(), Encoding::SingleFile);
        assert_eq!(merged.digest(), pkg.digest());
    }
}
