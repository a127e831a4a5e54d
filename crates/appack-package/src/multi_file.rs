//! Multi-file encoding: a directory with one file per component document.
//!
//! Every other regular file below the root is an attachment, keyed by its
//! `/`-separated path relative to the root.

use std::path::Path;

use walkdir::WalkDir;

use appack_common::constants::COMPONENT_FILE_NAMES;
use appack_common::error::{AppError, Result};
use appack_common::types::Encoding;

use crate::codec::PackageCodec;
use crate::package::{Attachment, Package};
use crate::staging::StagedWrite;

/// Codec for package directories.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiFileCodec;

impl PackageCodec for MultiFileCodec {
    fn encoding(&self) -> Encoding {
        Encoding::MultiFile
    }

    fn decode(&self, path: &Path) -> Result<Package> {
        if !path.is_dir() {
            return Err(AppError::invalid_package(path, "not a directory"));
        }

        let [metadata, compose, parameters] = COMPONENT_FILE_NAMES.map(|name| read_component(path, name));
        let attachments = read_attachments(path)?;
        tracing::debug!(
            path = %path.display(),
            attachments = attachments.len(),
            "decoded multi-file package"
        );

        Package::from_documents(
            path,
            metadata?,
            compose?,
            parameters?,
            attachments,
            Encoding::MultiFile,
        )
    }

    fn stage(&self, package: &Package, dest: &Path) -> Result<StagedWrite> {
        let staged = StagedWrite::dir(dest)?;
        for (name, text) in package.documents() {
            staged.write(name, text.as_bytes())?;
        }
        for attachment in package.attachments() {
            staged.write(&attachment.path, &attachment.bytes)?;
        }
        Ok(staged)
    }
}

fn read_component(root: &Path, name: &str) -> Result<String> {
    let path = root.join(name);
    if !path.is_file() {
        return Err(AppError::invalid_package(root, format!("missing {name}")));
    }
    let bytes = std::fs::read(&path).map_err(|e| AppError::io(&path, e))?;
    String::from_utf8(bytes)
        .map_err(|_| AppError::invalid_package(root, format!("{name} is not valid UTF-8")))
}

fn read_attachments(root: &Path) -> Result<Vec<Attachment>> {
    let mut attachments = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            AppError::io(&path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let key = parts.join("/");
        if parts.len() == 1 && COMPONENT_FILE_NAMES.contains(&key.as_str()) {
            continue;
        }
        let bytes = std::fs::read(entry.path()).map_err(|e| AppError::io(entry.path(), e))?;
        attachments.push(Attachment::new(root, key, bytes)?);
    }
    Ok(attachments)
}
