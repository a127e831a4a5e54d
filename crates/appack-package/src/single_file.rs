//! Single-file encoding: YAML documents separated by `---` lines.
//!
//! Layout: metadata, compose template, parameters, then one document per
//! attachment. An attachment document is a mapping with an `attachment`
//! path, an `encoding` of `text` or `base64`, and the `content`.
//!
//! A component line that would read as a separator (`---`, including the
//! explicit YAML document-start marker) is written with one extra leading
//! backslash, as is any line already made of backslashes followed by `---`.
//! Decoding strips exactly one, so component text survives unchanged.

use std::borrow::Cow;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use appack_common::constants::DOCUMENT_SEPARATOR;
use appack_common::error::{AppError, Result};
use appack_common::types::Encoding;

use crate::codec::PackageCodec;
use crate::digest::framed;
use crate::package::{Attachment, Package};
use crate::staging::StagedWrite;

/// Codec for single-file packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleFileCodec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ContentEncoding {
    Text,
    Base64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct AttachmentDocument {
    attachment: String,
    encoding: ContentEncoding,
    content: String,
}

impl PackageCodec for SingleFileCodec {
    fn encoding(&self) -> Encoding {
        Encoding::SingleFile
    }

    fn decode(&self, path: &Path) -> Result<Package> {
        if !path.is_file() {
            return Err(AppError::invalid_package(path, "not a regular file"));
        }
        let bytes = std::fs::read(path).map_err(|e| AppError::io(path, e))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| AppError::invalid_package(path, "not valid UTF-8"))?;
        decode_str(path, &text)
    }

    fn stage(&self, package: &Package, dest: &Path) -> Result<StagedWrite> {
        let text = encode_to_string(package)?;
        StagedWrite::file(dest, text.as_bytes())
    }
}

/// Serializes a package to single-file text.
///
/// # Errors
///
/// Returns an error if an attachment document cannot be serialized.
pub fn encode_to_string(package: &Package) -> Result<String> {
    let mut docs: Vec<String> = package
        .documents()
        .iter()
        .map(|(_, text)| escape_separators(&framed(text)))
        .collect();
    for attachment in package.attachments() {
        let doc = match std::str::from_utf8(&attachment.bytes) {
            Ok(text) => AttachmentDocument {
                attachment: attachment.path.clone(),
                encoding: ContentEncoding::Text,
                content: text.to_string(),
            },
            Err(_) => AttachmentDocument {
                attachment: attachment.path.clone(),
                encoding: ContentEncoding::Base64,
                content: BASE64.encode(&attachment.bytes),
            },
        };
        let yaml = serde_yaml::to_string(&doc).map_err(|e| {
            AppError::invalid_package(
                Path::new(&attachment.path),
                format!("cannot encode attachment: {e}"),
            )
        })?;
        docs.push(yaml);
    }
    Ok(docs.join(&format!("{DOCUMENT_SEPARATOR}\n")))
}

/// Parses single-file text. `origin` labels errors.
///
/// # Errors
///
/// Returns [`AppError::InvalidPackageFormat`] if there are fewer than three
/// documents, a component document is invalid, or a trailing document is
/// not an attachment document.
pub fn decode_str(origin: &Path, text: &str) -> Result<Package> {
    let mut docs = split_documents(text).into_iter();
    let (Some(metadata), Some(compose), Some(parameters)) = (docs.next(), docs.next(), docs.next())
    else {
        return Err(AppError::invalid_package(
            origin,
            "expected at least three documents (metadata, compose, parameters)",
        ));
    };

    let attachments = docs
        .enumerate()
        .map(|(i, doc)| decode_attachment(origin, i + 4, &doc))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(
        path = %origin.display(),
        attachments = attachments.len(),
        "decoded single-file package"
    );

    Package::from_documents(
        origin,
        unescape_separators(&metadata),
        unescape_separators(&compose),
        unescape_separators(&parameters),
        attachments,
        Encoding::SingleFile,
    )
}

/// Splits text at lines that are exactly the document separator.
fn split_documents(text: &str) -> Vec<String> {
    let mut docs = vec![String::new()];
    for line in text.split_inclusive('\n') {
        if line.strip_suffix('\n').unwrap_or(line) == DOCUMENT_SEPARATOR {
            docs.push(String::new());
        } else if let Some(current) = docs.last_mut() {
            current.push_str(line);
        }
    }
    docs
}

/// Returns `true` for a line made of zero or more backslashes and `---`.
fn is_escapable(line: &str) -> bool {
    line.strip_suffix('\n')
        .unwrap_or(line)
        .trim_start_matches('\\')
        == DOCUMENT_SEPARATOR
}

fn escape_separators(text: &str) -> String {
    text.split_inclusive('\n')
        .map(|line| {
            if is_escapable(line) {
                Cow::Owned(format!("\\{line}"))
            } else {
                Cow::Borrowed(line)
            }
        })
        .collect()
}

fn unescape_separators(text: &str) -> String {
    text.split_inclusive('\n')
        .map(|line| match line.strip_prefix('\\') {
            Some(rest) if is_escapable(line) => rest,
            _ => line,
        })
        .collect()
}

fn decode_attachment(origin: &Path, index: usize, doc: &str) -> Result<Attachment> {
    let parsed: AttachmentDocument = serde_yaml::from_str(doc).map_err(|e| {
        AppError::invalid_package(
            origin,
            format!("document {index} is not an attachment document: {e}"),
        )
    })?;
    let bytes = match parsed.encoding {
        ContentEncoding::Text => parsed.content.into_bytes(),
        ContentEncoding::Base64 => BASE64.decode(parsed.content.trim()).map_err(|e| {
            AppError::invalid_package(
                origin,
                format!("attachment \"{}\": invalid base64: {e}", parsed.attachment),
            )
        })?,
    };
    Attachment::new(origin, parsed.attachment, bytes)
}
