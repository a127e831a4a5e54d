//! SHA-256 content digest of a package payload.
//!
//! The digest covers the component documents and attachments but not the
//! encoding, so the same package hashes identically as a single file and as
//! a directory. Component documents are hashed with a trailing newline
//! ensured, matching the single-file framing.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::package::Package;

/// Hex-encoded SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Computes the digest of a package.
    #[must_use]
    pub fn of_package(package: &Package) -> Self {
        let mut hasher = Sha256::new();
        for (name, text) in package.documents() {
            let text = framed(text);
            update_entry(&mut hasher, name, text.as_bytes());
        }
        for attachment in package.attachments() {
            update_entry(&mut hasher, &attachment.path, &attachment.bytes);
        }
        let digest = Self(format!("{:x}", hasher.finalize()));
        tracing::debug!(digest = %digest, "computed package digest");
        digest
    }

    /// Returns the hex-encoded digest.
    #[must_use]
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha256:{}", self.0)
    }
}

/// Ensures a component document ends with a newline.
pub(crate) fn framed(text: &str) -> std::borrow::Cow<'_, str> {
    if text.is_empty() || text.ends_with('\n') {
        std::borrow::Cow::Borrowed(text)
    } else {
        std::borrow::Cow::Owned(format!("{text}\n"))
    }
}

fn update_entry(hasher: &mut Sha256, name: &str, bytes: &[u8]) {
    hasher.update((name.len() as u64).to_le_bytes());
    hasher.update(name.as_bytes());
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
