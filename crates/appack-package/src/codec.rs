//! Encoding transforms and the codec seam.
//!
//! A [`PackageCodec`] reads and stages one on-disk encoding. `merge` and
//! `split` only change which codec a package is written with; the payload
//! is untouched, so the transforms are lossless up to single-file framing.

use std::path::{Path, PathBuf};

use appack_common::error::Result;
use appack_common::types::Encoding;

use crate::locator::PackageLocation;
use crate::multi_file::MultiFileCodec;
use crate::package::Package;
use crate::single_file::SingleFileCodec;
use crate::staging::{Replace, StagedWrite};

/// Reads and writes one on-disk encoding of a package.
pub trait PackageCodec {
    /// Encoding handled by this codec.
    fn encoding(&self) -> Encoding;

    /// Loads the package stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the package cannot be read or is corrupt.
    fn decode(&self, path: &Path) -> Result<Package>;

    /// Stages `package` for writing to `dest` without touching `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if staging fails.
    fn stage(&self, package: &Package, dest: &Path) -> Result<StagedWrite>;
}

/// Returns the codec for `encoding`.
#[must_use]
pub fn codec_for(encoding: Encoding) -> &'static dyn PackageCodec {
    match encoding {
        Encoding::SingleFile => &SingleFileCodec,
        Encoding::MultiFile => &MultiFileCodec,
    }
}

/// Converts a package to the single-file encoding.
#[must_use]
pub fn merge(package: Package) -> Package {
    package.with_encoding(Encoding::SingleFile)
}

/// Converts a package to the multi-file encoding.
#[must_use]
pub fn split(package: Package) -> Package {
    package.with_encoding(Encoding::MultiFile)
}

/// Loads a package stored at `path` in `encoding`.
///
/// # Errors
///
/// Returns an error if the package cannot be read or is corrupt.
pub fn load(path: &Path, encoding: Encoding) -> Result<Package> {
    tracing::debug!(path = %path.display(), %encoding, "loading package");
    codec_for(encoding).decode(path)
}

/// Writes `package` to `dest` in its own encoding through a staged commit.
///
/// # Errors
///
/// Returns [`appack_common::error::AppError::DestinationExists`] if `dest`
/// exists and `replace` is [`Replace::Never`], or an error if staging or
/// committing fails.
pub fn save(package: &Package, dest: &Path, replace: Replace) -> Result<()> {
    let staged = codec_for(package.encoding()).stage(package, dest)?;
    staged.commit(dest, replace)?;
    tracing::info!(path = %dest.display(), encoding = %package.encoding(), "wrote package");
    Ok(())
}

/// Loads the package at `location` and writes it in `target` encoding.
///
/// With no `output` the package is converted in place, replacing the
/// original. Converting in place into the encoding it already has is a
/// no-op. Returns the path written.
///
/// # Errors
///
/// Returns [`appack_common::error::AppError::DestinationExists`] if `output`
/// exists and `replace` is [`Replace::Never`], or an error if loading or
/// writing fails.
pub fn transform(
    location: &PackageLocation,
    output: Option<&Path>,
    replace: Replace,
    target: Encoding,
) -> Result<PathBuf> {
    let package = load(&location.path, location.encoding)?;
    let dest = output.map_or_else(|| location.path.clone(), Path::to_path_buf);
    let in_place = same_path(&dest, &location.path);

    if in_place && package.encoding() == target {
        tracing::info!(path = %dest.display(), %target, "package already in target encoding");
        return Ok(dest);
    }

    let converted = match target {
        Encoding::SingleFile => merge(package),
        Encoding::MultiFile => split(package),
    };
    let replace = if in_place { Replace::Always } else { replace };
    save(&converted, &dest, replace)?;
    Ok(dest)
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
