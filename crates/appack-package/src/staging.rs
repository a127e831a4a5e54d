//! Staged writes committed with a rename.
//!
//! Output is first written into a temporary sibling of the destination and
//! only moved into place once complete. Replacing an existing package moves
//! it aside first and puts it back if the final rename fails. Temporary
//! files and directories are removed on drop.

use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempDir};

use appack_common::error::{AppError, Result};

const STAGING_PREFIX: &str = ".appack-staging-";
const BACKUP_PREFIX: &str = ".appack-backup-";

/// What to do when the destination already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replace {
    /// Fail with [`AppError::DestinationExists`].
    Never,
    /// Replace the destination.
    Always,
}

impl Replace {
    /// `Always` if `overwrite` is set.
    #[must_use]
    pub const fn from_flag(overwrite: bool) -> Self {
        if overwrite { Self::Always } else { Self::Never }
    }
}

#[derive(Debug)]
enum Staged {
    File(NamedTempFile),
    Dir(TempDir),
}

/// Output staged next to its destination.
#[derive(Debug)]
pub struct StagedWrite {
    staged: Staged,
}

impl StagedWrite {
    /// Stages a single file holding `bytes`.
    ///
    /// The file gets the same permissions as one created with
    /// [`std::fs::write`], so the umask applies.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created or written.
    pub fn file(dest: &Path, bytes: &[u8]) -> Result<Self> {
        use std::io::Write;

        let parent = parent_dir(dest);
        let mut builder = tempfile::Builder::new();
        let _ = builder.prefix(STAGING_PREFIX);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt as _;
            let _ = builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let mut file = builder
            .tempfile_in(&parent)
            .map_err(|e| AppError::io(&parent, e))?;
        let path = file.path().to_path_buf();
        file.write_all(bytes).map_err(|e| AppError::io(&path, e))?;
        Ok(Self {
            staged: Staged::File(file),
        })
    }

    /// Stages an empty directory to be filled through [`StagedWrite::write`].
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn dir(dest: &Path) -> Result<Self> {
        let parent = parent_dir(dest);
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&parent)
            .map_err(|e| AppError::io(&parent, e))?;
        Ok(Self {
            staged: Staged::Dir(dir),
        })
    }

    /// Path of the staged file or directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        match &self.staged {
            Staged::File(file) => file.path(),
            Staged::Dir(dir) => dir.path(),
        }
    }

    /// Writes `bytes` to `relative` inside a staged directory, creating
    /// parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if this is a staged file or the write fails.
    pub fn write(&self, relative: &str, bytes: &[u8]) -> Result<()> {
        let Staged::Dir(dir) = &self.staged else {
            return Err(AppError::io(
                self.path(),
                std::io::Error::other("cannot add entries to a staged file"),
            ));
        };
        let target = relative
            .split('/')
            .fold(dir.path().to_path_buf(), |acc, part| acc.join(part));
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
        }
        std::fs::write(&target, bytes).map_err(|e| AppError::io(&target, e))
    }

    /// Moves the staged output to `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DestinationExists`] if `dest` exists and
    /// `replace` is [`Replace::Never`], or an I/O error if a rename fails.
    /// On failure `dest` is left as it was.
    pub fn commit(self, dest: &Path, replace: Replace) -> Result<()> {
        let exists = dest.symlink_metadata().is_ok();
        if exists && replace == Replace::Never {
            return Err(AppError::DestinationExists {
                path: dest.to_path_buf(),
            });
        }

        let backup = if exists {
            Some(move_aside(dest)?)
        } else {
            None
        };

        match self.rename_into(dest) {
            Ok(()) => {
                tracing::debug!(path = %dest.display(), "committed staged write");
                // Dropping the backup directory deletes the previous package.
                drop(backup);
                Ok(())
            }
            Err(e) => {
                if let Some((holder, previous)) = backup {
                    if let Err(restore) = std::fs::rename(&previous, dest) {
                        let kept = holder.keep();
                        tracing::error!(
                            path = %dest.display(),
                            backup = %kept.display(),
                            error = %restore,
                            "failed to restore previous package"
                        );
                    }
                }
                Err(e)
            }
        }
    }

    fn rename_into(self, dest: &Path) -> Result<()> {
        match self.staged {
            Staged::File(file) => {
                let _ = file.persist(dest).map_err(|e| AppError::io(dest, e.error))?;
                Ok(())
            }
            Staged::Dir(dir) => {
                // After the rename the TempDir guard points at a missing path,
                // and its cleanup on drop is a no-op.
                std::fs::rename(dir.path(), dest).map_err(|e| AppError::io(dest, e))
            }
        }
    }
}

/// Moves `dest` into a fresh backup directory, returning the guard and the
/// moved path.
fn move_aside(dest: &Path) -> Result<(TempDir, PathBuf)> {
    let parent = parent_dir(dest);
    let holder = tempfile::Builder::new()
        .prefix(BACKUP_PREFIX)
        .tempdir_in(&parent)
        .map_err(|e| AppError::io(&parent, e))?;
    let previous = holder.path().join("previous");
    std::fs::rename(dest, &previous).map_err(|e| AppError::io(dest, e))?;
    Ok((holder, previous))
}

fn parent_dir(dest: &Path) -> PathBuf {
    match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
