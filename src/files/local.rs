use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{DirListing, FileSystem};
use crate::error::{Result, TranslitError};

/// File system implementation backed by the local disk
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, dir: &Path) -> Result<DirListing> {
        let mut listing = DirListing::default();

        let entries = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false);

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(TranslitError::FileAccess(format!(
                        "Failed to list {}: {}",
                        dir.display(),
                        e
                    )));
                }
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_file() {
                listing.files.push(entry.into_path());
            } else if file_type.is_dir() {
                listing.dirs.push(entry.into_path());
            } else if file_type.is_symlink() {
                // Classify links by their target; dangling links are dropped
                match fs::metadata(entry.path()) {
                    Ok(meta) if meta.is_file() => listing.files.push(entry.into_path()),
                    Ok(meta) if meta.is_dir() => listing.dirs.push(entry.into_path()),
                    Ok(_) => {}
                    Err(e) => debug!("Ignoring dangling link {}: {}", entry.path().display(), e),
                }
            }
        }

        Ok(listing)
    }

    fn is_link_like(&self, path: &Path) -> bool {
        match fs::symlink_metadata(path) {
            Ok(meta) => meta.file_type().is_symlink() || is_reparse_point(&meta),
            Err(_) => false,
        }
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).map_err(|e| {
            TranslitError::FileAccess(format!("Failed to resolve {}: {}", path.display(), e))
        })
    }

    fn move_file(&self, src: &Path, dst: &Path) -> Result<()> {
        if src == dst {
            return Ok(());
        }

        let destination_exists =
            || TranslitError::FileAccess(format!("Destination already exists: {}", dst.display()));
        let move_failed = |e: io::Error| {
            TranslitError::FileAccess(format!(
                "Failed to move {} to {}: {}",
                src.display(),
                dst.display(),
                e
            ))
        };

        if self.exists(dst) {
            if !same_file(src, dst) {
                return Err(destination_exists());
            }
            // Case-only rename: the new name already resolves to this file
            debug!("Renaming {} -> {} in place", src.display(), dst.display());
            return fs::rename(src, dst).map_err(move_failed);
        }

        debug!("Moving {} -> {}", src.display(), dst.display());
        match move_no_replace(src, dst) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(destination_exists()),
            Err(e) => Err(move_failed(e)),
        }
    }
}

/// Move `src` to `dst`, failing with `AlreadyExists` rather than replacing an
/// entry that appears at `dst` in the meantime.
///
/// The file is linked under the new name first, which cannot replace anything,
/// and the old name is dropped afterwards. Volumes without hard links get a
/// plain rename.
fn move_no_replace(src: &Path, dst: &Path) -> io::Result<()> {
    match fs::hard_link(src, dst) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Err(e),
        Err(e) => {
            debug!("Cannot hard link {}: {}, renaming instead", src.display(), e);
            return fs::rename(src, dst);
        }
    }

    if let Err(e) = fs::remove_file(src) {
        let _ = fs::remove_file(dst);
        return Err(e);
    }
    Ok(())
}

#[cfg(windows)]
fn is_reparse_point(meta: &Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;

    const FILE_ATTRIBUTE_REPARSE_POINT: u32 = 0x400;
    meta.file_attributes() & FILE_ATTRIBUTE_REPARSE_POINT != 0
}

#[cfg(not(windows))]
fn is_reparse_point(_meta: &Metadata) -> bool {
    false
}

/// Both paths name the same file, e.g. a case-only rename on a case-insensitive volume.
#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => {
            a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
        }
        _ => false,
    }
}
