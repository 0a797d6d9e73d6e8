// File system access
//
// This module isolates every touch of the disk the engine needs:
// - Local: std::fs / walkdir backed implementation
// - Walker: candidate enumeration over a FileSystem

pub mod local;
pub mod walker;

use std::path::{Path, PathBuf};

pub use local::*;
pub use walker::*;

use crate::error::Result;

/// Immediate entries of one directory. Links are classified by their target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    pub files: Vec<PathBuf>,
    pub dirs: Vec<PathBuf>,
}

/// File system operations used by the walker and the per-file processor
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem: Send + Sync {
    /// Check if anything exists at the path
    fn exists(&self, path: &Path) -> bool;

    /// Check if the path is a file (following links)
    fn is_file(&self, path: &Path) -> bool;

    /// Check if the path is a directory (following links)
    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate entries of a directory, in listing order
    fn list_dir(&self, dir: &Path) -> Result<DirListing>;

    /// Check if the entry redirects elsewhere (symlink, junction, reparse point)
    fn is_link_like(&self, path: &Path) -> bool;

    /// Resolve a path to its canonical form
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    /// Move a file, refusing to replace a different existing file
    fn move_file(&self, src: &Path, dst: &Path) -> Result<()>;
}

/// Factory for creating file system instances
pub struct FileSystemFactory;

impl FileSystemFactory {
    /// Create the default file system implementation (local disk)
    pub fn create_default() -> Box<dyn FileSystem> {
        Box::new(local::LocalFileSystem::new())
    }
}
