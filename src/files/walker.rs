use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::FileSystem;

/// Enumerates candidate files below user-supplied roots.
///
/// Files of a directory come before the contents of its subdirectories.
/// Link-like subdirectories are never entered, and neither is a directory
/// whose canonical path was already visited during the same walk. A file
/// reached through more than one root is listed once.
pub struct FileTreeWalker<'a> {
    fs: &'a dyn FileSystem,
    recursive: bool,
}

/// Progress shared by every root of one walk
#[derive(Default)]
struct WalkState {
    visited_dirs: HashSet<PathBuf>,
    seen_files: HashSet<PathBuf>,
    files: Vec<PathBuf>,
}

impl<'a> FileTreeWalker<'a> {
    pub fn new(fs: &'a dyn FileSystem, recursive: bool) -> Self {
        Self { fs, recursive }
    }

    /// Walk every root in order and concatenate the results.
    pub fn walk_all<I, P>(&self, roots: I) -> Vec<PathBuf>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut state = WalkState::default();
        for root in roots {
            self.walk_root(root.as_ref(), &mut state);
        }
        state.files
    }

    pub fn walk(&self, root: &Path) -> Vec<PathBuf> {
        self.walk_all([root])
    }

    fn walk_root(&self, root: &Path, state: &mut WalkState) {
        if self.fs.is_file(root) {
            self.add_file(root.to_path_buf(), state);
            return;
        }

        if !self.fs.is_dir(root) {
            warn!("Skipping {}: no such file or directory", root.display());
            return;
        }

        let before = state.files.len();
        self.walk_dir(root, state);
        debug!("Found {} files under {}", state.files.len() - before, root.display());
    }

    fn walk_dir(&self, dir: &Path, state: &mut WalkState) {
        if !state.visited_dirs.insert(self.identity(dir)) {
            debug!("Already visited {}, skipping", dir.display());
            return;
        }

        let listing = match self.fs.list_dir(dir) {
            Ok(listing) => listing,
            Err(e) => {
                warn!("{}", e);
                return;
            }
        };

        for file in listing.files {
            self.add_file(file, state);
        }

        if !self.recursive {
            return;
        }

        for subdir in listing.dirs {
            if self.fs.is_link_like(&subdir) {
                debug!("Not following link-like directory {}", subdir.display());
                continue;
            }
            self.walk_dir(&subdir, state);
        }
    }

    fn add_file(&self, file: PathBuf, state: &mut WalkState) {
        if state.seen_files.insert(self.entry_identity(&file)) {
            state.files.push(file);
        } else {
            debug!("Already listed {}, skipping", file.display());
        }
    }

    fn identity(&self, path: &Path) -> PathBuf {
        self.fs
            .canonicalize(path)
            .unwrap_or_else(|_| path.to_path_buf())
    }

    /// Canonical parent plus the entry's own name, so a link is not confused with its target
    fn entry_identity(&self, path: &Path) -> PathBuf {
        match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
                self.identity(parent).join(name)
            }
            (Some(_), Some(name)) => self.identity(Path::new(".")).join(name),
            _ => self.identity(path),
        }
    }
}
