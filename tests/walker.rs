//! File tree walking against a real directory tree

use std::path::PathBuf;

use assert_fs::TempDir;
use assert_fs::prelude::*;

use tagtranslit::files::{FileTreeWalker, LocalFileSystem};

fn sorted(mut files: Vec<PathBuf>) -> Vec<PathBuf> {
    files.sort();
    files
}

/// D/{f1.mp3, f2.mp3, S/f3.mp3}
fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    dir.child("f1.mp3").touch().unwrap();
    dir.child("f2.mp3").touch().unwrap();
    dir.child("S").child("f3.mp3").touch().unwrap();
    dir
}

#[test]
fn test_non_recursive_lists_immediate_files() {
    let dir = fixture();
    let fs = LocalFileSystem::new();

    let files = FileTreeWalker::new(&fs, false).walk(dir.path());
    assert_eq!(
        sorted(files),
        vec![dir.child("f1.mp3").to_path_buf(), dir.child("f2.mp3").to_path_buf()]
    );
}

#[test]
fn test_recursive_descends_after_own_files() {
    let dir = fixture();
    let fs = LocalFileSystem::new();

    let files = FileTreeWalker::new(&fs, true).walk(dir.path());
    assert_eq!(files.len(), 3);

    // Files of the root come before the contents of its subdirectories
    assert_eq!(files[2], dir.child("S").child("f3.mp3").to_path_buf());
    assert_eq!(
        sorted(files[..2].to_vec()),
        vec![dir.child("f1.mp3").to_path_buf(), dir.child("f2.mp3").to_path_buf()]
    );
}

#[test]
fn test_nested_levels() {
    let dir = TempDir::new().unwrap();
    dir.child("a").child("b").child("c").child("deep.mp3").touch().unwrap();
    dir.child("a").child("mid.mp3").touch().unwrap();
    let fs = LocalFileSystem::new();

    let files = FileTreeWalker::new(&fs, true).walk(dir.path());
    assert_eq!(
        files,
        vec![
            dir.child("a").child("mid.mp3").to_path_buf(),
            dir.child("a").child("b").child("c").child("deep.mp3").to_path_buf(),
        ]
    );
}

#[test]
fn test_file_root() {
    let dir = fixture();
    let fs = LocalFileSystem::new();
    let file = dir.child("f1.mp3");

    assert_eq!(FileTreeWalker::new(&fs, true).walk(file.path()), vec![file.to_path_buf()]);
}

#[test]
fn test_missing_root_is_empty() {
    let dir = TempDir::new().unwrap();
    let fs = LocalFileSystem::new();

    assert!(FileTreeWalker::new(&fs, true).walk(&dir.path().join("nope")).is_empty());
}

#[test]
fn test_walk_all_keeps_argument_order() {
    let dir = fixture();
    let fs = LocalFileSystem::new();
    let f2 = dir.child("f2.mp3").to_path_buf();
    let f1 = dir.child("f1.mp3").to_path_buf();

    let files = FileTreeWalker::new(&fs, false).walk_all([&f2, &f1]);
    assert_eq!(files, vec![f2, f1]);
}

#[test]
fn test_overlapping_roots_are_listed_once() {
    let dir = fixture();
    let fs = LocalFileSystem::new();
    let sub = dir.child("S").to_path_buf();

    let files = FileTreeWalker::new(&fs, true).walk_all([dir.path(), sub.as_path()]);
    assert_eq!(files.len(), 3);
    assert_eq!(files[2], dir.child("S").child("f3.mp3").to_path_buf());
}

#[test]
fn test_same_file_through_two_paths_is_listed_once() {
    let dir = fixture();
    let fs = LocalFileSystem::new();
    let direct = dir.child("f1.mp3").to_path_buf();
    let roundabout = dir.path().join("S").join("..").join("f1.mp3");

    let files = FileTreeWalker::new(&fs, false).walk_all([&direct, &roundabout, &direct]);
    assert_eq!(files, vec![direct]);
}

#[cfg(unix)]
#[test]
fn test_linked_directory_is_not_followed() {
    let dir = TempDir::new().unwrap();
    dir.child("f1.mp3").touch().unwrap();
    dir.child("f2.mp3").touch().unwrap();

    let outside = TempDir::new().unwrap();
    outside.child("f3.mp3").touch().unwrap();
    std::os::unix::fs::symlink(outside.path(), dir.path().join("S")).unwrap();

    let fs = LocalFileSystem::new();
    let files = FileTreeWalker::new(&fs, true).walk(dir.path());
    assert_eq!(
        sorted(files),
        vec![dir.child("f1.mp3").to_path_buf(), dir.child("f2.mp3").to_path_buf()]
    );
}

#[cfg(unix)]
#[test]
fn test_link_cycle_terminates() {
    let dir = TempDir::new().unwrap();
    dir.child("sub").child("song.mp3").touch().unwrap();
    std::os::unix::fs::symlink(dir.path(), dir.path().join("sub").join("back")).unwrap();

    let fs = LocalFileSystem::new();
    let files = FileTreeWalker::new(&fs, true).walk(dir.path());
    assert_eq!(files, vec![dir.child("sub").child("song.mp3").to_path_buf()]);
}
