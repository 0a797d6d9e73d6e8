//! Rename + retag runs over real files

use std::fs;
use std::path::{Path, PathBuf};

use assert_fs::TempDir;
use assert_fs::prelude::*;
use id3::{Tag, TagLike, Version};

use tagtranslit::error::ErrorKind;
use tagtranslit::map::TranslitMap;
use tagtranslit::recovery::EncodingRecovery;
use tagtranslit::transliterate::Transliterator;
use tagtranslit::workflow::{ProcessOptions, ProcessingOutcome, TranslitContext, Workflow};

const MAP: &str = r#"<Transliteration>
  <element from="а" to="a"/>
  <element from="б" to="b"/>
  <element from="с" to="s"/>
  <element from="е" to="e"/>
  <element from="н" to="n"/>
  <element from="я" to="a"/>
  <element from="П" to="P"/>
  <element from="А" to="A"/>
  <element from="л" to="l"/>
  <element from="о" to="o"/>
  <element from="м" to="m"/>
  <element from="К" to="K"/>
  <element from="и" to="i"/>
  <element from="С" to="S"/>
</Transliteration>"#;

fn workflow(options: ProcessOptions) -> Workflow {
    let map = TranslitMap::from_xml(MAP).unwrap();
    let context = TranslitContext::new(Transliterator::new(map, EncodingRecovery::default()), options);
    Workflow::with_defaults(context)
}

fn mp3_with_title(path: &Path, title: &str) {
    fs::write(path, b"\xFF\xFB\x90\x00audio").unwrap();
    let mut tag = Tag::new();
    tag.set_title(title);
    tag.write_to_path(path, Version::Id3v24).unwrap();
}

fn title_of(path: &Path) -> Option<String> {
    Tag::read_from_path(path)
        .ok()
        .and_then(|tag| tag.title().map(str::to_owned))
}

#[test]
fn test_song_is_renamed_and_retagged() {
    let dir = TempDir::new().unwrap();
    let song = dir.child("Песня.mp3");
    mp3_with_title(song.path(), "Альбом");

    let workflow = workflow(ProcessOptions::default());
    let files = workflow.collect_files(&[dir.path()]);
    let summary = workflow.process_files(&files);

    assert!(!summary.has_failures());
    let renamed = dir.child("Pesna.mp3");
    assert!(renamed.path().is_file());
    assert!(!song.path().exists());
    assert_eq!(title_of(renamed.path()).as_deref(), Some("Albom"));
}

#[test]
fn test_mojibake_tag_is_recovered() {
    let dir = TempDir::new().unwrap();
    let song = dir.child("track.mp3");
    // "Кино" written as windows-1251 and read back as windows-1252
    mp3_with_title(song.path(), "Êèíî");

    let workflow = workflow(ProcessOptions::default());
    let summary = workflow.process_files(&[song.to_path_buf()]);

    assert!(!summary.has_failures());
    assert_eq!(title_of(song.path()).as_deref(), Some("Kino"));
}

#[test]
fn test_id3v1_only_tag_is_recovered() {
    let dir = TempDir::new().unwrap();
    let song = dir.child("track.mp3");

    // "Кино" in windows-1251 inside a bare ID3v1 block
    let mut block = [0u8; 128];
    block[..3].copy_from_slice(b"TAG");
    block[3..7].copy_from_slice(b"\xCA\xE8\xED\xEE");
    block[127] = 0xFF;
    let mut bytes = b"\xFF\xFB\x90\x00audio".to_vec();
    bytes.extend_from_slice(&block);
    song.write_binary(&bytes).unwrap();

    let options = ProcessOptions {
        rename: false,
        ..ProcessOptions::default()
    };
    let summary = workflow(options).process_files(&[song.to_path_buf()]);

    assert!(!summary.has_failures());
    let tag = id3::v1v2::read_from_path(song.path()).unwrap();
    assert_eq!(tag.title(), Some("Kino"));
}

#[test]
fn test_name_only_leaves_tags() {
    let dir = TempDir::new().unwrap();
    let song = dir.child("Песня.mp3");
    mp3_with_title(song.path(), "Альбом");

    let options = ProcessOptions {
        retag: false,
        ..ProcessOptions::default()
    };
    let summary = workflow(options).process_files(&[song.to_path_buf()]);

    assert!(!summary.has_failures());
    assert_eq!(title_of(&dir.path().join("Pesna.mp3")).as_deref(), Some("Альбом"));
}

#[test]
fn test_tags_only_keeps_name() {
    let dir = TempDir::new().unwrap();
    let song = dir.child("Песня.mp3");
    mp3_with_title(song.path(), "Альбом");

    let options = ProcessOptions {
        rename: false,
        ..ProcessOptions::default()
    };
    let summary = workflow(options).process_files(&[song.to_path_buf()]);

    assert!(!summary.has_failures());
    assert_eq!(title_of(song.path()).as_deref(), Some("Albom"));
}

#[test]
fn test_untagged_file_is_only_renamed() {
    let dir = TempDir::new().unwrap();
    let song = dir.child("Песня.txt");
    song.write_str("plain text").unwrap();

    let summary = workflow(ProcessOptions::default()).process_files(&[song.to_path_buf()]);

    assert!(!summary.has_failures());
    dir.child("Pesna.txt").assert("plain text");
}

#[test]
fn test_failed_file_does_not_stop_the_batch() {
    let dir = TempDir::new().unwrap();
    let first = dir.child("Песня.mp3");
    let second = dir.child("Пенсе.mp3");
    let third = dir.child("Сон.mp3");
    mp3_with_title(first.path(), "Альбом");
    mp3_with_title(second.path(), "Альбом");
    mp3_with_title(third.path(), "Альбом");

    // The second file's destination is already taken
    let blocker = dir.child("Pense.mp3");
    blocker.write_str("occupied").unwrap();

    let files: Vec<PathBuf> = vec![first.to_path_buf(), second.to_path_buf(), third.to_path_buf()];
    let summary = workflow(ProcessOptions::default()).process_files(&files);

    assert!(summary.has_failures());
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.succeeded(), 2);

    let reports = summary.reports();
    assert!(matches!(
        reports[1].outcome,
        ProcessingOutcome::Failure {
            kind: ErrorKind::FileAccess,
            ..
        }
    ));

    assert_eq!(title_of(&dir.path().join("Pesna.mp3")).as_deref(), Some("Albom"));
    assert_eq!(title_of(&dir.path().join("Son.mp3")).as_deref(), Some("Albom"));
    assert!(second.path().is_file());
    blocker.assert("occupied");
}
