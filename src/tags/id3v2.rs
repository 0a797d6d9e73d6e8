//! ID3v2 tag container.
//!
//! Field layout:
//! - Album: `TALB`
//! - Title: `TIT2`
//! - Comment: first `COMM` frame (language and description are kept)
//! - AlbumArtists: `TPE2`
//! - Performers: `TPE1`
//!
//! Multi-valued text frames separate their values with NUL, as ID3v2.4 does.
//!
//! Files carrying only an ID3v1 tag are read through it and saved with an
//! ID3v2 tag in its place; a leftover ID3v1 tag is dropped on save.

use std::path::{Path, PathBuf};

use id3::frame::Comment;
use id3::{ErrorKind, Tag, TagLike, v1v2};
use tracing::debug;

use super::{FieldValue, TagContainer, TagField, TagLibrary};
use crate::error::{Result, TranslitError};

const VALUE_SEPARATOR: &str = "\0";

/// Tag library reading and writing ID3v2 tags through the id3 crate
#[derive(Debug, Default, Clone, Copy)]
pub struct Id3TagLibrary;

impl Id3TagLibrary {
    pub fn new() -> Self {
        Self
    }
}

impl TagLibrary for Id3TagLibrary {
    fn open(&self, path: &Path) -> Result<Box<dyn TagContainer>> {
        Ok(Box::new(Id3TagContainer::open(path)?))
    }
}

pub struct Id3TagContainer {
    path: PathBuf,
    tag: Tag,
    had_tag: bool,
    dirty: bool,
}

impl Id3TagContainer {
    /// Read the tag of `path`, falling back to ID3v1 when there is no ID3v2 tag.
    /// A file without either yields an empty container.
    pub fn open(path: &Path) -> Result<Self> {
        let (tag, had_tag) = match v1v2::read_from_path(path) {
            Ok(tag) => (tag, true),
            Err(e) if matches!(e.kind, ErrorKind::NoTag) => {
                debug!("No ID3 tag in {}", path.display());
                (Tag::new(), false)
            }
            Err(e) => {
                return Err(TranslitError::TagWrite(format!(
                    "Failed to read tags from {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            tag,
            had_tag,
            dirty: false,
        })
    }

    fn frame_id(field: TagField) -> &'static str {
        match field {
            TagField::Album => "TALB",
            TagField::Title => "TIT2",
            TagField::Comment => "COMM",
            TagField::AlbumArtists => "TPE2",
            TagField::Performers => "TPE1",
        }
    }

    fn text_values(&self, id: &str) -> Vec<String> {
        self.tag
            .get(id)
            .and_then(|frame| frame.content().text())
            .map(|text| text.split(VALUE_SEPARATOR).map(str::to_owned).collect())
            .unwrap_or_default()
    }

    fn set_text(&mut self, id: &str, value: Option<String>) {
        match value {
            Some(text) => self.tag.set_text(id, text),
            None => {
                let _ = self.tag.remove(id);
            }
        }
    }

    fn set_comment(&mut self, value: Option<String>) {
        let mut comments: Vec<Comment> = self.tag.comments().cloned().collect();

        match value {
            Some(text) => match comments.first_mut() {
                Some(first) => first.text = text,
                None => comments.push(Comment {
                    lang: "eng".to_string(),
                    description: String::new(),
                    text,
                }),
            },
            None if !comments.is_empty() => {
                comments.remove(0);
            }
            None => {}
        }

        let _ = self.tag.remove("COMM");
        for comment in comments {
            let _ = self.tag.add_frame(comment);
        }
    }
}

impl TagContainer for Id3TagContainer {
    fn get_field(&self, field: TagField) -> FieldValue {
        match field {
            TagField::Album => FieldValue::Text(self.tag.album().map(str::to_owned)),
            TagField::Title => FieldValue::Text(self.tag.title().map(str::to_owned)),
            TagField::Comment => {
                FieldValue::Text(self.tag.comments().next().map(|c| c.text.clone()))
            }
            TagField::AlbumArtists | TagField::Performers => {
                FieldValue::List(self.text_values(Self::frame_id(field)))
            }
        }
    }

    fn set_field(&mut self, field: TagField, value: FieldValue) {
        if self.get_field(field) == value {
            return;
        }

        let id = Self::frame_id(field);
        match (field, value) {
            (TagField::Comment, FieldValue::Text(text)) => self.set_comment(text),
            (_, FieldValue::Text(text)) => self.set_text(id, text),
            (_, FieldValue::List(values)) if values.is_empty() => self.set_text(id, None),
            (_, FieldValue::List(values)) => {
                self.set_text(id, Some(values.join(VALUE_SEPARATOR)));
            }
        }

        debug!("Updated {} in {}", field.name(), self.path.display());
        self.dirty = true;
    }

    fn save(&mut self) -> Result<()> {
        if !self.dirty {
            debug!("Tags of {} unchanged, not writing", self.path.display());
            return Ok(());
        }

        if !self.had_tag && self.tag.frames().next().is_none() {
            return Ok(());
        }

        v1v2::write_to_path(&self.path, &self.tag, self.tag.version()).map_err(|e| {
            TranslitError::TagWrite(format!(
                "Failed to write tags to {}: {}",
                self.path.display(),
                e
            ))
        })?;

        self.dirty = false;
        Ok(())
    }
}
