// Embedded metadata access
//
// The engine only needs a handful of text fields from a tag container. This
// module defines that surface and provides the ID3v2 implementation:
// - Id3v2: id3 crate backed container for MP3 files

pub mod id3v2;

use std::path::Path;

pub use id3v2::*;

use crate::error::Result;

/// Tag fields rewritten by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagField {
    Album,
    Title,
    Comment,
    AlbumArtists,
    Performers,
}

impl TagField {
    pub const ALL: [TagField; 5] = [
        TagField::Album,
        TagField::Title,
        TagField::Comment,
        TagField::AlbumArtists,
        TagField::Performers,
    ];

    /// Multi-valued fields hold an ordered list of texts
    pub fn is_list(self) -> bool {
        matches!(self, TagField::AlbumArtists | TagField::Performers)
    }

    pub fn name(self) -> &'static str {
        match self {
            TagField::Album => "Album",
            TagField::Title => "Title",
            TagField::Comment => "Comment",
            TagField::AlbumArtists => "AlbumArtists",
            TagField::Performers => "Performers",
        }
    }
}

/// Value of a tag field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(Option<String>),
    List(Vec<String>),
}

impl FieldValue {
    /// Apply `f` to every present, non-empty text of the value.
    pub fn map<F>(&self, f: F) -> FieldValue
    where
        F: Fn(&str) -> String,
    {
        let convert = |text: &String| {
            if text.is_empty() {
                text.clone()
            } else {
                f(text)
            }
        };

        match self {
            FieldValue::Text(text) => FieldValue::Text(text.as_ref().map(convert)),
            FieldValue::List(values) => FieldValue::List(values.iter().map(convert).collect()),
        }
    }
}

/// In-memory tag container of a single file
#[cfg_attr(test, mockall::automock)]
pub trait TagContainer {
    /// Read a field
    fn get_field(&self, field: TagField) -> FieldValue;

    /// Replace a field
    fn set_field(&mut self, field: TagField, value: FieldValue);

    /// Persist the container back to its file
    fn save(&mut self) -> Result<()>;
}

/// Opens tag containers for files
#[cfg_attr(test, mockall::automock)]
pub trait TagLibrary: Send + Sync {
    /// Open the tag container of a file
    fn open(&self, path: &Path) -> Result<Box<dyn TagContainer>>;
}

/// Factory for creating tag library instances
pub struct TagLibraryFactory;

impl TagLibraryFactory {
    /// Create the default tag library implementation (ID3v2)
    pub fn create_default() -> Box<dyn TagLibrary> {
        Box::new(id3v2::Id3TagLibrary::new())
    }
}
