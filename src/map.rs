//! Transliteration map loading.
//!
//! A map definition is an XML document whose `Transliteration` element holds
//! one `element` per mapped character:
//!
//! ```xml
//! <Transliteration>
//!   <element from="а" to="a"/>
//!   <element from="щ" to="shch"/>
//! </Transliteration>
//! ```
//!
//! Documents on disk may be UTF-8, UTF-16 with a byte order mark, or any
//! ASCII-compatible codepage named by the `encoding` of the XML declaration.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use quick_xml::encoding::{Decoder, detect_encoding};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::{debug, info};

use crate::error::{Result, TranslitError};

const ROOT_ELEMENT: &[u8] = b"Transliteration";
const ENTRY_ELEMENT: &[u8] = b"element";

/// A single `from` -> `to` pair as read from a map definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub from: char,
    pub to: String,
}

impl MappingEntry {
    pub fn new<S: Into<String>>(from: char, to: S) -> Self {
        Self { from, to: to.into() }
    }
}

/// Immutable character -> replacement lookup table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslitMap {
    table: HashMap<char, String>,
}

impl TranslitMap {
    /// Build a map from entries. A repeated source character is an error.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = MappingEntry>,
    {
        let mut table = HashMap::new();

        for entry in entries {
            match table.entry(entry.from) {
                Entry::Occupied(existing) => {
                    return Err(TranslitError::MapLoad(format!(
                        "Duplicate mapping for '{}' (already mapped to '{}')",
                        entry.from,
                        existing.get()
                    )));
                }
                Entry::Vacant(slot) => {
                    slot.insert(entry.to);
                }
            }
        }

        Ok(Self { table })
    }

    /// Load a map definition from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading transliteration map: {}", path.display());

        let content = std::fs::read(path).map_err(|e| {
            TranslitError::MapLoad(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let map = Self::from_bytes(&content).map_err(|e| match e {
            TranslitError::MapLoad(msg) => {
                TranslitError::MapLoad(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        info!("Loaded {} transliteration entries from {}", map.len(), path.display());
        Ok(map)
    }

    /// Parse a raw map document, detecting its character encoding.
    pub fn from_bytes(content: &[u8]) -> Result<Self> {
        Self::from_xml(&decode_document(content)?)
    }

    /// Parse a map definition held in memory.
    pub fn from_xml(content: &str) -> Result<Self> {
        Self::from_entries(parse_entries(content)?)
    }

    pub fn get(&self, c: char) -> Option<&str> {
        self.table.get(&c).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Decode a document using its byte order mark, else its declared encoding, else UTF-8.
fn decode_document(bytes: &[u8]) -> Result<String> {
    let (encoding, bom_len) = match detect_encoding(bytes) {
        Some((encoding, 0)) if encoding == UTF_8 => (declared_encoding(bytes).unwrap_or(UTF_8), 0),
        Some(detected) => detected,
        None => (UTF_8, 0),
    };

    let (text, malformed) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
    if malformed {
        return Err(TranslitError::MapLoad(format!(
            "Document is not valid {}",
            encoding.name()
        )));
    }

    debug!("Decoded transliteration map as {}", encoding.name());
    Ok(text.into_owned())
}

/// The `encoding` of a leading XML declaration, if it names an ASCII-compatible codepage
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    match reader.read_event_into(&mut buf) {
        Ok(Event::Decl(decl)) => decl.encoder().filter(|e| e.is_ascii_compatible()),
        _ => None,
    }
}

/// Collect every `Transliteration/element` entry in document order.
fn parse_entries(content: &str) -> Result<Vec<MappingEntry>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut entries = Vec::new();
    let mut saw_root = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            TranslitError::MapLoad(format!(
                "Malformed document at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(element) => {
                if stack.is_empty() {
                    enter_root(&mut saw_root)?;
                }
                if let Some(entry) = entry_from(&element, stack.last(), reader.decoder())? {
                    entries.push(entry);
                }
                stack.push(element.name().as_ref().to_vec());
            }
            Event::Empty(element) => {
                if stack.is_empty() {
                    enter_root(&mut saw_root)?;
                }
                if let Some(entry) = entry_from(&element, stack.last(), reader.decoder())? {
                    entries.push(entry);
                }
            }
            Event::End(_) => {
                stack.pop();
            }
            // Whitespace is trimmed away, so any text left here is content
            Event::Text(_) | Event::CData(_) if stack.is_empty() => {
                return Err(TranslitError::MapLoad(
                    "Text outside the root element".to_string(),
                ));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(TranslitError::MapLoad("Root element is missing".to_string()));
    }

    if let Some(open) = stack.last() {
        return Err(TranslitError::MapLoad(format!(
            "Unexpected end of document inside <{}>",
            String::from_utf8_lossy(open)
        )));
    }

    Ok(entries)
}

fn enter_root(saw_root: &mut bool) -> Result<()> {
    if *saw_root {
        return Err(TranslitError::MapLoad(
            "Document has more than one root element".to_string(),
        ));
    }
    *saw_root = true;
    Ok(())
}

fn entry_from(
    element: &BytesStart<'_>,
    parent: Option<&Vec<u8>>,
    decoder: Decoder,
) -> Result<Option<MappingEntry>> {
    let is_entry = element.name().as_ref() == ENTRY_ELEMENT
        && parent.is_some_and(|p| p.as_slice() == ROOT_ELEMENT);
    if !is_entry {
        return Ok(None);
    }

    let from = required_attribute(element, "from", decoder)?;
    let to = required_attribute(element, "to", decoder)?;

    let from = from.chars().next().ok_or_else(|| {
        TranslitError::MapLoad("Element has an empty 'from' attribute".to_string())
    })?;

    Ok(Some(MappingEntry::new(from, to)))
}

fn required_attribute(element: &BytesStart<'_>, name: &str, decoder: Decoder) -> Result<String> {
    let attribute = element
        .try_get_attribute(name)
        .map_err(|e| TranslitError::MapLoad(format!("Invalid attribute: {}", e)))?
        .ok_or_else(|| {
            TranslitError::MapLoad(format!("Element is missing the '{}' attribute", name))
        })?;

    attribute
        .decode_and_unescape_value(decoder)
        .map(|value| value.into_owned())
        .map_err(|e| TranslitError::MapLoad(format!("Invalid '{}' attribute: {}", name, e)))
}
