//! TagTranslit - MP3 tag and file name transliterator
//!
//! Repairs text that was written in one 8-bit codepage and read back through
//! another, then transliterates it with a user-supplied character map. Both
//! file names and ID3 tags are processed.

pub mod cli;
pub mod config;
pub mod error;
pub mod files;
pub mod map;
pub mod recovery;
pub mod tags;
pub mod transliterate;
pub mod workflow;
