//! Mojibake recovery.
//!
//! Text that was written in one 8-bit codepage (the destination, e.g.
//! windows-1251) but read back through another (the source, e.g.
//! windows-1252) comes out as plausible-looking Latin garbage such as
//! `Ïåñíÿ`. Re-encoding through the source codepage restores the original
//! bytes, and decoding them through the destination codepage restores the
//! intended text (`Песня`).
//!
//! Text that was never mis-encoded does not survive the round trip: its
//! characters are mostly unrepresentable in the source codepage and come out
//! as placeholders. When the placeholder ratio exceeds the configured
//! threshold the input is kept as-is.

use std::borrow::Cow;

use encoding_rs::{Encoding, WINDOWS_1251, WINDOWS_1252};
use tracing::trace;

use crate::config::RecoveryConfig;
use crate::error::{Result, TranslitError};

const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

#[derive(Debug, Clone)]
pub struct EncodingRecovery {
    source: &'static Encoding,
    destination: &'static Encoding,
    placeholder: char,
    placeholder_byte: u8,
    threshold: f64,
}

impl Default for EncodingRecovery {
    fn default() -> Self {
        Self {
            source: WINDOWS_1252,
            destination: WINDOWS_1251,
            placeholder: '?',
            placeholder_byte: b'?',
            threshold: 0.25,
        }
    }
}

impl EncodingRecovery {
    /// Both codepages must be 8-bit, the placeholder ASCII and the threshold within `0.0..=1.0`.
    pub fn new(
        source: &'static Encoding,
        destination: &'static Encoding,
        placeholder: char,
        threshold: f64,
    ) -> Result<Self> {
        for encoding in [source, destination] {
            if !encoding.is_single_byte() {
                return Err(TranslitError::Config(format!(
                    "Codepage '{}' is not an 8-bit codepage",
                    encoding.name()
                )));
            }
        }

        let placeholder_byte = u8::try_from(placeholder)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                TranslitError::Config(format!(
                    "Placeholder '{}' is not an ASCII character",
                    placeholder
                ))
            })?;

        if !(0.0..=1.0).contains(&threshold) {
            return Err(TranslitError::Config(format!(
                "Threshold {} is outside 0.0..=1.0",
                threshold
            )));
        }

        Ok(Self {
            source,
            destination,
            placeholder,
            placeholder_byte,
            threshold,
        })
    }

    /// Build the recovery policy from the `[recovery]` configuration section.
    pub fn from_config(config: &RecoveryConfig) -> Result<Self> {
        config.validate()?;

        let source = RecoveryConfig::resolve_codepage(&config.source_codepage)?;
        let destination = RecoveryConfig::resolve_codepage(&config.destination_codepage)?;

        Self::new(source, destination, config.placeholder, config.threshold)
    }

    pub fn source(&self) -> &'static Encoding {
        self.source
    }

    pub fn destination(&self) -> &'static Encoding {
        self.destination
    }

    /// Recover `text` if it looks mis-encoded, otherwise return it unchanged.
    pub fn recover<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if text.is_empty() {
            return Cow::Borrowed(text);
        }

        let candidate = self.reinterpret(text);
        let ratio = self.placeholder_ratio(&candidate);

        if ratio > self.threshold {
            trace!(
                "Keeping {:?}: {:.0}% placeholders in {:?}",
                text,
                ratio * 100.0,
                candidate
            );
            Cow::Borrowed(text)
        } else {
            trace!("Recovered {:?} as {:?}", text, candidate);
            Cow::Owned(candidate)
        }
    }

    /// Encode through the source codepage and decode through the destination one.
    pub fn reinterpret(&self, text: &str) -> String {
        let bytes = self.encode_source(text);
        let (decoded, _) = self.destination.decode_without_bom_handling(&bytes);

        decoded
            .chars()
            .map(|c| if c == REPLACEMENT_CHARACTER { self.placeholder } else { c })
            .collect()
    }

    /// Fraction of placeholder characters in `text`.
    pub fn placeholder_ratio(&self, text: &str) -> f64 {
        let total = text.chars().count();
        if total == 0 {
            return 0.0;
        }

        let placeholders = text.chars().filter(|&c| c == self.placeholder).count();
        placeholders as f64 / total as f64
    }

    fn encode_source(&self, text: &str) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(text.len());
        let mut buf = [0u8; 4];

        for c in text.chars() {
            let (encoded, _, unmappable) = self.source.encode(c.encode_utf8(&mut buf));
            if unmappable {
                bytes.push(self.fallback_byte(c));
            } else {
                bytes.extend_from_slice(&encoded);
            }
        }

        bytes
    }

    // Latin-1 code points map to their own byte value; everything else is a placeholder.
    fn fallback_byte(&self, c: char) -> u8 {
        u8::try_from(c).unwrap_or(self.placeholder_byte)
    }
}
