use crate::map::TranslitMap;
use crate::recovery::EncodingRecovery;

/// Replace every mapped character of `text` in a single pass.
///
/// Replacement strings are emitted as-is and never re-scanned.
pub fn transform(map: &TranslitMap, text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for c in text.chars() {
        match map.get(c) {
            Some(replacement) => out.push_str(replacement),
            None => out.push(c),
        }
    }

    out
}

/// Mojibake recovery followed by the character transform
#[derive(Debug, Clone)]
pub struct Transliterator {
    map: TranslitMap,
    recovery: EncodingRecovery,
}

impl Transliterator {
    pub fn new(map: TranslitMap, recovery: EncodingRecovery) -> Self {
        Self { map, recovery }
    }

    pub fn map(&self) -> &TranslitMap {
        &self.map
    }

    pub fn apply(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let recovered = self.recovery.recover(text);
        transform(&self.map, &recovered)
    }

    /// Apply to optional tag text; absent or empty values stay as they are.
    pub fn apply_opt(&self, text: Option<&str>) -> Option<String> {
        text.map(|t| self.apply(t))
    }
}
