use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transliteration map error: {0}")]
    MapLoad(String),

    #[error("File access error: {0}")]
    FileAccess(String),

    #[error("Tag write error: {0}")]
    TagWrite(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Category of a per-file failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileAccess,
    TagWrite,
}

impl TranslitError {
    /// Fatal errors abort the run before any file is touched.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MapLoad(_) | Self::Config(_))
    }

    /// Classify an error raised while processing a single file.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TagWrite(_) => ErrorKind::TagWrite,
            _ => ErrorKind::FileAccess,
        }
    }

    /// Short failure note without the category prefix.
    pub fn reason(&self) -> String {
        match self {
            Self::MapLoad(msg)
            | Self::FileAccess(msg)
            | Self::TagWrite(msg)
            | Self::Config(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TranslitError>;
