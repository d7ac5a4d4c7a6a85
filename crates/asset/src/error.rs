//! Errors raised while loading models and material libraries.

use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    /// Directory or file missing/unreadable, or the working directory could
    /// not be switched or restored.
    #[error("Filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed model or material text. `line` is 1-based.
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A material library named by the model could not be resolved.
    #[error("Material library '{name}' not found: {source}")]
    MaterialNotFound {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl AssetError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(line_no: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line: line_no + 1,
            message: message.into(),
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

/// Decode file bytes as UTF-8. Invalid text is a parse error on the line
/// holding the first bad byte.
pub(crate) fn decode_text(bytes: Vec<u8>, path: &Path) -> AssetResult<String> {
    String::from_utf8(bytes).map_err(|e| {
        let offset = e.utf8_error().valid_up_to();
        let bytes = e.as_bytes();
        let line_no = bytes[..offset].iter().filter(|&&b| b == b'\n').count();
        AssetError::parse(
            line_no,
            format!(
                "{}: invalid UTF-8 at byte offset {offset}",
                path.display()
            ),
        )
    })
}

pub type AssetResult<T> = Result<T, AssetError>;
