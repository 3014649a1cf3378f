//! Data access errors
//!
//! Every failure of the data routes is one of these variants. The HTTP layer
//! turns them into an error envelope with [`DataError::status`].

use hyper::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    /// Directory or file exists but could not be read
    #[error("failed to read '{}': {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("data file not found: {0}")]
    NotFound(String),

    /// Name would resolve outside the data directory
    #[error("invalid data file name: {0:?}")]
    InvalidFilename(String),

    #[error("failed to parse '{name}' as CSV: {source}")]
    Parse {
        name: String,
        #[source]
        source: CsvSyntaxError,
    },
}

/// Why a data file is not valid CSV
#[derive(Debug, Error)]
pub enum CsvSyntaxError {
    #[error("line {line}: {source}")]
    Record {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("quoted field opened on line {line} is never closed")]
    UnterminatedQuote { line: u64 },
}

impl DataError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidFilename(_) => StatusCode::BAD_REQUEST,
            Self::Filesystem { .. } | Self::Parse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify an I/O error raised while reading `path`
    pub fn from_io(path: PathBuf, name: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(name.to_string())
        } else {
            Self::Filesystem { path, source }
        }
    }
}
