//! Typed errors for the domain core. The UI and binary wrap these in
//! `anyhow::Error` with extra context; the store itself never hides them.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Raised while constructing a [`Song`](crate::models::Song). Construction is
/// all-or-nothing, so seeing this error means no song value exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("empty name")]
    EmptyName,
    #[error("bad duration: {0}")]
    BadDuration(String),
}

/// Failures reading or writing the library file.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("library file {} is not valid library JSON", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("library file {} contains an invalid song", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
