//! Generation errors

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure while writing an output artifact.
///
/// Each variant is fatal for the file being generated only.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The output directory could not be created
    #[error("cannot create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact could not be written
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact was written but its modification time could not be set
    #[error("cannot update modification time of {}: {source}", path.display())]
    Timestamp {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    /// Path of the file or directory the failure concerns.
    pub fn path(&self) -> &Path {
        match self {
            GenerateError::CreateDir { path, .. }
            | GenerateError::Write { path, .. }
            | GenerateError::Timestamp { path, .. } => path,
        }
    }
}
