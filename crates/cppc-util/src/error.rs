//! Error types for the utility crate's I/O-facing boundaries.
//!
//! Most of this crate reports problems through the diagnostic [`Handler`]
//! (see [`crate::diagnostic`]), matching a compiler's usual error channel.
//! These `thiserror` enums exist for the narrower set of operations that
//! must return a `Result` to their caller: filesystem ingestion, where a
//! null result alone can't distinguish "file does not exist" from
//! "couldn't even check."
//!
//! [`Handler`]: crate::diagnostic::Handler

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from [`crate::file_manager::FileManager`] operations.
#[derive(Debug, Error)]
pub enum FileManagerError {
    /// `stat` (or equivalent) failed for a reason other than non-existence.
    #[error("failed to stat {path}: {source}")]
    Stat { path: PathBuf, source: io::Error },
}

/// Result alias for [`FileManagerError`].
pub type FileManagerResult<T> = std::result::Result<T, FileManagerError>;

/// Errors from [`crate::source_manager::SourceManager`] buffer ingestion.
#[derive(Debug, Error)]
pub enum SourceManagerError {
    /// The file existed (per `FileManager`) but reading its contents failed.
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    /// More file identifiers were requested than the 12-bit field can name.
    #[error("file id space exhausted (more than {max} ids allocated)")]
    FileIdSpaceExhausted { max: u32 },
}

/// Result alias for [`SourceManagerError`].
pub type SourceManagerResult<T> = std::result::Result<T, SourceManagerError>;

/// Errors from [`crate::identifier_table::IdentifierTable`] operations.
#[derive(Debug, Error)]
pub enum IdentifierTableError {
    /// The requested byte range was not valid UTF-8.
    #[error("identifier spelling is not valid UTF-8")]
    InvalidSpelling,
}

/// Result alias for [`IdentifierTableError`].
pub type IdentifierTableResult<T> = std::result::Result<T, IdentifierTableError>;
