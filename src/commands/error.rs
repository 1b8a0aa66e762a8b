//! Command Errors
//!
//! Every failure below produces the same `ERROR` frame on the wire. The
//! variants exist for diagnostics only.

use crate::protocol::ValidationError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that fail a single command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// `CFSINIT` while a session is already open (strict guard only)
    #[error("CFSINIT has been called more than once")]
    AlreadyInitialized,

    /// Any guarded command before `CFSINIT`
    #[error("CFSINIT must precede call to {command}")]
    NotInitialized { command: &'static str },

    /// A zero-parameter command received parameters
    #[error("{command} does not expect any parameters")]
    UnexpectedParameters { command: &'static str },

    /// Parameters failed schema validation
    #[error("invalid parameters: {0}")]
    Validation(#[from] ValidationError),

    /// The requested file does not exist
    #[error("no such file: {}", path.display())]
    NotFound { path: PathBuf },

    /// The requested file exists but could not be accessed
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Read offset at or past the end of the file
    #[error("offset is out of range (offset: {offset}, size: {size})")]
    Range { offset: u64, size: u64 },
}

impl CommandError {
    /// Wraps an I/O error raised while accessing `path`.
    pub fn io(path: &Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            CommandError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            CommandError::Io {
                path: path.to_path_buf(),
                source: err,
            }
        }
    }

    /// Short category name for log output.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::AlreadyInitialized
            | CommandError::NotInitialized { .. }
            | CommandError::UnexpectedParameters { .. } => "protocol",
            CommandError::Validation(_) => "validation",
            CommandError::NotFound { .. } => "not_found",
            CommandError::Io { .. } => "io",
            CommandError::Range { .. } => "range",
        }
    }
}
