//! Runtime error types
//!
//! Only resource acquisition reports errors as values. Calling an operation a
//! stream does not implement is a programming error and panics in the
//! dispatch gateway instead.

use crate::stream::OpenMode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for fallible stream construction
pub type StreamResult<T> = Result<T, StreamError>;

/// Why a stream could not be opened
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    /// No access bit (READ, WRITE, APPEND or NEW) was requested
    #[error("invalid open mode {mode:?} for {}", path.display())]
    InvalidMode { path: PathBuf, mode: OpenMode },

    #[error("cannot open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for loading dynamic libraries
pub type DynlinkResult<T> = Result<T, DynlinkError>;

/// Why a dynamic library could not be loaded
#[derive(Debug, Error)]
pub enum DynlinkError {
    #[error("cannot load library {name}: {source}")]
    Open {
        name: String,
        #[source]
        source: libloading::Error,
    },
}

/// The destination of a copy accepted fewer bytes than it was offered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("short write after {copied} bytes")]
pub struct ShortWrite {
    /// Bytes the destination did accept
    pub copied: u64,
}

impl StreamError {
    /// Classify an OS error raised while opening `path`
    pub fn from_io(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => StreamError::NotFound { path },
            io::ErrorKind::PermissionDenied => StreamError::PermissionDenied { path },
            _ => StreamError::Io { path, source },
        }
    }

    /// Path the failed open referred to
    pub fn path(&self) -> &std::path::Path {
        match self {
            StreamError::NotFound { path }
            | StreamError::PermissionDenied { path }
            | StreamError::InvalidMode { path, .. }
            | StreamError::Io { path, .. } => path,
        }
    }

    /// The matching `io::ErrorKind`
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            StreamError::NotFound { .. } => io::ErrorKind::NotFound,
            StreamError::PermissionDenied { .. } => io::ErrorKind::PermissionDenied,
            StreamError::InvalidMode { .. } => io::ErrorKind::InvalidInput,
            StreamError::Io { source, .. } => source.kind(),
        }
    }
}
