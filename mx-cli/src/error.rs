//! CLI 错误类型

use mx_core::{DynlinkError, ShortWrite, StreamError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read '{}': {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse '{}': {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config already initialized")]
    ConfigInitialized,

    #[error("cannot open log file '{}': {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot install log subscriber: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error(transparent)]
    Open(#[from] StreamError),

    #[error("cannot write '{}' to output: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: ShortWrite,
    },

    #[error(transparent)]
    Load(#[from] DynlinkError),

    #[error("symbol '{0}' not found")]
    Symbol(String),

    /// Some operands failed; each failure was already reported
    #[error("{0} of the inputs could not be processed")]
    Inputs(usize),
}
