//! Gate error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("{0}")]
    Usage(&'static str),

    /// The sentinel basename is not `[A-Z_]+`.
    #[error("Unacceptable sentinel file name {path:?}")]
    InvalidSentinelName { path: PathBuf },

    #[error("cannot read source file {path:?}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to run {program:?}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The wrapped command exited unsuccessfully; the sentinel was left alone.
    #[error("command exited with status {code}")]
    CommandFailed { code: i32 },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, GateError>;
