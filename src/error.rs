//! # Error Types
//!
//! Every failure the client can run into while resolving credentials, talking
//! to the daemon or preparing a sync directory. Only [`CliError::ConfigRead`]
//! with a not-found cause is ever recovered from (see [`crate::config`]);
//! everything else ends the run with exit status 1.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// The daemon config file exists but could not be read.
    #[error("failed to read config file {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The daemon config file was read but does not hold usable webui settings.
    #[error("malformed config file {}: {reason}", path.display())]
    ConfigParse { path: PathBuf, reason: String },

    #[error("no password available; supply either --config <path> or --pass")]
    MissingCredential,

    #[error("failed to read password")]
    Prompt(#[source] io::Error),

    #[error("This directory is already being synced: {}", .0.display())]
    DuplicateFolder(PathBuf),

    /// The daemon could not be reached, or answered with a non-success status.
    #[error("could not talk to the sync daemon")]
    Connection(#[from] reqwest::Error),

    /// The daemon answered but refused the request or sent something unusable.
    #[error("sync daemon rejected {action}: {reason}")]
    Api { action: &'static str, reason: String },

    #[error("failed to {action} {}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CliError {
    pub(crate) fn fs(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        CliError::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
