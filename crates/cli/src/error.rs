//! Errors surfaced directly to the terminal.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// No audit database exists at the expected location yet. A vault
    /// writes one the first time it commits an event.
    #[error("no audit database at {path}; 'steward demo' creates one")]
    DatabaseNotFound { path: PathBuf },

    /// The prefix matched no vault in the audit database.
    #[error("'{prefix}' does not match any vault")]
    VaultNotFound { prefix: String },

    /// The prefix matched more than one vault; it must be lengthened
    /// until unique.
    #[error("'{prefix}' is ambiguous between {matches:?}")]
    AmbiguousVault {
        prefix: String,
        matches: Vec<String>,
    },

    #[error(transparent)]
    Gateway(#[from] gateway::Error),

    #[error(transparent)]
    Storage(#[from] storage::Error),

    #[error(transparent)]
    Policy(#[from] policy::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
