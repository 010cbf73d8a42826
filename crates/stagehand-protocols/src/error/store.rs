//! Persistent store errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store location cannot be opened for writing. Raised at
    /// construction time only; fatal for the process.
    #[error("Permission denied opening store at {0}")]
    PermissionDenied(String),

    /// A singular lookup matched more than one row.
    #[error("Query expected at most one match: {0}")]
    NotUnique(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),
}
