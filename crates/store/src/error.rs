//! Store Error Types
//!
//! Structured errors using `exn` for automatic location tracking and
//! error tree construction.

use derive_more::{Display, Error};

/// A store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong
/// internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The backend rejected a query or the connection failed.
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// A `get` found no matching row.
    #[display("no matching record in table {_0}")]
    NotFound(#[error(not(source))] &'static str),
    /// A stored value could not be mapped back onto its row type.
    #[display("invalid stored data")]
    InvalidData,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database)
    }
}
