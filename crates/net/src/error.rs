//! Network/Filesystem Error Types
//!
//! Structured errors using `exn` for automatic location tracking and
//! error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A network or filesystem error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for fetch and storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Transport-level failure: DNS, connect, timeout. A not-200 status
    /// is NOT an error, it surfaces as an absent page.
    #[display("http transport error")]
    Http,
    #[display("filesystem error at {}", _0.display())]
    Filesystem(#[error(not(source))] PathBuf),
    /// The configured works-store location is unusable.
    #[display("invalid works store location")]
    InvalidLocation,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http)
    }
}
