//! Extraction Error Types
//!
//! Structured errors using `exn` for automatic location tracking and
//! error tree construction.
//!
//! Extraction itself never fails — unrecognised markup yields empty
//! results. The only fallible operation in this crate is compiling
//! caller-supplied pattern overrides.

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A caller-supplied pattern override did not compile.
    #[display("invalid {_0} pattern override")]
    Pattern(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
