//! Sync Error Types
//!
//! Structured errors using `exn` for automatic location tracking and
//! error tree construction.

use derive_more::{Display, Error};

/// A sync error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The supplied string is not one of the accepted author-URL shapes.
    #[display("not a valid author url: {_0}")]
    InvalidUrl(#[error(not(source))] String),
    /// The canonical URL resolved to no page.
    #[display("no author page at {_0}")]
    AuthorNotFound(#[error(not(source))] String),
    /// The store rejected a read or write.
    #[display("store operation failed")]
    Store,
    /// A transport-level fetch failure aborted the sync.
    #[display("page fetch failed")]
    Fetch,
    /// A pending group reference had no persisted counterpart.
    #[display("unresolved group reference in difference")]
    Resolve,
    /// The site declined to serve the work body.
    #[display("the work body is not available from the site")]
    Unavailable,
    /// The works store rejected a path.
    #[display("works store path error")]
    Storage,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch | Self::Unavailable)
    }
}
