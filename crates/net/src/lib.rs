//! Network collaborators and the downloaded-works store.
//!
//! The site serves Windows-1251; everything crossing this crate's
//! boundary is already transcoded to UTF-8. Fetching goes through the
//! [`SiteFetcher`] trait so the sync engine can run against the real
//! [`HttpFetcher`] or the canned [`MockFetcher`] (feature `mock`) alike.

pub mod client;
pub mod error;
mod storage;
mod url;

pub use crate::client::{HttpFetcher, Page, SiteFetcher, decode_page};
#[cfg(feature = "mock")]
pub use crate::client::MockFetcher;
pub use crate::storage::{WorkFormat, WorkStorage};
pub use crate::url::{DOMAIN, PROTOCOL, strip_domain, to_url, to_url_with};
