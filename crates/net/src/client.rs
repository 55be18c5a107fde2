//! Page fetching.

use async_trait::async_trait;
use exn::ResultExt;
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

/// A page body, transcoded to UTF-8.
pub type Page = String;

/// Per-request timeout. Author pages are small, but the site is slow.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Transcode a response body from the site's legacy Windows-1251
/// encoding to UTF-8. Unmappable bytes become replacement characters,
/// so this never fails.
pub fn decode_page(bytes: &[u8]) -> Page {
    let (text, _, _) = encoding_rs::WINDOWS_1251.decode(bytes);
    text.into_owned()
}

/// Unified interface for fetching site content.
///
/// `None`/`false` mean the site answered with something other than
/// `200 OK` — the page is treated as absent. Transport failures (DNS,
/// connect, timeout) are errors and abort the current operation instead.
#[async_trait]
pub trait SiteFetcher: Send + Sync {
    /// GET the URL and return the transcoded body.
    async fn get(&self, url: &str) -> Result<Option<Page>>;

    /// Download the URL into a file, creating parent directories.
    async fn fetch_to_file(&self, url: &str, path: &Path) -> Result<bool>;
}

/// The real thing: a reqwest client against the live site.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .or_raise(|| ErrorKind::Http)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SiteFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn get(&self, url: &str) -> Result<Option<Page>> {
        let response = self.client.get(url).send().await.or_raise(|| ErrorKind::Http)?;
        if response.status() != reqwest::StatusCode::OK {
            tracing::debug!(status = %response.status(), url, "page reported absent");
            return Ok(None);
        }
        let body = response.bytes().await.or_raise(|| ErrorKind::Http)?;
        Ok(Some(decode_page(&body)))
    }

    #[instrument(skip(self))]
    async fn fetch_to_file(&self, url: &str, path: &Path) -> Result<bool> {
        let response = self.client.get(url).send().await.or_raise(|| ErrorKind::Http)?;
        if response.status() != reqwest::StatusCode::OK {
            return Ok(false);
        }
        let body = response.bytes().await.or_raise(|| ErrorKind::Http)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Filesystem(parent.to_owned()))?;
        }
        tokio::fs::write(path, &body).await.or_raise(|| ErrorKind::Filesystem(path.to_owned()))?;
        Ok(true)
    }
}

/// Canned fetcher for tests: URL → body, plus a poison list whose
/// entries fail with a transport error.
#[cfg(feature = "mock")]
#[derive(Debug, Default)]
pub struct MockFetcher {
    pages: std::sync::Mutex<std::collections::HashMap<String, Vec<u8>>>,
    poisoned: std::sync::Mutex<std::collections::HashSet<String>>,
}

#[cfg(feature = "mock")]
impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` (UTF-8, transcoded on the fly) at `url`.
    pub fn serve(&self, url: &str, body: &str) {
        let (encoded, _, _) = encoding_rs::WINDOWS_1251.encode(body);
        self.pages.lock().expect("mock fetcher lock").insert(url.to_owned(), encoded.into_owned());
    }

    /// Stop serving `url`; subsequent fetches see an absent page.
    pub fn remove(&self, url: &str) {
        self.pages.lock().expect("mock fetcher lock").remove(url);
    }

    /// Make fetches of `url` fail with a transport error.
    pub fn poison(&self, url: &str) {
        self.poisoned.lock().expect("mock fetcher lock").insert(url.to_owned());
    }
}

#[cfg(feature = "mock")]
#[async_trait]
impl SiteFetcher for MockFetcher {
    async fn get(&self, url: &str) -> Result<Option<Page>> {
        if self.poisoned.lock().expect("mock fetcher lock").contains(url) {
            exn::bail!(ErrorKind::Http);
        }
        Ok(self.pages.lock().expect("mock fetcher lock").get(url).map(|body| decode_page(body)))
    }

    async fn fetch_to_file(&self, url: &str, path: &Path) -> Result<bool> {
        if self.poisoned.lock().expect("mock fetcher lock").contains(url) {
            exn::bail!(ErrorKind::Http);
        }
        let body = match self.pages.lock().expect("mock fetcher lock").get(url) {
            Some(body) => body.clone(),
            None => return Ok(false),
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Filesystem(parent.to_owned()))?;
        }
        tokio::fs::write(path, &body).await.or_raise(|| ErrorKind::Filesystem(path.to_owned()))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_page_handles_cyrillic() {
        // "Проза" in Windows-1251
        let bytes = [0xCF, 0xF0, 0xEE, 0xE7, 0xE0];
        assert_eq!(decode_page(&bytes), "Проза");
    }

    #[test]
    fn test_decode_page_passes_ascii_through() {
        assert_eq!(decode_page(b"<h3>plain</h3>"), "<h3>plain</h3>");
    }
}
