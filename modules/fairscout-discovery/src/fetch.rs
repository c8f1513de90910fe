//! Collaborator calls with pacing and caching applied.
//!
//! Every network call goes through the per-host [`RateLimiter`]; page opens
//! and downloads consult the [`CacheStore`] first. Cache failures are logged
//! and never fail the call.

use std::path::Path;
use std::sync::Arc;

use fairscout_archive::{CacheStore, RateLimiter};
use fairscout_common::{
    extract_host, DownloadedFile, FetchError, OpenedPage, ParsedPdf, SearchResult,
};
use tracing::{debug, warn};

use crate::traits::ContentFetcher;

/// Limiter key for search calls.
const SEARCH_HOST: &str = "google.serper.dev";

/// Result of a page open or download, and whether it came from the cache.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub value: T,
    pub cached: bool,
}

#[derive(Clone)]
pub struct Fetchers {
    fetcher: Arc<dyn ContentFetcher>,
    limiter: Arc<RateLimiter>,
    cache: Option<Arc<CacheStore>>,
}

impl Fetchers {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        limiter: Arc<RateLimiter>,
        cache: Option<Arc<CacheStore>>,
    ) -> Self {
        Self { fetcher, limiter, cache }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, FetchError> {
        self.limiter.acquire(SEARCH_HOST).await;
        let result = self.fetcher.search(query).await;
        self.limiter.finish(SEARCH_HOST);
        result
    }

    pub async fn open_page(&self, url: &str) -> Result<Fetched<OpenedPage>, FetchError> {
        if let Some(cache) = &self.cache {
            match cache.get_page(url).await {
                Ok(Some(page)) => {
                    debug!(url, "Page cache hit");
                    return Ok(Fetched { value: page, cached: true });
                }
                Ok(None) => {}
                Err(e) => warn!(url, error = %e, "Page cache read failed"),
            }
        }

        let host = limiter_key(url);
        self.limiter.acquire(&host).await;
        let result = self.fetcher.open_page(url).await;
        self.limiter.finish(&host);
        let page = result?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put_page(url, &page).await {
                warn!(url, error = %e, "Page cache write failed");
            }
        }
        Ok(Fetched { value: page, cached: false })
    }

    pub async fn download(&self, url: &str) -> Result<Fetched<DownloadedFile>, FetchError> {
        if let Some(cache) = &self.cache {
            match cache.get_download(url).await {
                Ok(Some(file)) => {
                    debug!(url, "Download cache hit");
                    return Ok(Fetched { value: file, cached: true });
                }
                Ok(None) => {}
                Err(e) => warn!(url, error = %e, "Download cache read failed"),
            }
        }

        let host = limiter_key(url);
        self.limiter.acquire(&host).await;
        let result = self.fetcher.download_file(url).await;
        self.limiter.finish(&host);
        let file = result?;

        let file = match &self.cache {
            Some(cache) => match cache.put_download(&file).await {
                Ok(cached) => {
                    if cached.path != file.path {
                        if let Err(e) = tokio::fs::remove_file(&file.path).await {
                            warn!(path = %file.path.display(), error = %e, "Failed to remove downloaded temp file");
                        }
                    }
                    cached
                }
                Err(e) => {
                    warn!(url, error = %e, "Download cache write failed");
                    file
                }
            },
            None => file,
        };
        Ok(Fetched { value: file, cached: false })
    }

    /// Local work, not paced.
    pub async fn parse_pdf(&self, path: &Path) -> Result<ParsedPdf, FetchError> {
        self.fetcher.parse_pdf(path).await
    }
}

fn limiter_key(url: &str) -> String {
    extract_host(url).unwrap_or_else(|| url.to_string())
}
