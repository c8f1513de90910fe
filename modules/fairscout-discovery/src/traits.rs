// Trait abstraction over the outside world.
//
// ContentFetcher replaces Arc<Archive> in the orchestrator: search, page
// rendering, downloads and PDF text all sit behind one trait so runs can be
// driven by MockFetcher with no browser, network or poppler install.

use std::path::Path;

use async_trait::async_trait;
use fairscout_common::{DownloadedFile, FetchError, OpenedPage, ParsedPdf, SearchResult};

/// Results requested per search query.
pub const SEARCH_RESULTS: usize = 10;

// ---------------------------------------------------------------------------
// ContentFetcher: the orchestrator's view of the outside world
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Web search. Best-effort: an empty list is a valid answer.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, FetchError>;

    /// Render a page and return its visible text and links.
    async fn open_page(&self, url: &str) -> Result<OpenedPage, FetchError>;

    /// Fetch a file to local storage.
    async fn download_file(&self, url: &str) -> Result<DownloadedFile, FetchError>;

    /// Extract text from a downloaded PDF.
    async fn parse_pdf(&self, path: &Path) -> Result<ParsedPdf, FetchError>;
}

#[async_trait]
impl ContentFetcher for fairscout_archive::Archive {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, FetchError> {
        self.search(query, SEARCH_RESULTS).await
    }

    async fn open_page(&self, url: &str) -> Result<OpenedPage, FetchError> {
        self.open_page(url).await
    }

    async fn download_file(&self, url: &str) -> Result<DownloadedFile, FetchError> {
        self.download_file(url).await
    }

    async fn parse_pdf(&self, path: &Path) -> Result<ParsedPdf, FetchError> {
        self.parse_pdf(path).await
    }
}
