// Test mocks for the discovery pipeline.
//
// MockFetcher (ContentFetcher): HashMap-based URL→response, with call
// recording so tests can assert on what the orchestrator touched.
//
// Plus helpers for constructing OpenedPage and SearchResult values.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use fairscout_common::{
    DownloadedFile, FetchError, OpenedPage, PageLink, ParsedPdf, SearchResult,
};

use crate::traits::ContentFetcher;

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Calls {
    searches: Vec<String>,
    opened: Vec<String>,
    downloaded: Vec<String>,
    parsed: Vec<PathBuf>,
}

/// HashMap-based content fetcher. Returns `Err` for unregistered keys.
/// Builder pattern: `.on_search()`, `.on_page()`, `.on_page_error()`, `.on_pdf()`.
///
/// PDFs are keyed by file name, so a download re-pointed at its cached copy
/// still parses.
pub struct MockFetcher {
    searches: HashMap<String, Vec<SearchResult>>,
    pages: HashMap<String, Result<OpenedPage, FetchError>>,
    downloads: HashMap<String, Result<DownloadedFile, FetchError>>,
    pdfs: HashMap<String, Result<ParsedPdf, FetchError>>,
    download_dir: Option<PathBuf>,
    browser_down: bool,
    calls: Mutex<Calls>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            searches: HashMap::new(),
            pages: HashMap::new(),
            downloads: HashMap::new(),
            pdfs: HashMap::new(),
            download_dir: None,
            browser_down: false,
            calls: Mutex::new(Calls::default()),
        }
    }

    /// Write every successful download into `dir` as a real file, the way
    /// the HTTP downloader lands files in its temp directory.
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    /// Every `open_page` fails as if the browser runtime were missing.
    pub fn browser_unavailable(mut self) -> Self {
        self.browser_down = true;
        self
    }

    pub fn on_search(mut self, query: &str, results: Vec<SearchResult>) -> Self {
        self.searches.insert(query.to_string(), results);
        self
    }

    pub fn on_page(mut self, url: &str, page: OpenedPage) -> Self {
        self.pages.insert(url.to_string(), Ok(page));
        self
    }

    pub fn on_page_error(mut self, url: &str, error: FetchError) -> Self {
        self.pages.insert(url.to_string(), Err(error));
        self
    }

    /// Register a downloadable PDF at `url` whose extracted text is `text`.
    pub fn on_pdf(mut self, url: &str, text: &str) -> Self {
        let path = mock_path(url);
        self.downloads.insert(
            url.to_string(),
            Ok(DownloadedFile {
                url: url.to_string(),
                path: path.clone(),
                content_type: Some("application/pdf".to_string()),
                bytes: text.len() as u64,
            }),
        );
        self.pdfs.insert(
            file_key(&path),
            Ok(ParsedPdf {
                text: text.to_string(),
                num_pages: text.matches('\u{c}').count() as u32 + 1,
                title: None,
            }),
        );
        self
    }

    /// A PDF that downloads but cannot be parsed.
    pub fn on_broken_pdf(mut self, url: &str) -> Self {
        let path = mock_path(url);
        self.downloads.insert(
            url.to_string(),
            Ok(DownloadedFile {
                url: url.to_string(),
                path: path.clone(),
                content_type: Some("application/pdf".to_string()),
                bytes: 0,
            }),
        );
        self.pdfs
            .insert(file_key(&path), Err(FetchError::Parse("pdftotext exited with status 1".into())));
        self
    }

    pub fn on_download_error(mut self, url: &str, error: FetchError) -> Self {
        self.downloads.insert(url.to_string(), Err(error));
        self
    }

    // --- Recorded calls ---

    fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn search_queries(&self) -> Vec<String> {
        self.calls().searches.clone()
    }

    pub fn opened_urls(&self) -> Vec<String> {
        self.calls().opened.clone()
    }

    pub fn downloaded_urls(&self) -> Vec<String> {
        self.calls().downloaded.clone()
    }

    pub fn parsed_paths(&self) -> Vec<PathBuf> {
        self.calls().parsed.clone()
    }
}

fn mock_path(url: &str) -> PathBuf {
    PathBuf::from(format!("/mock/downloads/{}.pdf", fairscout_archive::cache::cache_key(url)))
}

fn file_key(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, FetchError> {
        self.calls().searches.push(query.to_string());
        self.searches
            .get(query)
            .cloned()
            .ok_or_else(|| FetchError::Network(format!("MockFetcher: no search registered for {query}")))
    }

    async fn open_page(&self, url: &str) -> Result<OpenedPage, FetchError> {
        self.calls().opened.push(url.to_string());
        if self.browser_down {
            return Err(FetchError::Network(
                "failed to launch chromium: No such file or directory".into(),
            ));
        }
        self.pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Network(format!("MockFetcher: no page registered for {url}"))))
    }

    async fn download_file(&self, url: &str) -> Result<DownloadedFile, FetchError> {
        self.calls().downloaded.push(url.to_string());
        let file = self
            .downloads
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Network(format!("MockFetcher: no download registered for {url}"))))?;
        let Some(dir) = &self.download_dir else {
            return Ok(file);
        };
        let path = dir.join(file_key(&file.path));
        tokio::fs::write(&path, b"%PDF-1.4\n")
            .await
            .map_err(|e| FetchError::Network(format!("MockFetcher: {e}")))?;
        Ok(DownloadedFile { path, ..file })
    }

    async fn parse_pdf(&self, path: &Path) -> Result<ParsedPdf, FetchError> {
        self.calls().parsed.push(path.to_path_buf());
        self.pdfs.get(&file_key(path)).cloned().unwrap_or_else(|| {
            Err(FetchError::Parse(format!("MockFetcher: no pdf registered for {}", path.display())))
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A rendered page at `url` with `(href, text)` links.
pub fn page(url: &str, title: &str, text: &str, links: &[(&str, &str)]) -> OpenedPage {
    OpenedPage {
        status: 200,
        final_url: url.to_string(),
        title: title.to_string(),
        text: text.to_string(),
        links: links
            .iter()
            .map(|(href, text)| PageLink {
                href: href.to_string(),
                text: text.to_string(),
                context: String::new(),
            })
            .collect(),
    }
}

pub fn search_result(url: &str, title: &str) -> SearchResult {
    SearchResult {
        url: url.to_string(),
        title: title.to_string(),
        snippet: String::new(),
    }
}
