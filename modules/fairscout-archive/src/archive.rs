// Archive: the public entry point to the outside world.
// Callers open pages, search, download files, and parse PDFs through it;
// each method maps collaborator failures onto `FetchError`.

use std::path::{Path, PathBuf};

use fairscout_common::{
    Config, DownloadedFile, FetchError, OpenedPage, PageBackendConfig, ParsedPdf, SearchResult,
};
use tracing::info;

use crate::error::{ArchiveError, Result};
use crate::fetchers::download::HttpDownloader;
use crate::fetchers::page::{BrowserlessFetcher, ChromeFetcher};
use crate::fetchers::pdf::PdfExtractor;
use crate::fetchers::search::SerperFetcher;

/// Configuration for which concrete fetchers to use.
pub struct ArchiveConfig {
    pub page_backend: PageBackendConfig,
    pub serper_api_key: String,
    pub chrome_bin: String,
    pub pdftotext_bin: String,
    pub pdfinfo_bin: String,
    pub download_dir: PathBuf,
    pub max_download_bytes: u64,
}

impl ArchiveConfig {
    /// Derive from the application config. Binary paths come from
    /// `CHROME_BIN`, `PDFTOTEXT_BIN`, `PDFINFO_BIN`.
    pub fn from_config(config: &Config) -> Self {
        let bin = |key: &str, default: &str| {
            std::env::var(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            page_backend: config.page_backend.clone(),
            serper_api_key: config.serper_api_key.clone(),
            chrome_bin: bin("CHROME_BIN", "chromium"),
            pdftotext_bin: bin("PDFTOTEXT_BIN", "pdftotext"),
            pdfinfo_bin: bin("PDFINFO_BIN", "pdfinfo"),
            download_dir: config.download_dir.clone(),
            max_download_bytes: config.max_download_bytes,
        }
    }
}

enum PageBackend {
    Chrome(ChromeFetcher),
    Browserless(BrowserlessFetcher),
}

/// The archive: fetch content from the web.
pub struct Archive {
    page: PageBackend,
    search: Option<SerperFetcher>,
    downloader: HttpDownloader,
    pdf: PdfExtractor,
}

impl Archive {
    pub fn new(config: ArchiveConfig) -> Result<Self> {
        let page = match config.page_backend {
            PageBackendConfig::Chrome => PageBackend::Chrome(
                ChromeFetcher::new(config.chrome_bin)
                    .map_err(|e| ArchiveError::Setup(e.to_string()))?,
            ),
            PageBackendConfig::Browserless { base_url, token } => PageBackend::Browserless(
                BrowserlessFetcher::new(&base_url, token.as_deref())?,
            ),
        };

        let search = if config.serper_api_key.is_empty() {
            info!("SERPER_API_KEY not set, web search disabled");
            None
        } else {
            Some(
                SerperFetcher::new(&config.serper_api_key)
                    .map_err(|e| ArchiveError::Setup(e.to_string()))?,
            )
        };

        let downloader = HttpDownloader::new(config.download_dir, config.max_download_bytes)
            .map_err(|e| ArchiveError::Setup(e.to_string()))?;

        Ok(Self {
            page,
            search,
            downloader,
            pdf: PdfExtractor::new(config.pdftotext_bin, config.pdfinfo_bin),
        })
    }

    /// Web search. Without an API key this is always empty.
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> std::result::Result<Vec<SearchResult>, FetchError> {
        match self.search {
            Some(ref fetcher) => fetcher.search(query, max_results).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn open_page(&self, url: &str) -> std::result::Result<OpenedPage, FetchError> {
        match self.page {
            PageBackend::Chrome(ref chrome) => chrome.fetch(url).await,
            PageBackend::Browserless(ref browserless) => browserless.fetch(url).await,
        }
    }

    pub async fn download_file(&self, url: &str) -> std::result::Result<DownloadedFile, FetchError> {
        self.downloader.download(url).await
    }

    pub async fn parse_pdf(&self, path: &Path) -> std::result::Result<ParsedPdf, FetchError> {
        self.pdf.parse(path).await
    }
}
