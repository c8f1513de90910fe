// Chrome + Browserless page fetchers.

use std::time::Duration;

use fairscout_common::{FetchError, OpenedPage};
use rand::Rng;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use scraper::Html;

use crate::links::document_links;
use crate::readability::{html_text_fallback, html_title, html_to_text};

/// Max concurrent Chromium processes. Each instance is heavy (~100MB+ RSS).
const MAX_CONCURRENT_CHROME: usize = 2;
/// Max retry attempts for transient Chrome failures.
const CHROME_MAX_ATTEMPTS: u32 = 3;
/// Base backoff duration for Chrome retries. Actual delay is base * 3^attempt + jitter.
const CHROME_RETRY_BASE: Duration = Duration::from_secs(3);
const CHROME_TIMEOUT: Duration = Duration::from_secs(30);
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(20);
const MAX_REDIRECTS: usize = 10;
const USER_AGENT: &str = concat!("fairscout/", env!("CARGO_PKG_VERSION"));

/// Turn rendered HTML into an `OpenedPage`, or a `FetchError` when the
/// target answered with an error status or nothing at all.
pub(crate) fn build_page(
    requested_url: &str,
    final_url: Option<String>,
    status: u16,
    html: &str,
) -> Result<OpenedPage, FetchError> {
    let final_url = final_url.unwrap_or_else(|| requested_url.to_string());
    let document = Html::parse_document(html);
    let title = html_title(&document);

    if status >= 400 {
        let reason = if title.is_empty() {
            format!("HTTP {status}")
        } else {
            title
        };
        return Err(FetchError::HttpBlocked { status, reason });
    }
    if html.trim().is_empty() {
        return Err(FetchError::Network(format!("empty DOM for {requested_url}")));
    }

    let mut text = html_to_text(html.as_bytes(), Some(&final_url));
    if text.trim().is_empty() {
        text = html_text_fallback(&document);
    }

    Ok(OpenedPage {
        status,
        links: document_links(&document, &final_url),
        final_url,
        title,
        text,
    })
}

/// Where a URL ends up after redirects, and the status it answered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedTarget {
    pub(crate) final_url: String,
    pub(crate) status: u16,
}

impl ResolvedTarget {
    /// Error statuses become `HttpBlocked` before anything is rendered.
    pub(crate) fn into_result(self) -> Result<Self, FetchError> {
        if self.status >= 400 {
            let reason = reqwest::StatusCode::from_u16(self.status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("request rejected")
                .to_string();
            return Err(FetchError::HttpBlocked {
                status: self.status,
                reason,
            });
        }
        Ok(self)
    }
}

pub(crate) struct ChromeFetcher {
    semaphore: Semaphore,
    chrome_bin: String,
    client: reqwest::Client,
}

impl ChromeFetcher {
    pub(crate) fn new(chrome_bin: String) -> reqwest::Result<Self> {
        info!(chrome_bin, "ChromeFetcher initialized (max_concurrent={MAX_CONCURRENT_CHROME})");
        Ok(Self {
            semaphore: Semaphore::new(MAX_CONCURRENT_CHROME),
            chrome_bin,
            client: reqwest::Client::builder()
                .timeout(RESOLVE_TIMEOUT)
                .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
                .user_agent(USER_AGENT)
                .build()?,
        })
    }

    /// Render a page with headless Chrome.
    ///
    /// `--dump-dom` reports neither the final URL nor the status, so a plain
    /// GET resolves both first and Chrome renders the final URL.
    pub(crate) async fn fetch(&self, url: &str) -> Result<OpenedPage, FetchError> {
        let target = self.resolve(url).await?.into_result()?;
        if target.final_url != url {
            info!(url, final_url = target.final_url.as_str(), "Redirected");
        }

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| FetchError::Network("Chrome semaphore closed".into()))?;

        info!(url, fetcher = "chrome", "Fetching page");

        let html_bytes = self.run_chrome(&target.final_url).await?;
        if html_bytes.is_empty() {
            warn!(url, fetcher = "chrome", "Empty DOM output");
        }
        let html = String::from_utf8_lossy(&html_bytes);
        let page = build_page(url, Some(target.final_url), target.status, &html)?;

        info!(url, fetcher = "chrome", bytes = html.len(), links = page.links.len(), "Fetched successfully");
        Ok(page)
    }

    /// Follow redirects with a GET and report the final URL and status.
    /// The body is never read.
    async fn resolve(&self, url: &str) -> Result<ResolvedTarget, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("request to {url} failed: {e}")))?;
        Ok(ResolvedTarget {
            final_url: resp.url().to_string(),
            status: resp.status().as_u16(),
        })
    }

    /// Launch Chrome --dump-dom and return raw stdout bytes.
    async fn run_chrome(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = url::Url::parse(url).map_err(|e| FetchError::Network(format!("invalid URL {url}: {e}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::Network(format!(
                "only http/https URLs allowed, got: {}",
                parsed.scheme()
            )));
        }

        for attempt in 0..CHROME_MAX_ATTEMPTS {
            let tmp_dir = tempfile::tempdir()
                .map_err(|e| FetchError::Network(format!("failed to create temp profile dir: {e}")))?;

            let result = tokio::time::timeout(
                CHROME_TIMEOUT,
                tokio::process::Command::new(&self.chrome_bin)
                    .args([
                        "--headless",
                        "--no-sandbox",
                        "--disable-gpu",
                        "--disable-dev-shm-usage",
                        &format!("--user-data-dir={}", tmp_dir.path().display()),
                        "--dump-dom",
                        url,
                    ])
                    .kill_on_drop(true)
                    .output(),
            )
            .await;

            match result {
                Ok(Ok(output)) => {
                    if output.status.success() {
                        if output.stdout.is_empty() && attempt + 1 < CHROME_MAX_ATTEMPTS {
                            warn!(url, attempt = attempt + 1, "Chrome returned empty DOM, retrying");
                            retry_with_backoff(attempt).await;
                            continue;
                        }
                        return Ok(output.stdout);
                    }
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    if is_transient_error(&stderr) && attempt + 1 < CHROME_MAX_ATTEMPTS {
                        retry_with_backoff(attempt).await;
                        continue;
                    }
                    warn!(url, fetcher = "chrome", stderr = %stderr, "Chrome exited with error");
                    return Err(FetchError::Network(format!(
                        "chrome exited with {}",
                        output.status
                    )));
                }
                Ok(Err(e)) => {
                    let msg = e.to_string();
                    if is_transient_error(&msg) && attempt + 1 < CHROME_MAX_ATTEMPTS {
                        warn!(url, attempt = attempt + 1, error = %e, "Chrome launch failed, retrying");
                        retry_with_backoff(attempt).await;
                        continue;
                    }
                    return Err(FetchError::Network(format!(
                        "failed to launch {}: {e}",
                        self.chrome_bin
                    )));
                }
                Err(_) => {
                    if attempt + 1 < CHROME_MAX_ATTEMPTS {
                        warn!(url, attempt = attempt + 1, "Chrome timed out, retrying");
                        retry_with_backoff(attempt).await;
                        continue;
                    }
                    return Err(FetchError::Network(format!(
                        "chrome timed out after {}s",
                        CHROME_TIMEOUT.as_secs()
                    )));
                }
            }
        }

        Ok(Vec::new())
    }
}

pub(crate) struct BrowserlessFetcher {
    client: browserless_client::BrowserlessClient,
}

impl BrowserlessFetcher {
    pub(crate) fn new(
        base_url: &str,
        token: Option<&str>,
    ) -> browserless_client::Result<Self> {
        info!(base_url, "BrowserlessFetcher initialized");
        Ok(Self {
            client: browserless_client::BrowserlessClient::new(base_url, token)?,
        })
    }

    pub(crate) async fn fetch(&self, url: &str) -> Result<OpenedPage, FetchError> {
        info!(url, fetcher = "browserless", "Fetching page");

        let rendered = self.client.content(url).await.map_err(|e| match e {
            browserless_client::BrowserlessError::Api { status, message } => {
                FetchError::Network(format!("browserless returned {status}: {message}"))
            }
            other => FetchError::Network(other.to_string()),
        })?;

        let page = build_page(url, rendered.final_url, rendered.status, &rendered.html)?;

        info!(
            url,
            fetcher = "browserless",
            final_url = page.final_url.as_str(),
            bytes = rendered.html.len(),
            "Fetched successfully"
        );
        Ok(page)
    }
}

fn is_transient_error(msg: &str) -> bool {
    msg.contains("Cannot fork") || msg.contains("Resource temporarily unavailable")
}

async fn retry_with_backoff(attempt: u32) {
    let backoff = CHROME_RETRY_BASE * 3u32.pow(attempt);
    let jitter = Duration::from_millis(rand::rng().random_range(0..1000));
    tokio::time::sleep(backoff + jitter).await;
}
