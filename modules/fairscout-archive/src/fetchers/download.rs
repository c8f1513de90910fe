// Streaming HTTP downloader with a hard size cap.

use std::path::{Path, PathBuf};
use std::time::Duration;

use fairscout_common::{DownloadedFile, FetchError};
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);
const USER_AGENT: &str = concat!("fairscout/", env!("CARGO_PKG_VERSION"));

pub(crate) struct HttpDownloader {
    client: reqwest::Client,
    dir: PathBuf,
    max_bytes: u64,
}

impl HttpDownloader {
    pub(crate) fn new(dir: PathBuf, max_bytes: u64) -> reqwest::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(DOWNLOAD_TIMEOUT)
                .user_agent(USER_AGENT)
                .build()?,
            dir,
            max_bytes,
        })
    }

    /// Stream `url` to a fresh file under the download directory.
    ///
    /// A declared `Content-Length` over the cap fails before any body is
    /// read; an undeclared body is cut off once it crosses the cap and the
    /// partial file removed.
    pub(crate) async fn download(&self, url: &str) -> Result<DownloadedFile, FetchError> {
        info!(url, max_bytes = self.max_bytes, "Downloading file");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("download request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpBlocked {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("download rejected").to_string(),
            });
        }

        if let Some(declared) = resp.content_length() {
            if declared > self.max_bytes {
                warn!(url, declared, limit = self.max_bytes, "Download exceeds size cap");
                return Err(FetchError::TooLarge {
                    bytes: declared,
                    limit: self.max_bytes,
                });
            }
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| FetchError::Network(format!("cannot create {}: {e}", self.dir.display())))?;
        let path = self.dir.join(format!(
            "{}.{}",
            uuid::Uuid::new_v4(),
            file_extension(url, content_type.as_deref())
        ));

        let written = match self.stream_to(resp, &path).await {
            Ok(n) => n,
            Err(e) => {
                let _ = tokio::fs::remove_file(&path).await;
                return Err(e);
            }
        };

        info!(url, bytes = written, path = %path.display(), "Download complete");
        Ok(DownloadedFile {
            url: url.to_string(),
            path,
            content_type,
            bytes: written,
        })
    }

    async fn stream_to(&self, resp: reqwest::Response, path: &Path) -> Result<u64, FetchError> {
        let io_err = |e: std::io::Error| FetchError::Network(format!("write failed: {e}"));
        let mut file = tokio::fs::File::create(path).await.map_err(io_err)?;
        let mut stream = resp.bytes_stream();
        let mut total: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::Network(format!("download interrupted: {e}")))?;
            total += chunk.len() as u64;
            if total > self.max_bytes {
                return Err(FetchError::TooLarge {
                    bytes: total,
                    limit: self.max_bytes,
                });
            }
            file.write_all(&chunk).await.map_err(io_err)?;
        }
        file.flush().await.map_err(io_err)?;
        Ok(total)
    }
}

/// Extension for the stored file: the URL path's own when it has a short
/// alphanumeric one, `pdf` for PDF content types, `bin` otherwise.
pub(crate) fn file_extension(url: &str, content_type: Option<&str>) -> String {
    let from_path = url::Url::parse(url).ok().and_then(|u| {
        let last = u.path_segments()?.next_back()?.to_string();
        let (_, ext) = last.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        (!ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .then_some(ext)
    });
    from_path.unwrap_or_else(|| match content_type {
        Some(ct) if ct.to_ascii_lowercase().contains("pdf") => "pdf".to_string(),
        _ => "bin".to_string(),
    })
}
