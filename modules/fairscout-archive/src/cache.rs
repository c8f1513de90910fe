//! File-backed cache for rendered pages and downloaded files.
//!
//! Layout under the root:
//!
//! ```text
//! pages/<host>/<key>.json            serialized OpenedPage
//! downloads/<host>/<key>.<ext>       raw file bytes
//! metadata/<host>/<key>.<kind>.json  CacheMetadata
//! ```
//!
//! An entry is usable while `now - stored_at < kind.ttl()`. A payload without
//! metadata, or metadata without a payload, is a miss.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use fairscout_common::{DownloadedFile, OpenedPage};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::Result;
use crate::fetchers::download::file_extension;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKind {
    Page,
    Download,
}

impl CacheKind {
    pub fn ttl(&self) -> Duration {
        match self {
            CacheKind::Page => Duration::hours(24),
            CacheKind::Download => Duration::days(7),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            CacheKind::Page => "page",
            CacheKind::Download => "download",
        }
    }

    fn payload_dir(&self) -> &'static str {
        match self {
            CacheKind::Page => "pages",
            CacheKind::Download => "downloads",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub url: String,
    pub kind: CacheKind,
    pub stored_at: DateTime<Utc>,
    pub content_type: Option<String>,
    pub bytes: u64,
    /// File name of the payload, relative to its host directory.
    pub payload: String,
}

impl CacheMetadata {
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now - self.stored_at < self.kind.ttl()
    }
}

/// A fresh entry: its metadata and where the payload lives.
#[derive(Debug, Clone)]
pub struct CacheHit {
    pub metadata: CacheMetadata,
    pub payload_path: PathBuf,
}

pub struct CacheStore {
    root: PathBuf,
}

/// First 16 hex chars of the URL's SHA-256.
pub fn cache_key(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    hex::encode(digest)[..16].to_string()
}

/// Host directory name: lowercased host with anything outside
/// `[a-z0-9.-]` replaced, `_unknown` for unparseable URLs.
fn host_dir(url: &str) -> String {
    match fairscout_common::extract_host(url) {
        Some(host) => host
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect(),
        None => "_unknown".to_string(),
    }
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn metadata_path(&self, kind: CacheKind, url: &str) -> PathBuf {
        self.root
            .join("metadata")
            .join(host_dir(url))
            .join(format!("{}.{}.json", cache_key(url), kind.as_str()))
    }

    fn payload_dir(&self, kind: CacheKind, url: &str) -> PathBuf {
        self.root.join(kind.payload_dir()).join(host_dir(url))
    }

    /// Metadata for `url` regardless of freshness.
    pub async fn metadata(&self, kind: CacheKind, url: &str) -> Result<Option<CacheMetadata>> {
        let path = self.metadata_path(kind, url);
        match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(meta) => Ok(Some(meta)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Corrupt cache metadata, treating as miss");
                    Ok(None)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn lookup(&self, kind: CacheKind, url: &str) -> Result<Option<CacheHit>> {
        self.lookup_at(kind, url, Utc::now()).await
    }

    pub async fn lookup_at(
        &self,
        kind: CacheKind,
        url: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CacheHit>> {
        let Some(metadata) = self.metadata(kind, url).await? else {
            return Ok(None);
        };
        if metadata.url != url || !metadata.is_fresh_at(now) {
            debug!(url, kind = kind.as_str(), "Cache entry stale");
            return Ok(None);
        }
        let payload_path = self.payload_dir(kind, url).join(&metadata.payload);
        if !tokio::fs::try_exists(&payload_path).await? {
            return Ok(None);
        }
        Ok(Some(CacheHit {
            metadata,
            payload_path,
        }))
    }

    // --- Pages ---

    pub async fn get_page(&self, url: &str) -> Result<Option<OpenedPage>> {
        self.get_page_at(url, Utc::now()).await
    }

    pub async fn get_page_at(&self, url: &str, now: DateTime<Utc>) -> Result<Option<OpenedPage>> {
        let Some(hit) = self.lookup_at(CacheKind::Page, url, now).await? else {
            return Ok(None);
        };
        let bytes = tokio::fs::read(&hit.payload_path).await?;
        match serde_json::from_slice(&bytes) {
            Ok(page) => Ok(Some(page)),
            Err(e) => {
                warn!(url, error = %e, "Corrupt cached page, treating as miss");
                Ok(None)
            }
        }
    }

    pub async fn put_page(&self, url: &str, page: &OpenedPage) -> Result<()> {
        self.put_page_at(url, page, Utc::now()).await
    }

    pub async fn put_page_at(&self, url: &str, page: &OpenedPage, now: DateTime<Utc>) -> Result<()> {
        let dir = self.payload_dir(CacheKind::Page, url);
        tokio::fs::create_dir_all(&dir).await?;
        let payload = format!("{}.json", cache_key(url));
        let body = serde_json::to_vec(page)?;
        let bytes = body.len() as u64;
        tokio::fs::write(dir.join(&payload), body).await?;

        self.write_metadata(CacheMetadata {
            url: url.to_string(),
            kind: CacheKind::Page,
            stored_at: now,
            content_type: Some("text/html".to_string()),
            bytes,
            payload,
        })
        .await;
        Ok(())
    }

    // --- Downloads ---

    pub async fn get_download(&self, url: &str) -> Result<Option<DownloadedFile>> {
        self.get_download_at(url, Utc::now()).await
    }

    pub async fn get_download_at(
        &self,
        url: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<DownloadedFile>> {
        Ok(self
            .lookup_at(CacheKind::Download, url, now)
            .await?
            .map(|hit| DownloadedFile {
                url: url.to_string(),
                path: hit.payload_path,
                content_type: hit.metadata.content_type,
                bytes: hit.metadata.bytes,
            }))
    }

    /// Copy a downloaded file into the cache. Returns the file re-pointed
    /// at its cached copy.
    pub async fn put_download(&self, file: &DownloadedFile) -> Result<DownloadedFile> {
        self.put_download_at(file, Utc::now()).await
    }

    pub async fn put_download_at(
        &self,
        file: &DownloadedFile,
        now: DateTime<Utc>,
    ) -> Result<DownloadedFile> {
        let dir = self.payload_dir(CacheKind::Download, &file.url);
        tokio::fs::create_dir_all(&dir).await?;
        let payload = format!(
            "{}.{}",
            cache_key(&file.url),
            file_extension(&file.url, file.content_type.as_deref())
        );
        let cached_path = dir.join(&payload);
        tokio::fs::copy(&file.path, &cached_path).await?;

        self.write_metadata(CacheMetadata {
            url: file.url.clone(),
            kind: CacheKind::Download,
            stored_at: now,
            content_type: file.content_type.clone(),
            bytes: file.bytes,
            payload,
        })
        .await;

        Ok(DownloadedFile {
            path: cached_path,
            ..file.clone()
        })
    }

    /// Metadata goes last, so a crash mid-write leaves an orphan payload,
    /// which reads as a miss.
    async fn write_metadata(&self, metadata: CacheMetadata) {
        let path = self.metadata_path(metadata.kind, &metadata.url);
        let result = async {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let body = serde_json::to_vec_pretty(&metadata)?;
            tokio::fs::write(&path, body).await?;
            Ok::<_, crate::error::ArchiveError>(())
        }
        .await;
        if let Err(e) = result {
            warn!(url = metadata.url.as_str(), error = %e, "Failed to write cache metadata");
        }
    }
}
