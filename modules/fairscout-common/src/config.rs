use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::error::FairScoutError;

/// Hard caps on one discovery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pub max_page_opens: u32,
    pub max_downloads: u32,
    pub max_runtime: Duration,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_page_opens: 30,
            max_downloads: 15,
            max_runtime: Duration::from_secs(10 * 60),
        }
    }
}

/// Which renderer backs `open_page`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageBackendConfig {
    /// Local headless Chromium (`CHROME_BIN`, default `chromium`).
    Chrome,
    Browserless { base_url: String, token: Option<String> },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub serper_api_key: String,
    pub page_backend: PageBackendConfig,
    pub cache_dir: PathBuf,
    pub download_dir: PathBuf,
    pub max_download_bytes: u64,
    pub budget: Budget,
}

pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 25 * 1024 * 1024;

impl Config {
    pub fn from_env() -> Result<Self, FairScoutError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` is this over `std::env`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, FairScoutError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let page_backend = match non_empty("BROWSERLESS_URL") {
            Some(base_url) => PageBackendConfig::Browserless {
                base_url,
                token: non_empty("BROWSERLESS_TOKEN"),
            },
            None => PageBackendConfig::Chrome,
        };

        let cache_dir = non_empty("FAIRSCOUT_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".fairscout-cache"));
        let download_dir = non_empty("FAIRSCOUT_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("fairscout-downloads"));

        let defaults = Budget::default();
        let budget = Budget {
            max_page_opens: parse_or(&non_empty, "FAIRSCOUT_MAX_PAGE_OPENS", defaults.max_page_opens)?,
            max_downloads: parse_or(&non_empty, "FAIRSCOUT_MAX_DOWNLOADS", defaults.max_downloads)?,
            max_runtime: Duration::from_secs(parse_or(
                &non_empty,
                "FAIRSCOUT_MAX_RUNTIME_SECS",
                defaults.max_runtime.as_secs(),
            )?),
        };

        Ok(Self {
            serper_api_key: non_empty("SERPER_API_KEY").unwrap_or_default(),
            page_backend,
            cache_dir,
            download_dir,
            max_download_bytes: parse_or(
                &non_empty,
                "FAIRSCOUT_MAX_DOWNLOAD_BYTES",
                DEFAULT_MAX_DOWNLOAD_BYTES,
            )?,
            budget,
        })
    }

    /// Log the effective configuration without secrets.
    pub fn log_redacted(&self) {
        let backend = match &self.page_backend {
            PageBackendConfig::Chrome => "chrome".to_string(),
            PageBackendConfig::Browserless { base_url, .. } => format!("browserless ({base_url})"),
        };
        info!(
            page_backend = %backend,
            search_enabled = !self.serper_api_key.is_empty(),
            cache_dir = %self.cache_dir.display(),
            download_dir = %self.download_dir.display(),
            max_download_bytes = self.max_download_bytes,
            max_page_opens = self.budget.max_page_opens,
            max_downloads = self.budget.max_downloads,
            max_runtime_secs = self.budget.max_runtime.as_secs(),
            "Configuration loaded"
        );
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, FairScoutError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| FairScoutError::Config(format!("{key} must be a number, got {raw:?}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.page_backend, PageBackendConfig::Chrome);
        assert_eq!(config.budget, Budget::default());
        assert_eq!(config.max_download_bytes, DEFAULT_MAX_DOWNLOAD_BYTES);
        assert!(config.serper_api_key.is_empty());
    }

    #[test]
    fn browserless_backend_from_env() {
        let config = Config::from_lookup(lookup(&[
            ("BROWSERLESS_URL", "http://localhost:3000"),
            ("BROWSERLESS_TOKEN", "secret"),
        ]))
        .unwrap();
        assert_eq!(
            config.page_backend,
            PageBackendConfig::Browserless {
                base_url: "http://localhost:3000".into(),
                token: Some("secret".into()),
            }
        );
    }

    #[test]
    fn budget_overrides_parse() {
        let config = Config::from_lookup(lookup(&[
            ("FAIRSCOUT_MAX_PAGE_OPENS", "0"),
            ("FAIRSCOUT_MAX_RUNTIME_SECS", "90"),
        ]))
        .unwrap();
        assert_eq!(config.budget.max_page_opens, 0);
        assert_eq!(config.budget.max_downloads, 15);
        assert_eq!(config.budget.max_runtime, Duration::from_secs(90));
    }

    #[test]
    fn non_numeric_budget_is_a_config_error() {
        let err = Config::from_lookup(lookup(&[("FAIRSCOUT_MAX_DOWNLOADS", "lots")])).unwrap_err();
        assert!(matches!(err, FairScoutError::Config(msg) if msg.contains("FAIRSCOUT_MAX_DOWNLOADS")));
    }
}
