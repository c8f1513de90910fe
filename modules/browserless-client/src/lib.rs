pub mod error;

pub use error::{BrowserlessError, Result};

use std::time::Duration;

use reqwest::header::HeaderMap;
use tracing::debug;

/// Headers Browserless sets to describe the page it rendered, as opposed to
/// the status of the `/content` call itself.
const RESPONSE_CODE_HEADER: &str = "x-response-code";
const RESPONSE_URL_HEADER: &str = "x-response-url";

/// A page rendered by Browserless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContent {
    /// Status of the target page's main document. 200 when Browserless
    /// did not report one.
    pub status: u16,
    /// URL after redirects; `None` when Browserless did not report one.
    pub final_url: Option<String>,
    pub html: String,
}

pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BrowserlessError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        })
    }

    /// Render a URL via the Browserless `/content` endpoint.
    ///
    /// A target page answering 403 still yields `Ok`; inspect
    /// `RenderedContent::status`. `Err(Api)` means Browserless itself failed.
    pub async fn content(&self, url: &str) -> Result<RenderedContent> {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }

        let body = serde_json::json!({
            "url": url,
            "gotoOptions": { "waitUntil": "networkidle2" },
        });

        let resp = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let (target_status, final_url) = target_metadata(resp.headers());
        debug!(url, target_status, final_url = ?final_url, "Browserless content rendered");

        Ok(RenderedContent {
            status: target_status,
            final_url,
            html: resp.text().await?,
        })
    }
}

fn target_metadata(headers: &HeaderMap) -> (u16, Option<String>) {
    let status = headers
        .get(RESPONSE_CODE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u16>().ok())
        .unwrap_or(200);
    let final_url = headers
        .get(RESPONSE_URL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    (status, final_url)
}
