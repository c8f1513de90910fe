// Serper (Google Search) fetcher.

use std::time::Duration;

use fairscout_common::{FetchError, SearchResult};
use tracing::{info, warn};

const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";

#[derive(Debug, serde::Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperResult>,
}

#[derive(Debug, serde::Deserialize)]
struct SerperResult {
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

pub(crate) struct SerperFetcher {
    api_key: String,
    client: reqwest::Client,
}

impl SerperFetcher {
    pub(crate) fn new(api_key: &str) -> reqwest::Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()?,
        })
    }

    pub(crate) async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, FetchError> {
        info!(query, max_results, "Serper search");

        let body = serde_json::json!({
            "q": query,
            "num": max_results,
        });

        let resp = self
            .client
            .post(SERPER_ENDPOINT)
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("Serper API request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(query, status = status.as_u16(), "Serper search rejected");
            return Err(FetchError::HttpBlocked {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("search rejected").to_string(),
            });
        }

        let data: SerperResponse = resp
            .json()
            .await
            .map_err(|e| FetchError::Parse(format!("failed to parse Serper response: {e}")))?;

        let results = into_results(data, max_results);
        info!(query, count = results.len(), "Serper search complete");
        Ok(results)
    }
}

fn into_results(data: SerperResponse, max_results: usize) -> Vec<SearchResult> {
    data.organic
        .into_iter()
        .filter(|r| !r.link.is_empty())
        .take(max_results)
        .map(|r| SearchResult {
            url: r.link,
            title: r.title,
            snippet: r.snippet,
        })
        .collect()
}
