use std::io::Read;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use reqwest::Url;
use tracing::debug;

use crate::error::ScrapeError;

/// Thin wrapper over one shared HTTP client. Requests are issued one at a time.
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(user_agent: Option<&str>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(ua) = user_agent {
            builder = builder.user_agent(ua);
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// GET `url` and return the body, gunzipped when the URL names a `.gz` resource.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        let raw = self.fetch_raw(url).await?;
        if is_compressed(url) {
            let bytes = gunzip(&raw).map_err(|source| ScrapeError::Decompress {
                url: url.to_string(),
                source,
            })?;
            debug!("Decompressed {} ({} -> {} bytes)", url, raw.len(), bytes.len());
            Ok(bytes)
        } else {
            Ok(raw)
        }
    }

    /// Page body as text. Plain responses are decoded with the charset named in
    /// `Content-Type` (UTF-8 when absent); a gunzipped body is read as lossy UTF-8.
    pub async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError> {
        if is_compressed(url) {
            let bytes = self.fetch(url).await?;
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }
        let response = self.send(url).await?;
        let text = response.text().await.map_err(|source| ScrapeError::Transport {
            url: url.to_string(),
            source,
        })?;
        debug!("Fetched {} ({} chars)", url, text.len());
        Ok(text)
    }

    async fn fetch_raw(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        let response = self.send(url).await?;
        let body = response.bytes().await.map_err(|source| ScrapeError::Transport {
            url: url.to_string(),
            source,
        })?;
        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body.to_vec())
    }

    /// Issue the GET; any non-2xx status is an error.
    async fn send(&self, url: &str) -> Result<reqwest::Response, ScrapeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ScrapeError::Transport {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }
}

/// True when the URL path (query and fragment ignored) ends in `.gz`.
pub fn is_compressed(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().ends_with(".gz"),
        Err(_) => url.ends_with(".gz"),
    }
}

fn gunzip(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
