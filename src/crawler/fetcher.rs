//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the dump, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests whose body is parsed as JSON
//! - GET requests streamed straight to a file
//!
//! No request is retried. Response status codes are logged but not
//! validated: whatever body the server sends is what gets parsed or written.

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::DumpError;
use reqwest::{Client, Response};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `crawler` - Timeouts to apply
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use anidump::config::{CrawlerConfig, UserAgentConfig};
/// use anidump::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version
    let user_agent = format!("{}/{}", user_agent.crawler_name, user_agent.crawler_version);

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(crawler.request_timeout))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs GET requests on behalf of the pipeline
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches `url` and parses the whole body as JSON
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - The parsed document
    /// * `Err(DumpError::Network)` - The request could not complete
    /// * `Err(DumpError::Json)` - The body is not valid JSON
    pub async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, DumpError> {
        let response = self.get(url).await?;

        let body = response.bytes().await.map_err(|source| DumpError::Network {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_slice(&body).map_err(|e| DumpError::json(url, e))
    }

    /// Streams the body of `url` into `destination`, replacing any existing file
    ///
    /// The body is written chunk by chunk as it arrives and is never held in
    /// memory as a whole.
    pub async fn fetch_to_file(&self, url: &str, destination: &Path) -> Result<(), DumpError> {
        let mut response = self.get(url).await?;

        let mut file = tokio::fs::File::create(destination)
            .await
            .map_err(|e| DumpError::fs(destination, e))?;

        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(|source| DumpError::Network {
            url: url.to_string(),
            source,
        })? {
            file.write_all(&chunk)
                .await
                .map_err(|e| DumpError::fs(destination, e))?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| DumpError::fs(destination, e))?;

        tracing::debug!(
            "Wrote {} bytes from {} to {}",
            written,
            url,
            destination.display()
        );
        Ok(())
    }

    async fn get(&self, url: &str) -> Result<Response, DumpError> {
        tracing::trace!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| DumpError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("GET {} returned HTTP {}", url, status.as_u16());
        }

        Ok(response)
    }
}
