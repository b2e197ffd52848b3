// Native HTTP client implementation using reqwest

use crate::property_api::{ensure_json_content_type, HttpClient, AJAX_HEADER};
use crate::error::{CoreError, CoreResult};
use async_trait::async_trait;
use reqwest::Client;
use log::debug;
use std::time::Duration;

/// Native HTTP client using reqwest
pub struct NativeHttpClient {
    client: Client,
}

impl NativeHttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Client whose requests give up after `timeout`
    pub fn with_timeout(timeout: Duration) -> CoreResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Init(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Default for NativeHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl HttpClient for NativeHttpClient {
    async fn fetch_text(&self, url: &str) -> CoreResult<String> {
        debug!("Fetching URL: {}", url);

        let response = self.client.get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(AJAX_HEADER.0, AJAX_HEADER.1)
            .send()
            .await
            .map_err(|e| CoreError::Http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Http(format!("HTTP error: {}", status)));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());
        ensure_json_content_type(content_type)?;

        let text = response.text()
            .await
            .map_err(|e| CoreError::Http(format!("Failed to read response body: {}", e)))?;

        Ok(text)
    }
}
