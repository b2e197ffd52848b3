// Browser transport for the favorites endpoint, built on fetch

use crate::property_api::{ensure_json_content_type, HttpClient, AJAX_HEADER};
use crate::error::{CoreError, CoreResult};
use async_trait::async_trait;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCache, RequestInit, RequestMode, Response};
use log::{debug, warn};

/// Same-origin AJAX GET against the site backend.
///
/// Responses bypass the HTTP cache since the id list changes between calls.
/// A response that was redirected or is not JSON (session expired, error
/// page) fails with `CoreError::Api` instead of a parse error.
pub struct WasmHttpClient;

impl WasmHttpClient {
    pub fn new() -> Self {
        Self
    }

    fn build_request(url: &str) -> CoreResult<Request> {
        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::SameOrigin);
        opts.set_cache(RequestCache::NoStore);

        let request = Request::new_with_str_and_init(url, &opts)
            .map_err(|e| CoreError::Http(format!("Invalid favorites URL {}: {:?}", url, e)))?;
        let headers = request.headers();
        for (name, value) in [("Accept", "application/json"), AJAX_HEADER] {
            headers
                .set(name, value)
                .map_err(|e| CoreError::Http(format!("Failed to set {} header: {:?}", name, e)))?;
        }
        Ok(request)
    }
}

impl Default for WasmHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl HttpClient for WasmHttpClient {
    async fn fetch_text(&self, url: &str) -> CoreResult<String> {
        debug!("Fetching favorites via fetch: {}", url);
        let request = Self::build_request(url)?;

        let window = web_sys::window()
            .ok_or_else(|| CoreError::Init("No window object available".to_string()))?;
        let resp: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| CoreError::Http(format!("Fetch failed: {:?}", e)))?
            .dyn_into()
            .map_err(|_| CoreError::Http("Fetch resolved to a non-Response value".to_string()))?;

        if !resp.ok() {
            return Err(CoreError::Http(format!("HTTP error: {} {}", resp.status(), resp.status_text())));
        }
        if resp.redirected() {
            warn!("Favorites request was redirected to {}", resp.url());
        }
        let content_type = resp.headers().get("content-type").ok().flatten();
        ensure_json_content_type(content_type.as_deref())?;

        let text_value = JsFuture::from(
            resp.text()
                .map_err(|e| CoreError::Http(format!("Failed to read body: {:?}", e)))?,
        )
        .await
        .map_err(|e| CoreError::Http(format!("Failed to read body: {:?}", e)))?;

        text_value
            .as_string()
            .ok_or_else(|| CoreError::Http("Response body is not text".to_string()))
    }
}
