// Backend client for the denormalized data behind a favorites id list

use crate::error::{CoreError, CoreResult};
use crate::models::{FavoriteId, PropertiesResponse, PropertySummary};
use async_trait::async_trait;
use log::debug;
use url::Url;

/// Abstract HTTP client trait so native and WASM builds can share the API logic
#[async_trait(?Send)]
pub trait HttpClient {
    /// Fetch text content from a URL with GET
    async fn fetch_text(&self, url: &str) -> CoreResult<String>;
}

/// Source of property summaries for a list of favorite ids
#[async_trait(?Send)]
pub trait PropertySource {
    async fn fetch_properties(&self, ids: &[FavoriteId]) -> CoreResult<Vec<PropertySummary>>;
}

/// Query parameter name the backend expects, repeated once per id
pub const PROPERTY_IDS_PARAM: &str = "property_ids[]";

/// Header marking the request as an in-page AJAX call; the backend answers
/// such requests with JSON instead of a rendered page
pub const AJAX_HEADER: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

/// Reject responses that are not JSON, typically a login or error page
/// served with status 200 after a redirect
pub fn ensure_json_content_type(content_type: Option<&str>) -> CoreResult<()> {
    let Some(content_type) = content_type else {
        return Err(CoreError::Api("response has no content type".to_string()));
    };
    let mime = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    if mime == "application/json" || mime.ends_with("+json") {
        Ok(())
    } else {
        Err(CoreError::Api(format!("expected a JSON response, got {}", mime)))
    }
}

/// Build `<endpoint>?property_ids[]=12&property_ids[]=45`, keeping id order.
///
/// `endpoint` may be relative (`/property/ajax/favorites/`) when `base_url` is given.
pub fn build_properties_url(base_url: &str, endpoint: &str, ids: &[FavoriteId]) -> CoreResult<Url> {
    let base = Url::parse(base_url)?;
    let mut url = base.join(endpoint)?;
    {
        let mut query = url.query_pairs_mut();
        for id in ids {
            query.append_pair(PROPERTY_IDS_PARAM, &id.to_string());
        }
    }
    Ok(url)
}

/// Parse the `{ success, properties }` envelope
pub fn parse_properties_response(body: &str) -> CoreResult<Vec<PropertySummary>> {
    let response: PropertiesResponse = serde_json::from_str(body)?;
    if !response.success {
        let reason = response.error.unwrap_or_else(|| "backend reported failure".to_string());
        return Err(CoreError::Api(reason));
    }
    Ok(response.properties)
}

/// Favorite properties endpoint bound to an HTTP transport
pub struct PropertyApi<H: HttpClient> {
    http: H,
    base_url: String,
    endpoint: String,
}

impl<H: HttpClient> PropertyApi<H> {
    pub fn new(http: H, base_url: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait(?Send)]
impl<H: HttpClient> PropertySource for PropertyApi<H> {
    async fn fetch_properties(&self, ids: &[FavoriteId]) -> CoreResult<Vec<PropertySummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let url = build_properties_url(&self.base_url, &self.endpoint, ids)?;
        debug!("Fetching {} favorite properties from {}", ids.len(), url);
        let body = self.http.fetch_text(url.as_str()).await?;
        parse_properties_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn ids(raw: &[i64]) -> Vec<FavoriteId> {
        raw.iter().map(|r| FavoriteId::new(*r).unwrap()).collect()
    }

    struct CannedHttp {
        body: CoreResult<String>,
        requested: RefCell<Vec<String>>,
    }

    #[async_trait(?Send)]
    impl HttpClient for CannedHttp {
        async fn fetch_text(&self, url: &str) -> CoreResult<String> {
            self.requested.borrow_mut().push(url.to_string());
            match &self.body {
                Ok(body) => Ok(body.clone()),
                Err(e) => Err(CoreError::Http(e.to_string())),
            }
        }
    }

    #[test]
    fn url_repeats_param_per_id_in_order() {
        let url = build_properties_url("https://example.com", "/property/ajax/favorites/", &ids(&[12, 45, 301])).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(url.path(), "/property/ajax/favorites/");
        assert_eq!(
            pairs,
            vec![
                ("property_ids[]".to_string(), "12".to_string()),
                ("property_ids[]".to_string(), "45".to_string()),
                ("property_ids[]".to_string(), "301".to_string()),
            ]
        );
    }

    #[test]
    fn only_json_content_types_pass() {
        assert!(ensure_json_content_type(Some("application/json")).is_ok());
        assert!(ensure_json_content_type(Some("Application/JSON; charset=utf-8")).is_ok());
        assert!(ensure_json_content_type(Some("application/problem+json")).is_ok());

        let err = ensure_json_content_type(Some("text/html; charset=utf-8")).unwrap_err();
        assert!(matches!(err, CoreError::Api(ref m) if m.contains("text/html")));
        assert!(ensure_json_content_type(None).is_err());
    }

    #[test]
    fn response_with_success_false_is_an_error() {
        let err = parse_properties_response(r#"{"success": false, "error": "boom"}"#).unwrap_err();
        assert!(matches!(err, CoreError::Api(ref m) if m == "boom"));
        assert!(parse_properties_response("<html>").is_err());
    }

    #[tokio::test]
    async fn api_fetches_and_parses() {
        let http = CannedHttp {
            body: Ok(r#"{"success": true, "properties": [
                {"id": 12, "title": "Condo", "slug": "condo", "price_display": "$100", "district_name": "Patong"}
            ]}"#
                .to_string()),
            requested: RefCell::new(Vec::new()),
        };
        let api = PropertyApi::new(http, "https://example.com", "/favorites/");

        let props = api.fetch_properties(&ids(&[12])).await.unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].district_name, "Patong");
        assert_eq!(api.http.requested.borrow().len(), 1);
    }

    #[tokio::test]
    async fn empty_id_list_skips_request() {
        let http = CannedHttp {
            body: Ok("unused".to_string()),
            requested: RefCell::new(Vec::new()),
        };
        let api = PropertyApi::new(http, "https://example.com", "/favorites/");
        assert!(api.fetch_properties(&[]).await.unwrap().is_empty());
        assert!(api.http.requested.borrow().is_empty());
    }
}
