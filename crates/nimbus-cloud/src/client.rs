//! HTTP client for the Nimbus Cloud API
//!
//! One [`CloudClient`] serves every resource family. It carries the base URL,
//! the permanent API token, and the optional project/region scope that most
//! resource paths embed. Handlers clone the client, which is cheap - the
//! underlying connection pool is shared.
//!
//! # Example
//!
//! ```rust,no_run
//! use nimbus_cloud::CloudClient;
//!
//! # fn main() -> nimbus_cloud::Result<()> {
//! let client = CloudClient::builder()
//!     .api_key("nim_live_...")
//!     .project_id(1234)
//!     .region_id(7)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use crate::error::{CloudError, Result};
use crate::types::Page;
use reqwest::Method;
use reqwest::header;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::{debug, trace};

/// Default API endpoint
pub const DEFAULT_API_URL: &str = "https://api.nimbuscloud.io";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Nimbus Cloud REST API
#[derive(Clone)]
pub struct CloudClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    project_id: Option<u32>,
    region_id: Option<u32>,
}

impl fmt::Debug for CloudClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("region_id", &self.region_id)
            .finish()
    }
}

impl CloudClient {
    /// Start building a client
    #[must_use]
    pub fn builder() -> CloudClientBuilder {
        CloudClientBuilder::default()
    }

    /// Base URL this client talks to (no trailing slash)
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Project and region scope for scoped resource families.
    ///
    /// Errors when the client was built without one of them; the task family
    /// is unscoped and never calls this.
    pub fn scope(&self) -> Result<(u32, u32)> {
        let project_id = self.project_id.ok_or_else(|| CloudError::ValidationError {
            message: "project ID is required for this operation".to_string(),
        })?;
        let region_id = self.region_id.ok_or_else(|| CloudError::ValidationError {
            message: "region ID is required for this operation".to_string(),
        })?;
        Ok((project_id, region_id))
    }

    /// GET a path and decode the JSON response
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::GET, &self.url(path), None::<&()>).await
    }

    /// GET a path and return the raw JSON value
    pub async fn get_raw(&self, path: &str) -> Result<serde_json::Value> {
        self.get(path).await
    }

    /// POST a JSON body to a path and decode the response
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, &self.url(path), Some(body)).await
    }

    /// POST with no request body (e.g. unassign)
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::POST, &self.url(path), None::<&()>).await
    }

    /// POST a raw JSON value and return the raw JSON response
    pub async fn post_raw(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        self.post(path, body).await
    }

    /// DELETE a path and decode the JSON response
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::DELETE, &self.url(path), None::<&()>)
            .await
    }

    /// DELETE a path and return the raw JSON value
    pub async fn delete_raw(&self, path: &str) -> Result<serde_json::Value> {
        self.delete(path).await
    }

    /// Fetch every page of a list endpoint, following `next` links.
    ///
    /// Pages are fetched lazily inside the loop; each call restarts from the
    /// first page.
    pub(crate) async fn collect_pages<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut page: Page<T> = self.get(path).await?;
        let mut items = page.results;
        while let Some(next) = page.next {
            trace!(next = %next, "following next page link");
            page = self.send(Method::GET, &next, None::<&()>).await?;
            items.append(&mut page.results);
        }
        Ok(items)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T, B>(&self, method: Method, url: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(%method, url, "sending request");

        let mut request = self
            .http
            .request(method, url)
            .header(header::AUTHORIZATION, format!("APIKey {}", self.api_key));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        debug!(status = status.as_u16(), "received response");

        let text = response.text().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(CloudError::from_status(status.as_u16(), &text));
        }

        // A few endpoints answer success with an empty body
        if text.is_empty() {
            return serde_json::from_str("null").map_err(|e| CloudError::Json(e.to_string()));
        }
        serde_json::from_str(&text).map_err(|e| {
            let preview: String = text.chars().take(200).collect();
            CloudError::Json(format!("{e} (body: {preview})"))
        })
    }
}

fn map_transport_error(err: reqwest::Error) -> CloudError {
    if err.is_timeout() {
        CloudError::Timeout(err.to_string())
    } else {
        CloudError::ConnectionError(err.to_string())
    }
}

/// Builder for [`CloudClient`]
#[derive(Debug, Default)]
pub struct CloudClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    project_id: Option<u32>,
    region_id: Option<u32>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl CloudClientBuilder {
    /// Permanent API token (required)
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// API endpoint, defaults to [`DEFAULT_API_URL`]
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Project scope for project-bound resource families
    #[must_use]
    pub fn project_id(mut self, project_id: u32) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Region scope for region-bound resource families
    #[must_use]
    pub fn region_id(mut self, region_id: u32) -> Self {
        self.region_id = Some(region_id);
        self
    }

    /// Per-request timeout, defaults to 30s
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// User-Agent header for all requests
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the client, validating required fields
    pub fn build(self) -> Result<CloudClient> {
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| CloudError::ValidationError {
                message: "API key is required".to_string(),
            })?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        url::Url::parse(&base_url).map_err(|e| CloudError::ValidationError {
            message: format!("invalid base URL '{base_url}': {e}"),
        })?;

        let http = reqwest::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .user_agent(
                self.user_agent
                    .unwrap_or_else(|| concat!("nimbus-cloud/", env!("CARGO_PKG_VERSION")).to_string()),
            )
            .build()
            .map_err(|e| CloudError::ConnectionError(e.to_string()))?;

        Ok(CloudClient {
            http,
            base_url,
            api_key,
            project_id: self.project_id,
            region_id: self.region_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> CloudClient {
        CloudClient::builder()
            .api_key("test-key")
            .base_url(base_url)
            .project_id(1)
            .region_id(2)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_api_key() {
        let err = CloudClient::builder().build().unwrap_err();
        assert!(err.is_bad_request());
        assert!(err.to_string().contains("API key"));

        let err = CloudClient::builder().api_key("").build().unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_builder_rejects_garbage_base_url() {
        let err = CloudClient::builder()
            .api_key("k")
            .base_url("not a url")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("invalid base URL"));
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = CloudClient::builder()
            .api_key("k")
            .base_url("https://api.nimbuscloud.io/")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "https://api.nimbuscloud.io");
    }

    #[test]
    fn test_scope_requires_project_and_region() {
        let client = CloudClient::builder().api_key("k").build().unwrap();
        let err = client.scope().unwrap_err();
        assert!(err.to_string().contains("project ID"));

        let client = CloudClient::builder()
            .api_key("k")
            .project_id(10)
            .build()
            .unwrap();
        let err = client.scope().unwrap_err();
        assert!(err.to_string().contains("region ID"));

        let client = CloudClient::builder()
            .api_key("k")
            .project_id(10)
            .region_id(3)
            .build()
            .unwrap();
        assert_eq!(client.scope().unwrap(), (10, 3));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = CloudClient::builder()
            .api_key("nim_live_secret")
            .build()
            .unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("nim_live_secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_get_sends_api_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/abc"))
            .and(header("authorization", "APIKey test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let value = client.get_raw("v1/tasks/abc").await.unwrap();
        assert_eq!(value, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_error_status_maps_to_variant() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "Task not found"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.get_raw("v1/tasks/missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Task not found"));
    }

    #[tokio::test]
    async fn test_empty_success_body_decodes_to_null() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/widgets/9"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let value = client.delete_raw("v1/widgets/9").await.unwrap();
        assert_eq!(value, serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_collect_pages_follows_next_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/things/1/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 3,
                "results": ["a", "b"],
                "next": format!("{}/v1/things/1/2?page=2", server.uri()),
            })))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/things/1/2"))
            .and(wiremock::matchers::query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 3,
                "results": ["c"],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let items: Vec<String> = client.collect_pages("v1/things/1/2").await.unwrap();
        assert_eq!(items, vec!["a", "b", "c"]);
    }
}
