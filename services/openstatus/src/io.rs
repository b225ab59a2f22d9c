//! HTTP client abstraction for testability

use std::time::Duration;

use async_trait::async_trait;

/// Header carrying the workspace API key
pub const API_KEY_HEADER: &str = "x-openstatus-key";

/// Applied to every request; triggered runs wait for all regions to report
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP response from a request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstraction over HTTP client for dependency injection
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient: Send + Sync {
    /// Send a GET request to the given URL
    async fn get(&self, url: &str, api_key: &str) -> crate::Result<HttpResponse>;

    /// Send a POST request with a JSON body
    async fn post_json(&self, url: &str, api_key: &str, body: String)
        -> crate::Result<HttpResponse>;

    /// Send a PUT request with a JSON body
    async fn put_json(&self, url: &str, api_key: &str, body: String)
        -> crate::Result<HttpResponse>;

    /// Send a DELETE request
    async fn delete(&self, url: &str, api_key: &str) -> crate::Result<HttpResponse>;
}

/// Production HTTP client using reqwest
#[derive(Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    async fn execute(
        &self,
        verb: &str,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> crate::Result<HttpResponse> {
        tracing::debug!("{} {}", verb, url);
        let response = request
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| crate::OpenstatusError::Http(format!("{} {} failed: {}", verb, url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| crate::OpenstatusError::Http(format!("Reading response body: {}", e)))?;

        tracing::debug!("{} {} -> {} ({} bytes)", verb, url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, api_key: &str) -> crate::Result<HttpResponse> {
        let request = self.client.get(url).header(API_KEY_HEADER, api_key);
        self.execute("GET", url, request).await
    }

    async fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: String,
    ) -> crate::Result<HttpResponse> {
        let request = self
            .client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        self.execute("POST", url, request).await
    }

    async fn put_json(
        &self,
        url: &str,
        api_key: &str,
        body: String,
    ) -> crate::Result<HttpResponse> {
        let request = self
            .client
            .put(url)
            .header(API_KEY_HEADER, api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        self.execute("PUT", url, request).await
    }

    async fn delete(&self, url: &str, api_key: &str) -> crate::Result<HttpResponse> {
        let request = self.client.delete(url).header(API_KEY_HEADER, api_key);
        self.execute("DELETE", url, request).await
    }
}
