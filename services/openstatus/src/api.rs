//! openstatus REST API gateway

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{OpenstatusError, Result};
use crate::gateway::{MonitorGateway, RemoteMonitor, RunResult};
use crate::io::{HttpClient, HttpResponse};
use crate::model::{
    Assertion, AssertionKind, AssertionTarget, Compare, Frequency, HttpRequest, Method,
    MonitorKind, MonitorSpec, Region, Request, TcpRequest,
};
use crate::normalize::normalize_monitor;

pub const API_BASE_URL: &str = "https://api.openstatus.dev/v1";

/// Workspace the API key belongs to
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Workspace {
    pub name: String,
    pub slug: String,
    pub plan: String,
}

/// Monitor gateway backed by the openstatus REST API
pub struct ApiGateway {
    base_url: String,
    api_key: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for ApiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiGateway")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ApiGateway {
    pub fn new(api_key: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        Self::with_base_url(API_BASE_URL, api_key, http)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::debug!("Created ApiGateway for {}", base_url);
        Self {
            base_url,
            api_key: api_key.into(),
            http,
        }
    }

    /// Look up the workspace of the configured API key
    pub async fn whoami(&self) -> Result<Workspace> {
        let url = format!("{}/whoami", self.base_url);
        let response = self.http.get(&url, &self.api_key).await?;
        let response = expect_success("get workspace information", response)?;
        decode(&response.body)
    }

    fn monitor_url(&self, path: &str) -> String {
        format!("{}/monitor{}", self.base_url, path)
    }
}

#[async_trait]
impl MonitorGateway for ApiGateway {
    async fn create(&self, spec: &MonitorSpec) -> Result<RemoteMonitor> {
        let url = self.monitor_url(&format!("/{}", spec.kind()));
        let body = serde_json::to_string(spec)?;
        tracing::debug!("Creating monitor '{}'", spec.name);

        let response = self.http.post_json(&url, &self.api_key, body).await?;
        let response = expect_success("create monitor", response)?;
        decode::<ApiMonitor>(&response.body)?.into_remote()
    }

    async fn update(&self, id: i64, spec: &MonitorSpec) -> Result<RemoteMonitor> {
        let url = self.monitor_url(&format!("/{}/{}", spec.kind(), id));
        let body = serde_json::to_string(spec)?;
        tracing::debug!("Updating monitor {} ('{}')", id, spec.name);

        let response = self.http.put_json(&url, &self.api_key, body).await?;
        let response = expect_success("update monitor", response)?;
        decode::<ApiMonitor>(&response.body)?.into_remote()
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let url = self.monitor_url(&format!("/{}", id));
        let response = self.http.delete(&url, &self.api_key).await?;

        if response.status == 404 {
            tracing::debug!("Monitor {} was already gone", id);
            return Ok(());
        }
        expect_success("delete monitor", response)?;
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<RemoteMonitor> {
        let url = self.monitor_url(&format!("/{}", id));
        let response = self.http.get(&url, &self.api_key).await?;
        let response = expect_success("get monitor", response)?;
        decode::<ApiMonitor>(&response.body)?.into_remote()
    }

    async fn list(&self) -> Result<Vec<RemoteMonitor>> {
        let url = self.monitor_url("");
        let response = self.http.get(&url, &self.api_key).await?;
        let response = expect_success("list monitors", response)?;

        let monitors: Vec<ApiMonitor> = decode(&response.body)?;
        tracing::debug!("Fetched {} monitors", monitors.len());
        monitors.into_iter().map(ApiMonitor::into_remote).collect()
    }

    async fn trigger(&self, id: i64) -> Result<Vec<RunResult>> {
        let url = self.monitor_url(&format!("/{}/run", id));
        let response = self
            .http
            .post_json(&url, &self.api_key, "{}".to_string())
            .await?;
        let response = expect_success("trigger monitor", response)?;

        let results: Vec<ApiRunResult> = decode(&response.body)?;
        Ok(results.into_iter().map(RunResult::from).collect())
    }
}

fn expect_success(operation: &str, response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }
    tracing::debug!("{} returned {}: {}", operation, response.status, response.body);
    Err(OpenstatusError::Api(format!(
        "Failed to {} (status {})",
        operation, response.status
    )))
}

fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| OpenstatusError::InvalidResponse(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct ApiHeader {
    #[serde(default)]
    key: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct ApiAssertion {
    #[serde(rename = "type")]
    kind: String,
    compare: String,
    #[serde(default)]
    key: Option<String>,
    target: AssertionTarget,
}

/// Monitor as returned by the REST API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMonitor {
    id: i64,
    name: String,
    #[serde(default)]
    url: String,
    periodicity: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    regions: Option<Vec<String>>,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    public: bool,
    #[serde(default)]
    timeout: Option<u64>,
    #[serde(default, alias = "degraded_after")]
    degraded_after: Option<u64>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    headers: Option<Vec<ApiHeader>>,
    #[serde(default)]
    assertions: Option<Vec<ApiAssertion>>,
    #[serde(default)]
    retry: Option<u32>,
    #[serde(default)]
    job_type: Option<String>,
}

fn invalid(id: i64, reason: impl std::fmt::Display) -> OpenstatusError {
    OpenstatusError::InvalidResponse(format!("monitor {}: {}", id, reason))
}

impl ApiMonitor {
    fn into_remote(self) -> Result<RemoteMonitor> {
        let id = self.id;

        let kind: MonitorKind = match self.job_type.as_deref() {
            None | Some("") => return Err(invalid(id, "missing jobType")),
            Some(raw) => raw.parse().map_err(|e| invalid(id, e))?,
        };

        let request = match kind {
            MonitorKind::Http => {
                let method = match self.method.as_deref() {
                    None | Some("") => Method::Get,
                    Some(raw) => raw.to_uppercase().parse().map_err(|e| invalid(id, e))?,
                };
                let headers: BTreeMap<String, String> = self
                    .headers
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|h| !h.key.is_empty())
                    .map(|h| (h.key, h.value))
                    .collect();
                Request::Http(HttpRequest {
                    url: self.url,
                    method,
                    headers,
                    body: self.body.unwrap_or_default(),
                })
            }
            MonitorKind::Tcp => Request::Tcp(split_host_port(&self.url).ok_or_else(|| {
                invalid(id, format!("tcp address {:?} is not host:port", self.url))
            })?),
        };

        let regions = self
            .regions
            .unwrap_or_default()
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| r.parse::<Region>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| invalid(id, e))?;

        let assertions = self
            .assertions
            .unwrap_or_default()
            .into_iter()
            .map(|a| convert_assertion(a).map_err(|e| invalid(id, e)))
            .collect::<Result<Vec<_>>>()?;

        let mut spec = MonitorSpec {
            name: self.name,
            description: self.description.filter(|d| !d.is_empty()),
            frequency: self.periodicity.parse::<Frequency>().map_err(|e| invalid(id, e))?,
            active: self.active,
            public: self.public,
            retry: self.retry.unwrap_or_default(),
            regions,
            degraded_after: self.degraded_after.filter(|v| *v > 0),
            timeout: self.timeout.filter(|v| *v > 0),
            request,
            assertions,
        };
        normalize_monitor(&id.to_string(), &mut spec)
            .map_err(|e| OpenstatusError::InvalidResponse(e.to_string()))?;

        Ok(RemoteMonitor { id, spec })
    }
}

fn convert_assertion(raw: ApiAssertion) -> std::result::Result<Assertion, String> {
    let kind = match raw.kind.as_str() {
        "status" | "statusCode" => AssertionKind::StatusCode,
        "header" => AssertionKind::Header,
        "textBody" => AssertionKind::TextBody,
        other => return Err(format!("unknown assertion type: {}", other)),
    };
    Ok(Assertion {
        kind,
        compare: raw.compare.parse::<Compare>()?,
        target: raw.target,
        key: raw.key.filter(|k| !k.is_empty()),
    })
}

/// Split `host:port` at the last colon
fn split_host_port(address: &str) -> Option<TcpRequest> {
    let (host, port) = address.rsplit_once(':')?;
    if host.is_empty() {
        return None;
    }
    Some(TcpRequest {
        host: host.to_string(),
        port: port.parse().ok()?,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiRunResult {
    job_type: MonitorKind,
    #[serde(default)]
    region: String,
    #[serde(default)]
    latency: i64,
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    error_message: Option<String>,
}

impl From<ApiRunResult> for RunResult {
    fn from(raw: ApiRunResult) -> Self {
        let error = match raw.error {
            Some(serde_json::Value::String(message)) if !message.is_empty() => Some(message),
            Some(serde_json::Value::Bool(true)) => Some("check failed".to_string()),
            _ => None,
        }
        .or(raw.error_message.filter(|m| !m.is_empty()));

        RunResult {
            job_type: raw.job_type,
            region: raw.region,
            latency_ms: raw.latency,
            timestamp: raw.timestamp,
            error,
        }
    }
}
