//! Remote monitor gateway trait and its result types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{MonitorKind, MonitorSpec};

/// A monitor as it exists on the remote side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMonitor {
    pub id: i64,
    pub spec: MonitorSpec,
}

/// Outcome of one region running a triggered monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub job_type: MonitorKind,
    pub region: String,
    pub latency_ms: i64,
    pub timestamp: i64,
    pub error: Option<String>,
}

impl RunResult {
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Remote store of monitors, bound to one workspace credential
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait MonitorGateway: Send + Sync {
    /// Create a monitor and return it with its assigned id
    async fn create(&self, spec: &MonitorSpec) -> crate::Result<RemoteMonitor>;

    /// Replace the definition of an existing monitor
    async fn update(&self, id: i64, spec: &MonitorSpec) -> crate::Result<RemoteMonitor>;

    async fn delete(&self, id: i64) -> crate::Result<()>;

    async fn get(&self, id: i64) -> crate::Result<RemoteMonitor>;

    async fn list(&self) -> crate::Result<Vec<RemoteMonitor>>;

    /// Run a monitor once from every configured region
    async fn trigger(&self, id: i64) -> crate::Result<Vec<RunResult>>;
}
