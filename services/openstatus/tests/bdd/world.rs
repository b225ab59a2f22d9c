//! BDD test world for the openstatus CLI

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

use cucumber::World;
use openstatus::gateway::{MonitorGateway, RemoteMonitor, RunResult};
use openstatus::{DesiredState, LockState, MonitorSpec, OpenstatusError, ReconcileOutcome};

/// First id handed out by [`RecordingGateway::create`]
pub const FIRST_CREATED_ID: i64 = 100;

/// Gateway that records every call and fails on request
#[derive(Debug, Default)]
pub struct RecordingGateway {
    pub calls: Mutex<Vec<String>>,
    pub failing_creates: Mutex<HashSet<String>>,
    pub failing_deletes: Mutex<HashSet<i64>>,
}

impl RecordingGateway {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn recorded(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn created_so_far(&self) -> i64 {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with("create "))
            .count() as i64
    }
}

#[async_trait::async_trait]
impl MonitorGateway for RecordingGateway {
    async fn create(&self, spec: &MonitorSpec) -> openstatus::Result<RemoteMonitor> {
        let id = FIRST_CREATED_ID + self.created_so_far();
        self.record(format!("create {}", spec.name));
        if self.failing_creates.lock().unwrap().contains(&spec.name) {
            return Err(OpenstatusError::Api(format!(
                "Failed to create monitor '{}' (status 500)",
                spec.name
            )));
        }
        Ok(RemoteMonitor {
            id,
            spec: spec.clone(),
        })
    }

    async fn update(&self, id: i64, spec: &MonitorSpec) -> openstatus::Result<RemoteMonitor> {
        self.record(format!("update {} {}", id, spec.name));
        Ok(RemoteMonitor {
            id,
            spec: spec.clone(),
        })
    }

    async fn delete(&self, id: i64) -> openstatus::Result<()> {
        self.record(format!("delete {}", id));
        if self.failing_deletes.lock().unwrap().contains(&id) {
            return Err(OpenstatusError::Api(
                "Failed to delete monitor (status 500)".to_string(),
            ));
        }
        Ok(())
    }

    async fn get(&self, id: i64) -> openstatus::Result<RemoteMonitor> {
        Err(OpenstatusError::Api(format!("monitor {} not found", id)))
    }

    async fn list(&self) -> openstatus::Result<Vec<RemoteMonitor>> {
        Ok(Vec::new())
    }

    async fn trigger(&self, _id: i64) -> openstatus::Result<Vec<RunResult>> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Default, World)]
pub struct OpenstatusWorld {
    // Reconciliation
    pub lock: LockState,
    pub desired: DesiredState,
    pub gateway: std::sync::Arc<RecordingGateway>,
    pub outcome: Option<openstatus::Result<ReconcileOutcome>>,

    // Lock file
    pub temp_dir: Option<tempfile::TempDir>,
    pub lock_path: Option<PathBuf>,
    pub loaded_lock: Option<openstatus::Result<LockState>>,

    // Desired-state parsing
    pub document: Option<String>,
    pub parsed: Option<openstatus::Result<DesiredState>>,
}

impl OpenstatusWorld {
    /// Path inside a per-scenario temporary directory
    pub fn temp_path(&mut self, name: &str) -> PathBuf {
        let dir = self
            .temp_dir
            .get_or_insert_with(|| tempfile::tempdir().expect("create temp dir"));
        dir.path().join(name)
    }
}
