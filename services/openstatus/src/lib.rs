//! openstatus - monitors as code
//!
//! Declares uptime monitors in `openstatus.yaml`, reconciles them against
//! the openstatus API and records what was synchronized in `openstatus.lock`.

pub mod api;
pub mod commands;
pub mod config;
pub mod desired;
pub mod error;
pub mod gateway;
pub mod io;
pub mod lock;
pub mod model;
pub mod normalize;
pub mod prompt;
pub mod reconcile;
pub mod runner;

pub use api::{ApiGateway, Workspace, API_BASE_URL};
pub use commands::ApplyOutcome;
pub use config::{load_run_config, RunConfig};
pub use desired::{load_desired_state, parse_desired_state, DesiredState};
pub use error::{OpenstatusError, Result};
pub use gateway::{MonitorGateway, RemoteMonitor, RunResult};
pub use lock::{LockEntry, LockState, LockStore};
pub use model::{Assertion, AssertionTarget, MonitorSpec};
pub use normalize::{normalize_assertions, normalize_monitor};
pub use reconcile::{
    plan, DeletePolicy, Plan, ReconcileMode, ReconcileOutcome, Reconciler,
};
