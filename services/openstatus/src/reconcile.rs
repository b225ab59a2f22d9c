//! Reconciler: aligns the remote monitors with the declared ones
//!
//! The lock state is the diff baseline. Creates and updates run first in key
//! order and abort on the first failure; deletes run afterwards and, under
//! the default policy, are best effort. A failed delete leaves the remote
//! monitor behind but still drops it from the lock, so an already-gone
//! monitor never blocks the rest of a run.

use std::fmt;
use std::sync::Arc;

use crate::desired::DesiredState;
use crate::error::Result;
use crate::gateway::MonitorGateway;
use crate::lock::{LockEntry, LockState};

/// Keys grouped by the operation they need
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub create: Vec<String>,
    pub update: Vec<String>,
    pub delete: Vec<String>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "create: {}, update: {}, delete: {}",
            self.create.len(),
            self.update.len(),
            self.delete.len()
        )
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Classify every key of `desired` and `lock`
///
/// Specs are compared structurally, so reordering regions or assertions
/// counts as an update. Keys come out sorted.
pub fn plan(lock: &LockState, desired: &DesiredState) -> Plan {
    let mut plan = Plan::default();

    for (key, spec) in desired {
        match lock.get(key) {
            None => plan.create.push(key.clone()),
            Some(entry) if entry.monitor != *spec => plan.update.push(key.clone()),
            Some(_) => {}
        }
    }

    plan.delete = lock
        .keys()
        .filter(|key| !desired.contains_key(*key))
        .cloned()
        .collect();

    plan
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Classify only; the gateway is never called
    Preview,
    Apply,
}

/// What happens when a remote delete fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Log the failure and drop the key from the lock anyway
    #[default]
    BestEffort,
    /// Abort the run and keep the key
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Nothing to create, update or delete
    Unchanged,
    /// Preview of the work an apply would do
    Planned(Plan),
    /// Every operation of the plan went through
    Applied(Plan),
}

pub struct Reconciler {
    gateway: Arc<dyn MonitorGateway>,
    delete_policy: DeletePolicy,
}

impl Reconciler {
    pub fn new(gateway: Arc<dyn MonitorGateway>, delete_policy: DeletePolicy) -> Self {
        Self {
            gateway,
            delete_policy,
        }
    }

    /// Reconcile `lock` against `desired`
    ///
    /// In apply mode `lock` is updated entry by entry as remote calls succeed.
    /// When a create or update fails the error is returned and `lock` keeps
    /// the entries written before the failure; callers must not persist it.
    pub async fn reconcile(
        &self,
        mode: ReconcileMode,
        lock: &mut LockState,
        desired: &DesiredState,
    ) -> Result<ReconcileOutcome> {
        let plan = plan(lock, desired);
        tracing::debug!("Reconcile plan: {}", plan);

        if plan.is_empty() {
            return Ok(ReconcileOutcome::Unchanged);
        }
        if mode == ReconcileMode::Preview {
            return Ok(ReconcileOutcome::Planned(plan));
        }

        for (key, spec) in desired {
            let remote = match lock.get(key) {
                None => {
                    let remote = self.gateway.create(spec).await?;
                    tracing::info!("Created monitor '{}' with id {}", key, remote.id);
                    remote
                }
                Some(entry) if entry.monitor != *spec => {
                    let remote = self.gateway.update(entry.id, spec).await?;
                    tracing::info!("Updated monitor '{}' (id {})", key, remote.id);
                    remote
                }
                Some(_) => continue,
            };

            lock.insert(
                key.clone(),
                LockEntry {
                    id: remote.id,
                    monitor: spec.clone(),
                },
            );
        }

        for key in &plan.delete {
            let Some(entry) = lock.get(key) else {
                continue;
            };
            let id = entry.id;

            match self.gateway.delete(id).await {
                Ok(()) => tracing::info!("Deleted monitor '{}' (id {})", key, id),
                Err(e) => match self.delete_policy {
                    DeletePolicy::BestEffort => {
                        tracing::warn!("Failed to delete monitor '{}' (id {}): {}", key, id, e);
                    }
                    DeletePolicy::Strict => return Err(e),
                },
            }
            lock.remove(key);
        }

        Ok(ReconcileOutcome::Applied(plan))
    }
}
