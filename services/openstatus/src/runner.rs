//! Synthetic test runner: trigger several monitors at once

use std::sync::Arc;

use crate::gateway::{MonitorGateway, RunResult};

/// Result of triggering one monitor
#[derive(Debug)]
pub struct TestOutcome {
    pub id: i64,
    pub result: crate::Result<Vec<RunResult>>,
}

impl TestOutcome {
    /// True when the trigger succeeded and every region passed
    pub fn passed(&self) -> bool {
        match &self.result {
            Ok(results) => results.iter().all(RunResult::passed),
            Err(_) => false,
        }
    }
}

/// Trigger every monitor in `ids` concurrently and wait for all of them
///
/// Outcomes are returned in the order of `ids`. Nothing is cancelled when
/// one monitor fails.
pub async fn run_tests(gateway: Arc<dyn MonitorGateway>, ids: &[i64]) -> Vec<TestOutcome> {
    let handles: Vec<_> = ids
        .iter()
        .map(|&id| {
            let gateway = Arc::clone(&gateway);
            let handle = tokio::spawn(async move { gateway.trigger(id).await });
            (id, handle)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (id, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(crate::OpenstatusError::RunFailed(format!(
                "trigger task for monitor {} did not finish: {}",
                id, e
            ))),
        };
        if let Err(e) = &result {
            tracing::warn!("Monitor {} could not be triggered: {}", id, e);
        }
        outcomes.push(TestOutcome { id, result });
    }
    outcomes
}
