//! CLI command flows
//!
//! Each flow takes its collaborators explicitly (gateway, lock store,
//! prompt) so that it can be exercised without a terminal or a network.
//! Rendering lives in plain `render_*` functions returning strings.

use std::path::Path;
use std::sync::Arc;

use crate::api::{ApiGateway, Workspace};
use crate::config::load_run_config;
use crate::desired::{load_desired_state, render_desired_state, DesiredState};
use crate::error::{OpenstatusError, Result};
use crate::gateway::{MonitorGateway, RemoteMonitor, RunResult};
use crate::lock::{write_atomically, LockEntry, LockState, LockStore};
use crate::model::Request;
use crate::prompt::Prompt;
use crate::reconcile::{DeletePolicy, Plan, ReconcileMode, ReconcileOutcome, Reconciler};
use crate::runner::run_tests;

/// Longest body prefix shown by `monitors info`
const BODY_PREVIEW_CHARS: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Declared and locked monitors already agree
    Unchanged,
    /// The user did not confirm the plan
    Declined,
    Applied(Plan),
}

/// Reconcile the declared monitors with the remote side and rewrite the lock
///
/// The lock file is written only when every create and update succeeded.
pub async fn apply_monitors(
    gateway: Arc<dyn MonitorGateway>,
    config_path: &Path,
    store: &LockStore,
    auto_accept: bool,
    prompt: &dyn Prompt,
) -> Result<ApplyOutcome> {
    let desired = load_desired_state(config_path)?;
    let mut lock = store.load()?;
    let reconciler = Reconciler::new(gateway, DeletePolicy::BestEffort);

    let plan = match reconciler
        .reconcile(ReconcileMode::Preview, &mut lock, &desired)
        .await?
    {
        ReconcileOutcome::Unchanged => {
            println!("No changes to apply");
            return Ok(ApplyOutcome::Unchanged);
        }
        ReconcileOutcome::Planned(plan) | ReconcileOutcome::Applied(plan) => plan,
    };

    print!("{}", render_plan(&plan));
    if !auto_accept && !prompt.confirm("Do you want to apply these changes?")? {
        tracing::debug!("Apply declined by user");
        return Ok(ApplyOutcome::Declined);
    }

    let applied = match reconciler
        .reconcile(ReconcileMode::Apply, &mut lock, &desired)
        .await?
    {
        ReconcileOutcome::Applied(applied) => applied,
        ReconcileOutcome::Planned(_) | ReconcileOutcome::Unchanged => plan,
    };
    store.save(&lock)?;

    println!("Applied changes ({})", applied.summary());
    Ok(ApplyOutcome::Applied(applied))
}

/// Create every declared monitor, without consulting or writing the lock
///
/// Returns the number of monitors created; zero when the user declines.
pub async fn create_monitors(
    gateway: &dyn MonitorGateway,
    config_path: &Path,
    auto_accept: bool,
    prompt: &dyn Prompt,
) -> Result<usize> {
    let desired = load_desired_state(config_path)?;

    if !auto_accept {
        let question = format!(
            "You are about to create {} monitors do you want to continue",
            desired.len()
        );
        if !prompt.confirm(&question)? {
            return Ok(0);
        }
    }

    for (key, spec) in &desired {
        let remote = gateway.create(spec).await?;
        tracing::info!("Created monitor '{}' with id {}", key, remote.id);
    }

    println!("{} monitors created successfully", desired.len());
    Ok(desired.len())
}

/// Delete one monitor by id; returns false when the user declines
pub async fn delete_monitor(
    gateway: &dyn MonitorGateway,
    id: i64,
    auto_accept: bool,
    prompt: &dyn Prompt,
) -> Result<bool> {
    if !auto_accept {
        let question = format!(
            "You are about to delete monitor: {}, do you want to continue",
            id
        );
        if !prompt.confirm(&question)? {
            return Ok(false);
        }
    }

    gateway.delete(id).await?;
    println!("Monitor deleted successfully");
    Ok(true)
}

/// Pull every remote monitor into a fresh desired-state file and lock file
///
/// Monitors are keyed by their remote id. Both files are overwritten.
pub async fn import_monitors(
    gateway: &dyn MonitorGateway,
    output: &Path,
    store: &LockStore,
) -> Result<usize> {
    let remote = gateway.list().await?;

    let mut desired = DesiredState::new();
    let mut lock = LockState::new();
    for monitor in remote {
        let key = monitor.id.to_string();
        desired.insert(key.clone(), monitor.spec.clone());
        lock.insert(
            key,
            LockEntry {
                id: monitor.id,
                monitor: monitor.spec,
            },
        );
    }

    write_atomically(output, &render_desired_state(&desired)?)?;
    store.save(&lock)?;

    println!("Monitors successfully imported to: {}", output.display());
    Ok(desired.len())
}

pub async fn monitor_info(gateway: &dyn MonitorGateway, id: i64) -> Result<()> {
    let monitor = gateway.get(id).await?;
    print!("{}", render_monitor_info(&monitor));
    Ok(())
}

pub async fn list_monitors(gateway: &dyn MonitorGateway, all: bool) -> Result<()> {
    let monitors = gateway.list().await?;
    println!("List of all monitors");
    print!("{}", render_monitor_list(&monitors, all));
    Ok(())
}

/// Run one monitor now; fails when any region failed
pub async fn trigger_monitor(gateway: &dyn MonitorGateway, id: i64) -> Result<()> {
    let results = gateway.trigger(id).await?;
    print!("{}", render_run_results(id, &results));

    if results.iter().all(RunResult::passed) {
        println!("All regions passed");
        Ok(())
    } else {
        println!("Some regions failed");
        Err(OpenstatusError::RunFailed(format!(
            "monitor {}: some regions failed",
            id
        )))
    }
}

/// Trigger every monitor listed in the runner config concurrently
pub async fn run_configured_tests(
    gateway: Arc<dyn MonitorGateway>,
    config_path: &Path,
) -> Result<()> {
    let config = load_run_config(config_path)?;
    println!("Tests are running\n");

    let outcomes = run_tests(gateway, &config.tests.ids).await;
    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(results) => print!("{}", render_run_results(outcome.id, results)),
            Err(e) => println!("Monitor: {}\n  {}", outcome.id, e),
        }
        if !outcome.passed() {
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(OpenstatusError::RunFailed(format!(
            "{} of {} tests failed",
            failed,
            outcomes.len()
        )));
    }
    println!("All tests passed");
    Ok(())
}

pub async fn whoami(gateway: &ApiGateway) -> Result<Workspace> {
    let workspace = gateway.whoami().await?;
    println!("Your current workspace information");
    println!("Name: {}", workspace.name);
    println!("Slug: {}", workspace.slug);
    println!("Plan: {}", workspace.plan);
    Ok(workspace)
}

/// Summary line followed by one line per affected key
pub fn render_plan(plan: &Plan) -> String {
    let mut out = format!("{}\n", plan.summary());
    for key in &plan.create {
        out.push_str(&format!("  + {}\n", key));
    }
    for key in &plan.update {
        out.push_str(&format!("  ~ {}\n", key));
    }
    for key in &plan.delete {
        out.push_str(&format!("  - {}\n", key));
    }
    out
}

pub fn render_monitor_info(monitor: &RemoteMonitor) -> String {
    let spec = &monitor.spec;
    let mut rows: Vec<(&str, String)> = vec![
        ("ID", monitor.id.to_string()),
        ("Name", spec.name.clone()),
        ("Description", spec.description.clone().unwrap_or_default()),
        ("Endpoint", spec.endpoint()),
    ];
    if let Request::Http(http) = &spec.request {
        rows.push(("Method", http.method.to_string()));
    }
    rows.push(("Frequency", spec.frequency.to_string()));
    rows.push((
        "Locations",
        spec.regions
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(","),
    ));
    rows.push(("Active", spec.active.to_string()));
    rows.push(("Public", spec.public.to_string()));
    if let Some(timeout) = spec.timeout {
        rows.push(("Timeout", format!("{} ms", timeout)));
    }
    if let Some(degraded_after) = spec.degraded_after {
        rows.push(("Degraded After", format!("{} ms", degraded_after)));
    }
    if let Request::Http(http) = &spec.request {
        if !http.body.is_empty() {
            rows.push(("Body", truncate_chars(&http.body, BODY_PREVIEW_CHARS)));
        }
    }

    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let mut out = String::from("Monitor:\n");
    for (label, value) in rows {
        out.push_str(&format!("{:<width$} | {}\n", label, value, width = width));
    }
    out
}

/// `ID Name Url` table; inactive monitors are hidden unless `all`
pub fn render_monitor_list(monitors: &[RemoteMonitor], all: bool) -> String {
    let rows: Vec<(String, &str, String)> = monitors
        .iter()
        .filter(|m| all || m.spec.active)
        .map(|m| (m.id.to_string(), m.spec.name.as_str(), m.spec.endpoint()))
        .collect();

    let id_width = rows.iter().map(|r| r.0.len()).chain([2]).max().unwrap_or(2);
    let name_width = rows
        .iter()
        .map(|r| r.1.chars().count())
        .chain([4])
        .max()
        .unwrap_or(4);

    let mut out = format!(
        "{:<iw$}  {:<nw$}  Url\n",
        "ID",
        "Name",
        iw = id_width,
        nw = name_width
    );
    for (id, name, url) in rows {
        out.push_str(&format!(
            "{:<iw$}  {:<nw$}  {}\n",
            id,
            name,
            url,
            iw = id_width,
            nw = name_width
        ));
    }
    out
}

pub fn render_run_results(id: i64, results: &[RunResult]) -> String {
    let mut out = format!("Monitor: {}\n", id);
    out.push_str(&format!("{:<8}  {:>12}  Status\n", "Region", "Latency (ms)"));
    for result in results {
        let status = if result.passed() { "ok" } else { "failed" };
        out.push_str(&format!(
            "{:<8}  {:>12}  {}\n",
            result.region, result.latency_ms, status
        ));
    }
    out
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}
