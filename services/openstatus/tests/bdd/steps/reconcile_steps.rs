//! BDD step definitions for reconciliation

use std::sync::Arc;

use cucumber::{given, then, when};

use openstatus::{
    DeletePolicy, LockEntry, MonitorGateway, MonitorSpec, ReconcileMode, ReconcileOutcome,
    Reconciler,
};

use crate::world::OpenstatusWorld;

#[given("an empty lock")]
fn empty_lock(world: &mut OpenstatusWorld) {
    world.lock.clear();
}

#[given(expr = "a locked http monitor {string} with id {int} for {string}")]
fn locked_monitor(world: &mut OpenstatusWorld, key: String, id: i64, url: String) {
    let monitor = MonitorSpec::http(key.clone(), url);
    world.lock.insert(key, LockEntry { id, monitor });
}

#[given(expr = "a declared http monitor {string} for {string}")]
fn declared_monitor(world: &mut OpenstatusWorld, key: String, url: String) {
    world
        .desired
        .insert(key.clone(), MonitorSpec::http(key, url));
}

#[given(expr = "creating monitor {string} fails")]
fn creating_fails(world: &mut OpenstatusWorld, name: String) {
    world.gateway.failing_creates.lock().unwrap().insert(name);
}

#[given(expr = "deleting monitor {int} fails")]
fn deleting_fails(world: &mut OpenstatusWorld, id: i64) {
    world.gateway.failing_deletes.lock().unwrap().insert(id);
}

async fn reconcile(world: &mut OpenstatusWorld, mode: ReconcileMode) {
    let gateway: Arc<dyn MonitorGateway> = world.gateway.clone();
    let reconciler = Reconciler::new(gateway, DeletePolicy::BestEffort);
    let outcome = reconciler
        .reconcile(mode, &mut world.lock, &world.desired)
        .await;
    world.outcome = Some(outcome);
}

#[when("I apply the reconciliation")]
async fn apply(world: &mut OpenstatusWorld) {
    reconcile(world, ReconcileMode::Apply).await;
}

#[when("I preview the reconciliation")]
async fn preview(world: &mut OpenstatusWorld) {
    reconcile(world, ReconcileMode::Preview).await;
}

#[then(expr = "the gateway received {string}")]
fn gateway_received(world: &mut OpenstatusWorld, call: String) {
    let calls = world.gateway.recorded();
    assert!(calls.contains(&call), "calls were {:?}", calls);
}

#[then("the gateway received no calls")]
fn no_calls(world: &mut OpenstatusWorld) {
    assert!(world.gateway.recorded().is_empty());
}

#[then(expr = "the lock binds {string} to id {int}")]
fn lock_binds(world: &mut OpenstatusWorld, key: String, id: i64) {
    let entry = world.lock.get(&key).expect("key should be locked");
    assert_eq!(entry.id, id);
    assert_eq!(Some(&entry.monitor), world.desired.get(&key));
}

#[then(expr = "the lock does not contain {string}")]
fn lock_lacks(world: &mut OpenstatusWorld, key: String) {
    assert!(!world.lock.contains_key(&key));
}

#[then("the outcome is unchanged")]
fn outcome_unchanged(world: &mut OpenstatusWorld) {
    match world.outcome.as_ref().expect("reconciliation should have run") {
        Ok(ReconcileOutcome::Unchanged) => {}
        other => panic!("expected Unchanged, got {:?}", other),
    }
}

#[then(expr = "the plan summary is {string}")]
fn plan_summary(world: &mut OpenstatusWorld, summary: String) {
    match world.outcome.as_ref().expect("reconciliation should have run") {
        Ok(ReconcileOutcome::Planned(plan)) | Ok(ReconcileOutcome::Applied(plan)) => {
            assert_eq!(plan.summary(), summary);
        }
        other => panic!("expected a plan, got {:?}", other),
    }
}

#[then("the reconciliation fails")]
fn reconciliation_fails(world: &mut OpenstatusWorld) {
    let outcome = world.outcome.as_ref().expect("reconciliation should have run");
    assert!(outcome.is_err(), "expected an error, got {:?}", outcome);
}
