//! BDD step definitions for the lock file

use cucumber::{given, then, when};

use openstatus::{LockStore, OpenstatusError};

use crate::world::OpenstatusWorld;

#[given("a lock file path that does not exist")]
fn missing_lock_file(world: &mut OpenstatusWorld) {
    let path = world.temp_path("openstatus.lock");
    world.lock_path = Some(path);
}

#[given(expr = "a lock file containing {string}")]
fn lock_file_containing(world: &mut OpenstatusWorld, content: String) {
    let path = world.temp_path("openstatus.lock");
    std::fs::write(&path, content).unwrap();
    world.lock_path = Some(path);
}

#[when("I load the lock file")]
fn load_lock_file(world: &mut OpenstatusWorld) {
    let path = world.lock_path.clone().expect("lock path should be set");
    world.loaded_lock = Some(LockStore::new(path).load());
}

#[when("I save and reload the lock file")]
fn save_and_reload(world: &mut OpenstatusWorld) {
    let path = world.temp_path("openstatus.lock");
    let store = LockStore::new(&path);
    store.save(&world.lock).unwrap();
    world.lock_path = Some(path);
    world.loaded_lock = Some(store.load());
}

#[then("the loaded lock is empty")]
fn loaded_lock_empty(world: &mut OpenstatusWorld) {
    match world.loaded_lock.as_ref().expect("lock should be loaded") {
        Ok(lock) => assert!(lock.is_empty()),
        Err(e) => panic!("expected an empty lock, got {}", e),
    }
}

#[then("the reloaded lock equals the saved lock")]
fn reloaded_equals_saved(world: &mut OpenstatusWorld) {
    match world.loaded_lock.as_ref().expect("lock should be loaded") {
        Ok(lock) => assert_eq!(*lock, world.lock),
        Err(e) => panic!("expected the saved lock, got {}", e),
    }
}

#[then("loading the lock file fails")]
fn loading_fails(world: &mut OpenstatusWorld) {
    match world.loaded_lock.as_ref().expect("lock should be loaded") {
        Err(OpenstatusError::Lock(_)) => {}
        other => panic!("expected a lock error, got {:?}", other),
    }
}
