//! Exit hook behavior.
//!
//! The hook registry is process-wide, so this binary holds a single test.

use finetune_eval_application::{run_exit_hooks, CheckpointStore, LifecycleManager};
use finetune_eval_testing::{fixtures::*, mocks::MemoryCheckpointStore};
use std::sync::Arc;

#[test]
fn test_exit_hooks_purge_only_live_armed_guards() {
    // Arrange
    let store = Arc::new(MemoryCheckpointStore::new());
    let dyn_store: Arc<dyn CheckpointStore> = store.clone();
    let lifecycle = LifecycleManager::new(dyn_store);

    let live = competition("live");
    let kept = competition("kept");
    let finished = competition("finished");
    for id in [&live, &kept, &finished] {
        store.save_tasks(id, &create_test_task_set(2)).unwrap();
    }

    let live_guard = lifecycle.guard(&live);
    let kept_guard = lifecycle.guard(&kept);
    kept_guard.disarm();
    let finished_guard = lifecycle.guard(&finished);
    assert_eq!(finished_guard.cleanup().unwrap(), 1);
    store.save_tasks(&finished, &create_test_task_set(2)).unwrap();

    // Act
    let fired = run_exit_hooks();

    // Assert
    assert_eq!(fired, 1);
    assert!(!store.has_tasks(&live));
    assert!(store.has_tasks(&kept));
    assert!(store.has_tasks(&finished));
    assert!(!live_guard.is_armed());

    // Dropping after the hooks ran does not purge again
    store.save_tasks(&live, &create_test_task_set(2)).unwrap();
    drop(live_guard);
    drop(kept_guard);
    drop(finished_guard);
    assert!(store.has_tasks(&live));
    assert_eq!(run_exit_hooks(), 0);
}
