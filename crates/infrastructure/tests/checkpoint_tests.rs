//! Integration tests for the filesystem checkpoint store

use std::fs;

use finetune_eval_application::{CheckpointKind, CheckpointStore, LifecycleManager};
use finetune_eval_domain::StorageError;
use finetune_eval_infrastructure::FsCheckpointStore;
use finetune_eval_testing::fixtures::*;
use std::sync::Arc;

fn make_store() -> (tempfile::TempDir, FsCheckpointStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = FsCheckpointStore::new(dir.path()).unwrap();
    (dir, store)
}

#[test]
fn test_missing_checkpoints_load_as_absent() {
    let (_dir, store) = make_store();
    let competition = test_competition();

    assert!(store.load_tasks(&competition).unwrap().is_none());
    assert!(store.load_results(&competition).unwrap().is_empty());
}

#[test]
fn test_tasks_and_results_survive_a_new_store_instance() {
    // Arrange
    let (dir, store) = make_store();
    let competition = test_competition();
    let tasks = create_test_task_set(8);
    let records = vec![
        create_scored_record("a", 0.4, &competition),
        create_scored_record("b", 0.6, &competition),
    ];

    // Act
    store.save_tasks(&competition, &tasks).unwrap();
    store.save_results(&competition, &records).unwrap();
    let reopened = FsCheckpointStore::new(dir.path()).unwrap();

    // Assert
    assert_eq!(reopened.load_tasks(&competition).unwrap(), Some(tasks));
    assert_eq!(reopened.load_results(&competition).unwrap(), records);
}

#[test]
fn test_artifact_naming() {
    let (dir, store) = make_store();
    let competition = competition("finetune-7");

    store
        .save_tasks(&competition, &create_test_task_set(1))
        .unwrap();
    store.save_results(&competition, &[]).unwrap();

    assert!(dir.path().join("tasks_finetune-7.json").exists());
    assert!(dir.path().join("results_finetune-7.json").exists());
    assert_eq!(
        store.artifact_path(CheckpointKind::Results, &competition),
        dir.path().join("results_finetune-7.json")
    );
}

#[test]
fn test_overwrite_leaves_no_temp_files() {
    let (dir, store) = make_store();
    let competition = test_competition();

    for i in 0..5 {
        let records = vec![create_scored_record("a", i as f64 / 10.0, &competition)];
        store.save_results(&competition, &records).unwrap();
    }

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(store.load_results(&competition).unwrap()[0].score, Some(0.4));
}

#[test]
fn test_truncated_checkpoint_is_corrupt() {
    let (dir, store) = make_store();
    let competition = test_competition();
    fs::write(dir.path().join("results_test-competition.json"), b"{\"version\":1,").unwrap();

    let err = store.load_results(&competition).unwrap_err();

    assert!(matches!(err, StorageError::Corrupt { .. }));
}

#[test]
fn test_checkpoint_from_other_competition_is_corrupt() {
    let (dir, store) = make_store();
    let a = competition("a");
    let b = competition("b");
    store
        .save_results(&a, &[create_scored_record("m", 0.1, &a)])
        .unwrap();
    fs::copy(
        dir.path().join("results_a.json"),
        dir.path().join("results_b.json"),
    )
    .unwrap();

    let err = store.load_results(&b).unwrap_err();

    assert!(matches!(
        err,
        StorageError::Corrupt { ref reason, .. } if reason.contains("competition a")
    ));
}

#[test]
fn test_purge_is_scoped_and_idempotent() {
    // Arrange
    let (dir, store) = make_store();
    let mine = competition("mine");
    let theirs = competition("theirs");
    for id in [&mine, &theirs] {
        store.save_tasks(id, &create_test_task_set(2)).unwrap();
        store
            .save_results(id, &[create_scored_record("m", 0.5, id)])
            .unwrap();
    }
    fs::write(dir.path().join("notes.txt"), b"keep me").unwrap();

    // Act
    let first = store.purge(&mine).unwrap();
    let second = store.purge(&mine).unwrap();

    // Assert
    assert_eq!(first, 2);
    assert_eq!(second, 0);
    assert!(store.load_tasks(&mine).unwrap().is_none());
    assert!(store.load_results(&mine).unwrap().is_empty());
    assert!(store.load_tasks(&theirs).unwrap().is_some());
    assert_eq!(store.list_competitions().unwrap(), vec![theirs]);
    assert!(dir.path().join("notes.txt").exists());
}

#[test]
fn test_purge_all_only_touches_checkpoint_files() {
    let (dir, store) = make_store();
    for id in ["a", "b", "c"] {
        let id = competition(id);
        store.save_tasks(&id, &create_test_task_set(1)).unwrap();
    }
    fs::write(dir.path().join("tasks_legacy.pkl"), b"").unwrap();

    assert_eq!(store.purge_all().unwrap(), 3);
    assert_eq!(store.purge_all().unwrap(), 0);
    assert!(store.list_competitions().unwrap().is_empty());
    assert!(dir.path().join("tasks_legacy.pkl").exists());
}

#[test]
fn test_lifecycle_cleanup_through_filesystem_store() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn CheckpointStore> = Arc::new(FsCheckpointStore::new(dir.path()).unwrap());
    let lifecycle = LifecycleManager::new(Arc::clone(&store));
    let competition = test_competition();
    store
        .save_tasks(&competition, &create_test_task_set(3))
        .unwrap();

    assert_eq!(lifecycle.cleanup(&competition).unwrap(), 1);
    assert_eq!(lifecycle.cleanup(&competition).unwrap(), 0);
    assert!(store.load_tasks(&competition).unwrap().is_none());
}
