//! Integration tests for the file-backed dataset source.

use std::io::Write;

use finetune_eval_common::DatasetsConfig;
use finetune_eval_datasets::{DatasetRegistry, TaskSetBuilder};
use finetune_eval_domain::DataSourceError;
use tempfile::NamedTempFile;

fn export(rows: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for i in 0..rows {
        writeln!(
            file,
            r#"{{"task_id": "BigCodeBench/{i}", "instruct_prompt": "Problem {i}", "entry_point": "task_func"}}"#
        )
        .unwrap();
    }
    file
}

fn config_for(file: &NamedTempFile, seed: u64) -> DatasetsConfig {
    DatasetsConfig {
        bigcodebench_path: Some(file.path().to_path_buf()),
        seed: Some(seed),
    }
}

#[tokio::test]
async fn test_build_from_export_samples_with_replacement() {
    // Arrange
    let file = export(3);
    let registry = DatasetRegistry::new(config_for(&file, 11));
    let source = registry.get("bigcodebench").unwrap();

    // Act
    let tasks = TaskSetBuilder::build(source.as_ref(), 20).await.unwrap();

    // Assert
    assert_eq!(tasks.len(), 20);
    assert_eq!(tasks.dataset(), "bigcodebench");
    assert!(tasks
        .iter()
        .all(|t| t.sample.title.starts_with("BigCodeBench/")));
}

#[tokio::test]
async fn test_same_seed_gives_same_task_set() {
    let file = export(50);

    let a = DatasetRegistry::new(config_for(&file, 5));
    let b = DatasetRegistry::new(config_for(&file, 5));
    let first = TaskSetBuilder::build(a.get("bigcodebench").unwrap().as_ref(), 10)
        .await
        .unwrap();
    let second = TaskSetBuilder::build(b.get("bigcodebench").unwrap().as_ref(), 10)
        .await
        .unwrap();

    assert_eq!(first.tasks(), second.tasks());
}

#[tokio::test]
async fn test_empty_export_fails_the_build() {
    let file = export(0);
    let registry = DatasetRegistry::new(config_for(&file, 1));
    let source = registry.get("bigcodebench").unwrap();

    let err = TaskSetBuilder::build(source.as_ref(), 5).await.unwrap_err();

    assert!(matches!(err, DataSourceError::Empty { .. }));
}
