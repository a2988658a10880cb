//! Tests for evaluation sessions and their checkpoint lifecycle

use finetune_eval_application::{
    build_and_save_tasks, load_or_build_tasks, CheckpointStore, EvaluationSession,
    LifecycleManager,
};
use finetune_eval_common::AppConfig;
use finetune_eval_datasets::DatasetRegistry;
use finetune_eval_domain::{EvalError, TrackingRecord};
use finetune_eval_testing::{builders::*, fixtures::*, mocks::*};
use std::sync::Arc;

fn config(sample_size: usize) -> AppConfig {
    let mut config = AppConfig::default();
    config.pipeline.source_name = "synthetic".to_string();
    config.pipeline.sample_size = sample_size;
    config.datasets.seed = Some(11);
    config
}

fn setup() -> (Arc<MemoryCheckpointStore>, LifecycleManager, DatasetRegistry) {
    let store = Arc::new(MemoryCheckpointStore::new());
    let dyn_store: Arc<dyn CheckpointStore> = store.clone();
    let registry = DatasetRegistry::new(config(1).datasets);
    (store, LifecycleManager::new(dyn_store), registry)
}

fn names(records: &[TrackingRecord]) -> Vec<String> {
    records.iter().map(|r| r.identity().name.clone()).collect()
}

#[tokio::test]
async fn test_open_builds_and_checkpoints_task_set() {
    // Arrange
    let (store, lifecycle, registry) = setup();
    let competition = test_competition();

    // Act
    let session = EvaluationSession::open(&config(6), competition.clone(), &registry, &lifecycle)
        .await
        .unwrap();

    // Assert
    assert_eq!(session.tasks().len(), 6);
    assert_eq!(session.tasks().dataset(), "synthetic");
    assert_eq!(store.task_save_count(), 1);
    assert_eq!(store.load_tasks(&competition).unwrap().as_ref(), Some(session.tasks()));
    assert!(session.results().is_empty());
    session.keep_checkpoints();
}

#[tokio::test]
async fn test_task_set_is_stable_across_restarts() {
    // Arrange
    let (store, lifecycle, registry) = setup();
    let competition = test_competition();
    let first = EvaluationSession::open(&config(5), competition.clone(), &registry, &lifecycle)
        .await
        .unwrap();
    first.keep_checkpoints();
    let original = first.tasks().clone();
    drop(first);

    // Act - configured size changed between runs
    let second = EvaluationSession::open(&config(9), competition, &registry, &lifecycle)
        .await
        .unwrap();

    // Assert
    assert_eq!(second.tasks(), &original);
    assert_eq!(second.tasks().len(), 5);
    assert_eq!(store.task_save_count(), 1);
    second.keep_checkpoints();
}

#[tokio::test]
async fn test_load_or_build_draws_exactly_sample_size() {
    let (store, _lifecycle, registry) = setup();
    let competition = competition("sized");

    let tasks = load_or_build_tasks(store.as_ref(), &registry, &competition, "synthetic", 12)
        .await
        .unwrap();

    assert_eq!(tasks.len(), 12);
    assert!(store.has_tasks(&competition));
}

#[tokio::test]
async fn test_build_draws_one_sample_per_task() {
    // Arrange
    let store = MemoryCheckpointStore::new();
    let source = SequenceDatasetSource::new();
    let competition = test_competition();

    // Act
    let tasks = build_and_save_tasks(&store, &source, &competition, 7)
        .await
        .unwrap();

    // Assert
    assert_eq!(source.produced(), 7);
    assert_eq!(tasks.len(), 7);
    assert_eq!(tasks.tasks()[6].sample.title, "sequence/6");
    assert_eq!(store.task_save_count(), 1);
}

#[tokio::test]
async fn test_source_failing_mid_build_saves_no_tasks() {
    // Arrange
    let store = MemoryCheckpointStore::new();
    let source = SequenceDatasetSource::failing_after(3);
    let competition = test_competition();

    // Act
    let err = build_and_save_tasks(&store, &source, &competition, 5)
        .await
        .unwrap_err();

    // Assert
    assert!(matches!(err, EvalError::DataSource(_)));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(source.produced(), 3);
    assert_eq!(store.task_save_count(), 0);
    assert!(store.load_tasks(&competition).unwrap().is_none());
}

#[tokio::test]
async fn test_unknown_source_is_a_configuration_error() {
    let (store, lifecycle, registry) = setup();
    let mut config = config(3);
    config.pipeline.source_name = "imaginary".to_string();

    let err = EvaluationSession::open(&config, test_competition(), &registry, &lifecycle)
        .await
        .err()
        .unwrap();

    assert!(matches!(err, EvalError::Configuration(_)));
    assert_eq!(store.task_save_count(), 0);
}

#[tokio::test]
async fn test_start_returns_results_and_purges() {
    // Arrange
    let (store, lifecycle, registry) = setup();
    let competition = test_competition();
    let discovery = StaticDiscovery::new(vec![
        CandidateBuilder::new().with_name("A").build(),
        CandidateBuilder::new().with_name("B").build(),
        CandidateBuilder::new().with_name("C").build(),
    ]);
    let scorer = CountingScorer::new(0.0)
        .with_score("A", 0.3)
        .with_score("B", 0.9)
        .with_score("C", 0.5);

    // Act
    let results = EvaluationSession::start(
        &config(4),
        competition.clone(),
        &registry,
        &lifecycle,
        &discovery,
        &scorer,
    )
    .await
    .unwrap();

    // Assert
    assert_eq!(results.get_top().unwrap().identity().name, "B");
    assert!(!store.has_tasks(&competition));
    assert!(store.persisted(&competition).is_empty());
}

#[tokio::test]
async fn test_get_top_on_fresh_session_is_empty_result() {
    let (_store, lifecycle, registry) = setup();
    let session = EvaluationSession::open(&config(2), test_competition(), &registry, &lifecycle)
        .await
        .unwrap();

    let err = session.get_top().unwrap_err();

    assert!(matches!(err, EvalError::EmptyResult { .. }));
}

#[tokio::test]
async fn test_cleanup_is_idempotent() {
    // Arrange
    let (store, lifecycle, registry) = setup();
    let competition = test_competition();
    let mut session =
        EvaluationSession::open(&config(3), competition.clone(), &registry, &lifecycle)
            .await
            .unwrap();
    session
        .evaluate(
            &StaticDiscovery::new(create_test_candidates(2, &competition)),
            &CountingScorer::default(),
        )
        .await
        .unwrap();

    // Act
    let first = session.cleanup().unwrap();
    let second = session.cleanup().unwrap();

    // Assert
    assert_eq!(first, 2);
    assert_eq!(second, 0);
    assert!(store.load_tasks(&competition).unwrap().is_none());
    assert!(store.load_results(&competition).unwrap().is_empty());
}

#[tokio::test]
async fn test_dropping_session_purges_checkpoints() {
    let (store, lifecycle, registry) = setup();
    let competition = test_competition();
    let session = EvaluationSession::open(&config(3), competition.clone(), &registry, &lifecycle)
        .await
        .unwrap();
    assert!(store.has_tasks(&competition));

    drop(session);

    assert!(!store.has_tasks(&competition));
}

#[tokio::test]
async fn test_keep_checkpoints_survives_drop() {
    let (store, lifecycle, registry) = setup();
    let competition = test_competition();
    let session = EvaluationSession::open(&config(3), competition.clone(), &registry, &lifecycle)
        .await
        .unwrap();

    session.keep_checkpoints();
    drop(session);

    assert!(store.has_tasks(&competition));
}

#[tokio::test]
async fn test_failed_evaluation_keeps_progress_for_restart() {
    // Arrange
    let (store, lifecycle, registry) = setup();
    let competition = test_competition();
    let candidates: Vec<_> = (1..=5)
        .map(|i| CandidateBuilder::new().with_name(format!("m{i}")).build())
        .collect();
    let discovery = StaticDiscovery::new(candidates);

    // Act - the first run crashes on the third candidate
    let mut crashed =
        EvaluationSession::open(&config(4), competition.clone(), &registry, &lifecycle)
            .await
            .unwrap();
    let err = crashed
        .evaluate(&discovery, &CountingScorer::new(0.5).fail_on_nth(3))
        .await
        .unwrap_err();
    let tasks = crashed.tasks().clone();
    drop(crashed);

    // Assert
    assert!(matches!(err, EvalError::Scoring(_)));
    assert_eq!(names(&store.persisted(&competition)), vec!["m1", "m2"]);
    assert!(store.has_tasks(&competition));

    // Act - restart
    let scorer = CountingScorer::new(0.5);
    let mut resumed =
        EvaluationSession::open(&config(4), competition.clone(), &registry, &lifecycle)
            .await
            .unwrap();
    let results = resumed.evaluate(&discovery, &scorer).await.unwrap();

    // Assert
    assert_eq!(resumed.tasks(), &tasks);
    assert_eq!(scorer.called_names(), vec!["m3", "m4", "m5"]);
    assert_eq!(results.len(), 5);
    assert_eq!(resumed.cleanup().unwrap(), 2);
}

#[tokio::test]
async fn test_failed_session_can_still_be_cleaned_explicitly() {
    let (store, lifecycle, registry) = setup();
    let competition = test_competition();
    let mut session =
        EvaluationSession::open(&config(2), competition.clone(), &registry, &lifecycle)
            .await
            .unwrap();
    session
        .evaluate(&StaticDiscovery::failing(), &CountingScorer::default())
        .await
        .unwrap_err();

    assert_eq!(session.cleanup().unwrap(), 1);
    assert!(!store.has_tasks(&competition));
}

#[tokio::test]
async fn test_repeated_evaluate_picks_up_new_candidates() {
    // Arrange
    let (_store, lifecycle, registry) = setup();
    let competition = test_competition();
    let discovery = StaticDiscovery::new(vec![CandidateBuilder::new().with_name("a").build()]);
    let scorer = CountingScorer::default();
    let mut session = EvaluationSession::open(&config(2), competition, &registry, &lifecycle)
        .await
        .unwrap();
    session.evaluate(&discovery, &scorer).await.unwrap();

    // Act
    discovery.push(CandidateBuilder::new().with_name("b").build());
    let results = session.evaluate(&discovery, &scorer).await.unwrap();

    // Assert
    assert_eq!(names(&results.records), vec!["a", "b"]);
    assert_eq!(scorer.called_names(), vec!["a", "b"]);
    assert_eq!(session.results(), results);
}

#[tokio::test]
async fn test_failed_reload_keeps_session_records_and_original_error() {
    // Arrange
    let (store, lifecycle, registry) = setup();
    let competition = test_competition();
    let discovery = StaticDiscovery::new(vec![CandidateBuilder::new().with_name("a").build()]);
    let mut session =
        EvaluationSession::open(&config(2), competition.clone(), &registry, &lifecycle)
            .await
            .unwrap();
    session
        .evaluate(&discovery, &CountingScorer::default())
        .await
        .unwrap();

    // Act - scoring fails and the results checkpoint can no longer be read
    discovery.push(CandidateBuilder::new().with_name("b").build());
    store.set_failing_results_load(true);
    let err = session
        .evaluate(&discovery, &CountingScorer::default().fail_on("b"))
        .await
        .unwrap_err();

    // Assert
    assert!(matches!(err, EvalError::Scoring(_)));
    assert_eq!(names(&session.results().records), vec!["a"]);
    store.set_failing_results_load(false);
    assert_eq!(session.cleanup().unwrap(), 2);
}
