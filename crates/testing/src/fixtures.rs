//! Test fixtures for generating domain values with realistic data.

use fake::{
    faker::{internet::en::Username, lorem::en::Sentence, lorem::en::Word},
    Fake,
};
use finetune_eval_domain::{
    Candidate, CandidateIdentity, CompetitionId, SampleRecord, TaskSet, TrackingRecord,
};
use std::collections::HashMap;

/// Competition used by most tests
pub fn test_competition() -> CompetitionId {
    competition("test-competition")
}

/// Parse a competition id, panicking on invalid input
pub fn competition(id: &str) -> CompetitionId {
    CompetitionId::parse(id).expect("valid competition id")
}

/// Create a sample record with generated text
pub fn create_test_sample(index: usize) -> SampleRecord {
    SampleRecord {
        source: "fixture".to_string(),
        title: format!("fixture/{index}"),
        topic: Word().fake(),
        content: Sentence(4..10).fake(),
        extras: HashMap::new(),
    }
}

/// Create a task set of `n` generated tasks
pub fn create_test_task_set(n: usize) -> TaskSet {
    TaskSet::from_samples("fixture", (0..n).map(create_test_sample).collect())
}

/// Create `n` candidates with distinct identities
pub fn create_test_candidates(n: usize, competition: &CompetitionId) -> Vec<Candidate> {
    (0..n)
        .map(|i| {
            let owner: String = Username().fake();
            Candidate::new(
                CandidateIdentity::new(format!("{owner}/model-{i}"), "1"),
                competition.as_str(),
            )
        })
        .collect()
}

/// Create a scored tracking record for a named candidate
pub fn create_scored_record(name: &str, score: f64, competition: &CompetitionId) -> TrackingRecord {
    let candidate = Candidate::new(CandidateIdentity::new(name, "1"), competition.as_str());
    TrackingRecord::pending(candidate, competition.clone()).scored(score)
}
