//! Fluent builders for constructing test data.

use finetune_eval_domain::{Candidate, CandidateIdentity, CompetitionId, TrackingRecord};
use std::collections::BTreeMap;

use crate::fixtures::test_competition;

/// Builder for `Candidate` test instances
#[derive(Clone)]
pub struct CandidateBuilder {
    name: String,
    version: String,
    competition_id: String,
    metadata: BTreeMap<String, serde_json::Value>,
}

impl CandidateBuilder {
    pub fn new() -> Self {
        Self {
            name: "test-org/test-model".to_string(),
            version: "1".to_string(),
            competition_id: test_competition().to_string(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_competition(mut self, competition_id: impl Into<String>) -> Self {
        self.competition_id = competition_id.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn build(self) -> Candidate {
        Candidate {
            identity: CandidateIdentity::new(self.name, self.version),
            competition_id: self.competition_id,
            metadata: self.metadata,
        }
    }
}

impl Default for CandidateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TrackingRecord` test instances
#[derive(Clone)]
pub struct TrackingRecordBuilder {
    candidate: Candidate,
    competition_id: CompetitionId,
    score: Option<f64>,
}

impl TrackingRecordBuilder {
    pub fn new() -> Self {
        Self {
            candidate: CandidateBuilder::new().build(),
            competition_id: test_competition(),
            score: None,
        }
    }

    pub fn with_candidate(mut self, candidate: Candidate) -> Self {
        self.candidate = candidate;
        self
    }

    pub fn with_competition(mut self, competition_id: CompetitionId) -> Self {
        self.competition_id = competition_id;
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn unscored(mut self) -> Self {
        self.score = None;
        self
    }

    pub fn build(self) -> TrackingRecord {
        let record = TrackingRecord::pending(self.candidate, self.competition_id);
        match self.score {
            Some(score) => record.scored(score),
            None => record,
        }
    }
}

impl Default for TrackingRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}
