//! Submitted candidate models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// Name/version pair that uniquely identifies a submitted model.
///
/// This is the deduplication key of the evaluation loop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateIdentity {
    /// Model name, e.g. a repository path
    pub name: String,
    /// Model version or revision
    pub version: String,
}

impl CandidateIdentity {
    /// Create an identity from its parts.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl Display for CandidateIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// A candidate as reported by the discovery collaborator.
///
/// `competition_id` is whatever the submitter declared. It is kept as a raw
/// string because a mismatching or malformed value is a normal outcome
/// (the candidate is rejected with score 0.0), not a parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique identity of the model
    pub identity: CandidateIdentity,
    /// Competition the submitter entered
    pub competition_id: String,
    /// Arbitrary submission metadata (hotkey, block, hashes, ...)
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Candidate {
    /// Create a candidate with no metadata.
    pub fn new(identity: CandidateIdentity, competition_id: impl Into<String>) -> Self {
        Self {
            identity,
            competition_id: competition_id.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_display() {
        let id = CandidateIdentity::new("org/coder", "rev-3");
        assert_eq!(id.to_string(), "org/coder@rev-3");
    }

    #[test]
    fn test_identity_distinguishes_versions() {
        let a = CandidateIdentity::new("org/coder", "1");
        let b = CandidateIdentity::new("org/coder", "2");
        assert_ne!(a, b);
    }

    #[test]
    fn test_candidate_metadata_defaults_when_absent() {
        let candidate: Candidate = serde_json::from_value(json!({
            "identity": {"name": "m", "version": "1"},
            "competition_id": "c1"
        }))
        .unwrap();
        assert!(candidate.metadata.is_empty());

        let candidate = candidate.with_metadata("block", json!(42));
        assert_eq!(candidate.metadata["block"], json!(42));
    }
}
