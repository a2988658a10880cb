//! Scoring records and the result set view built from them.

use crate::candidate::{Candidate, CandidateIdentity};
use crate::errors::EvalError;
use crate::identifiers::CompetitionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Tracks one candidate's evaluation inside a competition.
///
/// A record starts unscored and receives its score once. Later runs reuse
/// the score through [`TrackingRecord::refreshed`] instead of scoring again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingRecord {
    /// The candidate, with the metadata seen most recently
    pub candidate: Candidate,
    /// Competition this record is accumulated under
    pub competition_id: CompetitionId,
    /// Score, absent until the candidate has been evaluated
    pub score: Option<f64>,
    /// When the score was assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scored_at: Option<DateTime<Utc>>,
}

impl TrackingRecord {
    /// Create an unscored record.
    pub fn pending(candidate: Candidate, competition_id: CompetitionId) -> Self {
        Self {
            candidate,
            competition_id,
            score: None,
            scored_at: None,
        }
    }

    /// Assign the score.
    pub fn scored(mut self, score: f64) -> Self {
        self.score = Some(score);
        self.scored_at = Some(Utc::now());
        self
    }

    /// Copy this record's score onto a newer view of the same candidate.
    pub fn refreshed(&self, candidate: Candidate) -> Self {
        Self {
            candidate,
            competition_id: self.competition_id.clone(),
            score: self.score,
            scored_at: self.scored_at,
        }
    }

    /// Dedup key
    pub fn identity(&self) -> &CandidateIdentity {
        &self.candidate.identity
    }

    /// Whether a score has been assigned
    pub fn is_scored(&self) -> bool {
        self.score.is_some()
    }
}

/// Externally visible output of an evaluation run.
///
/// A view over the accumulated tracking records; it is never persisted on
/// its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Records in accumulation order
    pub records: Vec<TrackingRecord>,
    /// Competition the records belong to
    pub competition_id: CompetitionId,
}

impl ResultSet {
    /// Wrap records into a result set.
    pub fn new(competition_id: CompetitionId, records: Vec<TrackingRecord>) -> Self {
        Self {
            records,
            competition_id,
        }
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by candidate identity
    pub fn get(&self, identity: &CandidateIdentity) -> Option<&TrackingRecord> {
        self.records.iter().find(|r| r.identity() == identity)
    }

    /// Records ordered by score, best first.
    ///
    /// The sort is stable, so equal scores keep accumulation order. Unscored
    /// records sort after every scored one.
    pub fn ranked(&self) -> Vec<&TrackingRecord> {
        let mut ranked: Vec<&TrackingRecord> = self.records.iter().collect();
        ranked.sort_by(|a, b| compare_scores(b.score, a.score));
        ranked
    }

    /// Best-scoring record.
    pub fn get_top(&self) -> Result<&TrackingRecord, EvalError> {
        self.ranked()
            .into_iter()
            .next()
            .ok_or_else(|| EvalError::EmptyResult {
                competition_id: self.competition_id.clone(),
            })
    }
}

fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn competition() -> CompetitionId {
        CompetitionId::parse("c1").unwrap()
    }

    fn record(name: &str, score: Option<f64>) -> TrackingRecord {
        let candidate = Candidate::new(CandidateIdentity::new(name, "1"), "c1");
        let record = TrackingRecord::pending(candidate, competition());
        match score {
            Some(s) => record.scored(s),
            None => record,
        }
    }

    #[test]
    fn test_get_top_picks_highest_score() {
        let results = ResultSet::new(
            competition(),
            vec![record("A", Some(0.3)), record("B", Some(0.9)), record("C", Some(0.5))],
        );

        let top = results.get_top().unwrap();
        assert_eq!(top.identity().name, "B");
    }

    #[test]
    fn test_get_top_on_empty_result_set() {
        let results = ResultSet::new(competition(), vec![]);
        let err = results.get_top().unwrap_err();
        assert!(matches!(err, EvalError::EmptyResult { .. }));
    }

    #[test]
    fn test_ranked_keeps_order_for_ties_and_puts_unscored_last() {
        let results = ResultSet::new(
            competition(),
            vec![
                record("pending", None),
                record("first", Some(0.5)),
                record("second", Some(0.5)),
            ],
        );

        let names: Vec<&str> = results
            .ranked()
            .iter()
            .map(|r| r.identity().name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second", "pending"]);
    }

    #[test]
    fn test_refreshed_keeps_score_and_takes_new_metadata() {
        let old = record("A", Some(0.7));
        let newer = old
            .candidate
            .clone()
            .with_metadata("block", serde_json::json!(99));

        let refreshed = old.refreshed(newer.clone());
        assert_eq!(refreshed.score, Some(0.7));
        assert_eq!(refreshed.scored_at, old.scored_at);
        assert_eq!(refreshed.candidate, newer);
    }

    proptest! {
        #[test]
        fn prop_get_top_has_maximum_score(scores in prop::collection::vec(0.0f64..1.0, 1..20)) {
            let records = scores
                .iter()
                .enumerate()
                .map(|(i, s)| record(&format!("m{i}"), Some(*s)))
                .collect();
            let results = ResultSet::new(competition(), records);

            let top = results.get_top().unwrap().score.unwrap();
            let max = scores.iter().cloned().fold(f64::MIN, f64::max);
            prop_assert_eq!(top, max);
        }
    }
}
