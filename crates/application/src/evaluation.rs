//! Incremental evaluation loop.
//!
//! Candidates are processed one at a time, in discovery order. After each
//! candidate the whole accumulated record set is written back to the
//! checkpoint store, so an interrupted run loses at most the candidate that
//! was being scored. Records that already carry a score are never scored
//! again.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info, instrument, warn};

use crate::ports::{CandidateDiscovery, CheckpointStore, Scorer, ScoringContext};
use finetune_eval_domain::{
    Candidate, CandidateIdentity, EvalResult, ResultSet, ScoringError, TaskSet, TrackingRecord,
};

/// Outcome of processing a single candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// A prior score was copied over
    Reused,
    /// The candidate entered another competition and was given 0.0
    Rejected,
    /// The scorer was invoked
    Scored,
}

/// Drives discovery, deduplication, scoring and persistence for one
/// competition.
pub struct EvaluationLoop {
    store: Arc<dyn CheckpointStore>,
    context: ScoringContext,
}

impl EvaluationLoop {
    /// Create a loop writing through `store`.
    pub fn new(store: Arc<dyn CheckpointStore>, context: ScoringContext) -> Self {
        Self { store, context }
    }

    /// Context passed to the scorer
    pub fn context(&self) -> &ScoringContext {
        &self.context
    }

    /// Run one evaluation pass.
    ///
    /// `prior` seeds the accumulated records; they keep their relative order
    /// and newly discovered candidates are appended after them.
    ///
    /// # Errors
    ///
    /// Discovery, scoring and storage failures abort the pass immediately.
    /// Every record persisted before the failure stays on disk.
    #[instrument(
        skip_all,
        fields(
            competition_id = %self.context.competition_id,
            run_id = %self.context.run_id,
            tasks = tasks.len(),
        )
    )]
    pub async fn run(
        &self,
        tasks: &TaskSet,
        discovery: &dyn CandidateDiscovery,
        scorer: &dyn Scorer,
        prior: Vec<TrackingRecord>,
    ) -> EvalResult<ResultSet> {
        let competition_id = &self.context.competition_id;
        let mut accumulated: IndexMap<CandidateIdentity, TrackingRecord> = prior
            .into_iter()
            .map(|record| (record.identity().clone(), record))
            .collect();

        let candidates = discovery.discover().await?;
        info!(
            discovered = candidates.len(),
            prior = accumulated.len(),
            "Gathered candidates"
        );

        for candidate in candidates {
            let identity = candidate.identity.clone();
            let (record, outcome) = self
                .process(accumulated.get(&identity), candidate, tasks, scorer)
                .await?;

            debug!(candidate = %identity, ?outcome, score = ?record.score, "Processed candidate");
            accumulated.insert(identity, record);

            let snapshot: Vec<TrackingRecord> = accumulated.values().cloned().collect();
            self.store.save_results(competition_id, &snapshot)?;
        }

        let records: Vec<TrackingRecord> = accumulated.into_values().collect();
        info!(
            records = records.len(),
            scores = ?records.iter().map(|r| r.score).collect::<Vec<_>>(),
            "Evaluation pass complete"
        );

        Ok(ResultSet::new(competition_id.clone(), records))
    }

    async fn process(
        &self,
        existing: Option<&TrackingRecord>,
        candidate: Candidate,
        tasks: &TaskSet,
        scorer: &dyn Scorer,
    ) -> EvalResult<(TrackingRecord, CandidateOutcome)> {
        if let Some(prior) = existing.filter(|r| r.is_scored()) {
            info!(
                candidate = %candidate.identity,
                score = ?prior.score,
                "Using previously evaluated score"
            );
            return Ok((prior.refreshed(candidate), CandidateOutcome::Reused));
        }

        let competition_id = self.context.competition_id.clone();

        if candidate.competition_id != competition_id.as_str() {
            warn!(
                candidate = %candidate.identity,
                entered = %candidate.competition_id,
                "Candidate belongs to another competition, scoring 0.0"
            );
            let record = TrackingRecord::pending(candidate, competition_id).scored(0.0);
            return Ok((record, CandidateOutcome::Rejected));
        }

        info!(candidate = %candidate.identity, "Evaluating candidate");
        let score = scorer.score(&self.context, &candidate, tasks).await?;
        if !score.is_finite() {
            return Err(ScoringError::InvalidScore {
                candidate: candidate.identity.to_string(),
                score,
            }
            .into());
        }
        info!(candidate = %candidate.identity, score, "Candidate scored");

        let record = TrackingRecord::pending(candidate, competition_id).scored(score);
        Ok((record, CandidateOutcome::Scored))
    }
}
