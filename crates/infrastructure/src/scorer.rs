//! Command-backed scorer
//!
//! Delegates scoring to an external program. The task set is written to a
//! temporary JSON file and the program is invoked as
//!
//! ```text
//! <command...> --model <name@version> --tasks <file> --similarity-model <name>
//! ```
//!
//! The score is read from the last non-empty line of its stdout.

use std::io::Write;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, instrument};

use finetune_eval_application::{Scorer, ScoringContext};
use finetune_eval_common::ScoringConfig;
use finetune_eval_domain::{Candidate, ConfigurationError, ScoringError, TaskSet};

/// Runs an external scoring program once per candidate.
#[derive(Debug, Clone)]
pub struct CommandScorer {
    program: String,
    args: Vec<String>,
}

impl CommandScorer {
    /// Scorer running `command[0]` with the remaining items as leading args.
    pub fn new(command: Vec<String>) -> Result<Self, ConfigurationError> {
        let mut parts = command.into_iter();
        let program = parts
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ConfigurationError::Missing("scoring.command".to_string()))?;

        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Scorer from the `scoring` settings.
    pub fn from_config(config: &ScoringConfig) -> Result<Self, ConfigurationError> {
        Self::new(config.command.clone())
    }
}

/// Parse the score from the program's stdout.
fn parse_score(stdout: &str) -> Result<f64, String> {
    let line = stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .ok_or_else(|| "scorer printed nothing".to_string())?;

    line.parse::<f64>()
        .map_err(|e| format!("cannot parse score from {:?}: {}", line, e))
}

#[async_trait]
impl Scorer for CommandScorer {
    #[instrument(
        skip(self, ctx, tasks),
        fields(candidate = %candidate.identity, run_id = %ctx.run_id)
    )]
    async fn score(
        &self,
        ctx: &ScoringContext,
        candidate: &Candidate,
        tasks: &TaskSet,
    ) -> Result<f64, ScoringError> {
        let name = candidate.identity.to_string();
        let failed = |message: String| ScoringError::Failed {
            candidate: name.clone(),
            message,
        };

        let mut task_file = NamedTempFile::new().map_err(|e| failed(e.to_string()))?;
        serde_json::to_writer(&mut task_file, tasks).map_err(|e| failed(e.to_string()))?;
        task_file.flush().map_err(|e| failed(e.to_string()))?;

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--model")
            .arg(&name)
            .arg("--tasks")
            .arg(task_file.path())
            .arg("--similarity-model")
            .arg(&ctx.similarity_model)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| failed(format!("cannot run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let score = parse_score(&String::from_utf8_lossy(&output.stdout)).map_err(failed)?;
        if !score.is_finite() {
            return Err(ScoringError::InvalidScore {
                candidate: name,
                score,
            });
        }

        debug!(score, "Scorer finished");
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finetune_eval_domain::{CandidateIdentity, CompetitionId};

    fn context() -> ScoringContext {
        ScoringContext::new(CompetitionId::parse("c1").unwrap(), "code-sim")
    }

    fn candidate() -> Candidate {
        Candidate::new(CandidateIdentity::new("org/model", "1"), "c1")
    }

    fn shell(script: &str) -> CommandScorer {
        CommandScorer::new(vec!["sh".into(), "-c".into(), script.into()]).unwrap()
    }

    #[test]
    fn test_parse_score_uses_last_line() {
        assert_eq!(parse_score("loading model\n\n0.42\n\n").unwrap(), 0.42);
        assert!(parse_score("").is_err());
        assert!(parse_score("done").is_err());
    }

    #[test]
    fn test_new_requires_program() {
        assert!(CommandScorer::new(vec![]).is_err());
        assert!(CommandScorer::new(vec!["  ".into()]).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_score_from_command_output() {
        let tasks = TaskSet::from_samples("synthetic", vec![]);
        let score = shell("echo warming up; echo 0.75")
            .score(&context(), &candidate(), &tasks)
            .await
            .unwrap();
        assert_eq!(score, 0.75);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_score_passes_model_flag() {
        // sh -c puts extra args in $0, $1, ...; $1 is the model name
        let tasks = TaskSet::from_samples("synthetic", vec![]);
        let err = shell("echo \"$1\" >&2; exit 3")
            .score(&context(), &candidate(), &tasks)
            .await
            .unwrap_err();

        match err {
            ScoringError::Failed { candidate, message } => {
                assert_eq!(candidate, "org/model@1");
                assert!(message.contains("org/model@1"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_finite_score_is_rejected() {
        let tasks = TaskSet::from_samples("synthetic", vec![]);
        let err = shell("echo NaN")
            .score(&context(), &candidate(), &tasks)
            .await
            .unwrap_err();
        assert!(matches!(err, ScoringError::InvalidScore { .. }));
    }
}
