//! Serializable views of pipeline state for command output.

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;

use super::{Formattable, TableFormatter};
use finetune_eval_datasets::DatasetInfo;
use finetune_eval_domain::{CompetitionId, ResultSet, TaskSet, TrackingRecord};

const TASK_PREVIEW: usize = 10;

fn score_cell(score: Option<f64>) -> String {
    score.map_or_else(|| "-".to_string(), |s| format!("{s:.4}"))
}

/// One tracking record
#[derive(Debug, Serialize)]
pub struct RecordRow {
    pub rank: usize,
    pub name: String,
    pub version: String,
    pub entered: String,
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scored_at: Option<DateTime<Utc>>,
}

impl RecordRow {
    fn new(rank: usize, record: &TrackingRecord) -> Self {
        Self {
            rank,
            name: record.candidate.identity.name.clone(),
            version: record.candidate.identity.version.clone(),
            entered: record.candidate.competition_id.clone(),
            score: record.score,
            scored_at: record.scored_at,
        }
    }
}

/// A competition's records, best first
#[derive(Debug, Serialize)]
pub struct ResultsReport {
    pub competition_id: CompetitionId,
    pub records: Vec<RecordRow>,
}

impl From<&ResultSet> for ResultsReport {
    fn from(results: &ResultSet) -> Self {
        let records = results
            .ranked()
            .into_iter()
            .enumerate()
            .map(|(i, record)| RecordRow::new(i + 1, record))
            .collect();
        Self {
            competition_id: results.competition_id.clone(),
            records,
        }
    }
}

impl Formattable for ResultsReport {
    fn format_table(&self) -> Result<String> {
        if self.records.is_empty() {
            return Ok(format!(
                "{}",
                format!("No results for competition {}", self.competition_id).yellow()
            ));
        }

        let rows = self
            .records
            .iter()
            .map(|r| {
                let entered = if r.entered == self.competition_id.as_str() {
                    r.entered.clone()
                } else {
                    r.entered.red().to_string()
                };
                vec![
                    format!("#{}", r.rank),
                    r.name.clone(),
                    r.version.clone(),
                    entered,
                    score_cell(r.score),
                    r.scored_at
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ]
            })
            .collect();

        Ok(TableFormatter::simple(
            vec!["Rank", "Candidate", "Version", "Competition", "Score", "Scored"],
            rows,
        ))
    }
}

/// The best candidate of a competition
#[derive(Debug, Serialize)]
pub struct TopReport {
    pub competition_id: CompetitionId,
    pub name: String,
    pub version: String,
    pub score: Option<f64>,
}

impl From<&TrackingRecord> for TopReport {
    fn from(record: &TrackingRecord) -> Self {
        Self {
            competition_id: record.competition_id.clone(),
            name: record.candidate.identity.name.clone(),
            version: record.candidate.identity.version.clone(),
            score: record.score,
        }
    }
}

impl Formattable for TopReport {
    fn format_table(&self) -> Result<String> {
        Ok(TableFormatter::key_value(vec![
            ("Competition", self.competition_id.to_string()),
            ("Top candidate", self.name.bold().green().to_string()),
            ("Version", self.version.clone()),
            ("Score", score_cell(self.score)),
        ]))
    }
}

/// Output of `run`: the results and, when there is one, the winner
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub results: ResultsReport,
    pub top: Option<TopReport>,
}

impl From<&ResultSet> for RunReport {
    fn from(results: &ResultSet) -> Self {
        Self {
            results: ResultsReport::from(results),
            top: results.get_top().ok().map(TopReport::from),
        }
    }
}

impl Formattable for RunReport {
    fn format_table(&self) -> Result<String> {
        let results = self.results.format_table()?;
        let top = match &self.top {
            Some(top) => top.format_table()?,
            None => "No scored candidates".yellow().to_string(),
        };
        Ok(format!("{results}\n{top}"))
    }
}

/// One task in the preview
#[derive(Debug, Serialize)]
pub struct TaskRow {
    pub index: usize,
    pub title: String,
    pub topic: String,
}

/// Summary of a competition's task set
#[derive(Debug, Serialize)]
pub struct TasksReport {
    pub competition_id: CompetitionId,
    pub dataset: String,
    pub size: usize,
    pub created_at: DateTime<Utc>,
    pub topics: BTreeMap<String, usize>,
    pub preview: Vec<TaskRow>,
}

impl TasksReport {
    pub fn new(competition_id: CompetitionId, tasks: &TaskSet) -> Self {
        let mut topics = BTreeMap::new();
        for task in tasks {
            *topics.entry(task.sample.topic.clone()).or_insert(0) += 1;
        }

        let preview = tasks
            .iter()
            .take(TASK_PREVIEW)
            .map(|task| TaskRow {
                index: task.index,
                title: task.sample.title.clone(),
                topic: task.sample.topic.clone(),
            })
            .collect();

        Self {
            competition_id,
            dataset: tasks.dataset().to_string(),
            size: tasks.len(),
            created_at: tasks.created_at(),
            topics,
            preview,
        }
    }
}

impl Formattable for TasksReport {
    fn format_table(&self) -> Result<String> {
        let summary = TableFormatter::key_value(vec![
            ("Competition", self.competition_id.to_string()),
            ("Dataset", self.dataset.clone()),
            ("Tasks", self.size.to_string()),
            ("Topics", self.topics.len().to_string()),
            ("Created", self.created_at.to_rfc3339()),
        ]);

        let rows = self
            .preview
            .iter()
            .map(|t| vec![t.index.to_string(), t.title.clone(), t.topic.clone()])
            .collect();
        let preview = TableFormatter::simple(vec!["#", "Title", "Topic"], rows);

        Ok(format!("{summary}\n{preview}"))
    }
}

/// One registered dataset source
#[derive(Debug, Serialize)]
pub struct DatasetRow {
    pub name: String,
    pub configured: bool,
    pub description: String,
}

/// Registered dataset sources
#[derive(Debug, Serialize)]
pub struct DatasetsReport {
    pub datasets: Vec<DatasetRow>,
}

impl From<Vec<DatasetInfo>> for DatasetsReport {
    fn from(infos: Vec<DatasetInfo>) -> Self {
        let datasets = infos
            .into_iter()
            .map(|info| DatasetRow {
                name: info.name.to_string(),
                configured: info.configured,
                description: info.description.to_string(),
            })
            .collect();
        Self { datasets }
    }
}

impl Formattable for DatasetsReport {
    fn format_table(&self) -> Result<String> {
        let rows = self
            .datasets
            .iter()
            .map(|d| {
                let status = if d.configured {
                    "ready".green().to_string()
                } else {
                    "not configured".yellow().to_string()
                };
                vec![d.name.clone(), status, d.description.clone()]
            })
            .collect();

        Ok(TableFormatter::simple(
            vec!["Dataset", "Status", "Description"],
            rows,
        ))
    }
}

/// Outcome of a purge
#[derive(Debug, Serialize)]
pub struct PurgeReport {
    /// Competition id, or `all`
    pub scope: String,
    pub removed: usize,
}

impl Formattable for PurgeReport {
    fn format_table(&self) -> Result<String> {
        let message = format!(
            "Removed {} checkpoint file(s) for {}",
            self.removed, self.scope
        );
        Ok(if self.removed > 0 {
            message.green().to_string()
        } else {
            message.dimmed().to_string()
        })
    }
}
