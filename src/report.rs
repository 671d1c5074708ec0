//! Outcome report for a directory run.
//!
//! The report lists every job with its record counts or error message and can
//! be written as JSON for downstream tooling.

use serde::Serialize;
use std::path::Path;

use crate::{ConversionSummary, error::ConvertError, pool::JobOutcome};

/// Aggregated result of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Tool version
    pub version: String,
    /// Timestamp of run (RFC 3339)
    pub timestamp: String,
    pub workers: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Record counts summed over successful jobs.
    pub totals: ConversionSummary,
    pub jobs: Vec<JobReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub input: String,
    pub output: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ConversionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Converted,
    Failed,
}

impl From<&JobOutcome> for JobReport {
    fn from(outcome: &JobOutcome) -> Self {
        let (status, summary, error) = match &outcome.result {
            Ok(summary) => (JobStatus::Converted, Some(*summary), None),
            Err(err) => (JobStatus::Failed, None, Some(error_chain(err))),
        };
        JobReport {
            input: outcome.input.display().to_string(),
            output: outcome.output.display().to_string(),
            status,
            summary,
            error,
        }
    }
}

impl BatchReport {
    pub fn from_outcomes(outcomes: &[JobOutcome], workers: usize) -> Self {
        let timestamp = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string());

        let jobs: Vec<JobReport> = outcomes.iter().map(JobReport::from).collect();
        let mut totals = ConversionSummary::default();
        for summary in jobs.iter().filter_map(|job| job.summary.as_ref()) {
            totals.total_records += summary.total_records;
            totals.emitted_rows += summary.emitted_rows;
            totals.filtered_records += summary.filtered_records;
            totals.skipped_records += summary.skipped_records;
        }
        let failed = jobs
            .iter()
            .filter(|job| job.status == JobStatus::Failed)
            .count();

        BatchReport {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp,
            workers,
            succeeded: jobs.len() - failed,
            failed,
            totals,
            jobs,
        }
    }

    pub fn total(&self) -> usize {
        self.jobs.len()
    }

    /// Turns a batch with failed jobs into an error.
    pub fn ensure_success(&self) -> Result<(), ConvertError> {
        if self.failed > 0 {
            return Err(ConvertError::BatchFailed {
                failed: self.failed,
                total: self.total(),
            });
        }
        Ok(())
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> Result<(), ConvertError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(std::io::Error::other)
            .and_then(|json| std::fs::write(path, json));
        json.map_err(|source| ConvertError::Report {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Wrote batch report to {}", path.display());
        Ok(())
    }
}

fn error_chain(err: &ConvertError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcode::TranscodeError;
    use std::path::PathBuf;

    fn outcomes() -> Vec<JobOutcome> {
        vec![
            JobOutcome {
                input: PathBuf::from("in/a.vcf"),
                output: PathBuf::from("out/a.csv"),
                result: Ok(ConversionSummary {
                    total_records: 5,
                    emitted_rows: 3,
                    filtered_records: 1,
                    skipped_records: 1,
                }),
            },
            JobOutcome {
                input: PathBuf::from("in/b.vcf"),
                output: PathBuf::from("out/b.csv"),
                result: Err(ConvertError::Conversion {
                    input: PathBuf::from("in/b.vcf"),
                    source: TranscodeError::Schema { samples: 2 },
                }),
            },
        ]
    }

    #[test]
    fn counts_successes_and_failures() {
        let report = BatchReport::from_outcomes(&outcomes(), 2);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.total(), 2);
        assert_eq!(report.totals.emitted_rows, 3);

        let err = report.ensure_success().unwrap_err();
        assert!(matches!(
            err,
            ConvertError::BatchFailed {
                failed: 1,
                total: 2
            }
        ));
    }

    #[test]
    fn serializes_job_status_and_error() {
        let report = BatchReport::from_outcomes(&outcomes(), 1);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["jobs"][0]["status"], "converted");
        assert_eq!(value["jobs"][0]["summary"]["emitted_rows"], 3);
        assert!(value["jobs"][0].get("error").is_none());

        assert_eq!(value["jobs"][1]["status"], "failed");
        assert!(value["jobs"][1].get("summary").is_none());
        assert!(
            value["jobs"][1]["error"]
                .as_str()
                .unwrap()
                .contains("in/b.vcf")
        );
    }

    #[test]
    fn writes_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = BatchReport::from_outcomes(&outcomes()[..1], 1);

        report.write(&path).unwrap();
        report.ensure_success().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["succeeded"], 1);
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn unwritable_report_path_is_a_batch_error() {
        let dir = tempfile::tempdir().unwrap();
        let report = BatchReport::from_outcomes(&[], 1);
        let err = report.write(&dir.path().join("missing/report.json")).unwrap_err();
        assert_eq!(err.class(), crate::ErrorClass::Batch);
    }
}
