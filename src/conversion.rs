use std::path::{Path, PathBuf};

use crate::{
    ConversionSummary,
    error::ConvertError,
    job::ConversionJob,
    paths,
    pool::{ThreadCount, WorkerPool},
    report::BatchReport,
};

/// Configuration required to drive a directory conversion.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub recursive: bool,
    pub threads: ThreadCount,
    /// Where to write the JSON batch report, if anywhere.
    pub report: Option<PathBuf>,
}

impl DirectoryConfig {
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            recursive: false,
            threads: ThreadCount::All,
            report: None,
        }
    }
}

/// Converts one VCF file on the calling thread.
pub fn convert_file(input: &Path, output: &Path) -> Result<ConversionSummary, ConvertError> {
    ConversionJob::create(output, input)?.execute()
}

/// Converts every VCF file found under `config.source_dir`.
///
/// Discovery, output naming and job setup are checked before any record is
/// converted; a failure there aborts the run. Once the workers start, every
/// job runs to completion and the returned report records each outcome. Use
/// [`BatchReport::ensure_success`] to turn failed jobs into an error.
pub fn convert_directory(config: &DirectoryConfig) -> Result<BatchReport, ConvertError> {
    tracing::info!(
        source = %config.source_dir.display(),
        output = %config.output_dir.display(),
        recursive = config.recursive,
        "starting directory conversion",
    );

    let inputs = paths::discover_vcfs(&config.source_dir, config.recursive)?;
    let outputs = paths::make_output_paths(&inputs, &config.output_dir)?;

    let pool = WorkerPool::new(config.threads)?;

    let jobs = outputs
        .iter()
        .zip(&inputs)
        .map(|(output, input)| ConversionJob::create(output, input))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(files = jobs.len(), workers = pool.workers(), "converting");
    let outcomes = pool.run(jobs);
    let report = BatchReport::from_outcomes(&outcomes, pool.workers());

    if report.failed > 0 {
        tracing::warn!(
            failed = report.failed,
            total = report.total(),
            "some conversions failed",
        );
    } else {
        tracing::info!(files = report.total(), rows = report.totals.emitted_rows, "done");
    }

    if let Some(path) = &config.report {
        report.write(path)?;
    }

    Ok(report)
}
