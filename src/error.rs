use std::{io, path::PathBuf};

use thiserror::Error;

use crate::transcode::TranscodeError;

/// Coarse grouping of [`ConvertError`]s, used to decide how far a failure
/// reaches.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ErrorClass {
    /// Bad arguments or filesystem layout, detected before any conversion.
    Config,
    /// A job's input or output could not be opened.
    Setup,
    /// An input does not hold exactly one sample.
    Schema,
    /// A job failed while reading or writing.
    Job,
    /// Releasing a job's resources failed.
    Close,
    /// Aggregated outcome of a directory run.
    Batch,
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("no VCF files found under directory '{}'", dir.display())]
    NoInputs { dir: PathBuf },
    #[error("cannot use path '{}' as {role}, not a directory", path.display())]
    NotADirectory { path: PathBuf, role: &'static str },
    #[error("cannot access {role} '{}': {source}", path.display())]
    DestinationUnavailable {
        path: PathBuf,
        role: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("failed to search '{}' for VCF files: {source}", dir.display())]
    Discovery {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error(
        "VCF files '{}' and '{}' would both make CSV file {basename}.csv",
        second.display(),
        first.display()
    )]
    DuplicateOutput {
        first: PathBuf,
        second: PathBuf,
        basename: String,
    },
    #[error("--threads must be greater than 0 (or -1 to use all available threads), got {requested}")]
    InvalidThreadCount { requested: i64 },
    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("failed to open '{}': {source}", path.display())]
    Setup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to convert '{}': {source}", input.display())]
    Conversion {
        input: PathBuf,
        #[source]
        source: TranscodeError,
    },
    #[error("failed to close '{}': {source}", path.display())]
    Close {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{failed} of {total} conversions failed")]
    BatchFailed { failed: usize, total: usize },
    #[error("failed to write report '{}': {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConvertError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ConvertError::NoInputs { .. }
            | ConvertError::NotADirectory { .. }
            | ConvertError::DestinationUnavailable { .. }
            | ConvertError::Discovery { .. }
            | ConvertError::DuplicateOutput { .. }
            | ConvertError::InvalidThreadCount { .. }
            | ConvertError::Pool(_) => ErrorClass::Config,
            ConvertError::Setup { .. } => ErrorClass::Setup,
            ConvertError::Conversion {
                source: TranscodeError::Schema { .. },
                ..
            } => ErrorClass::Schema,
            ConvertError::Conversion { .. } => ErrorClass::Job,
            ConvertError::Close { .. } => ErrorClass::Close,
            ConvertError::BatchFailed { .. } | ConvertError::Report { .. } => ErrorClass::Batch,
        }
    }
}
