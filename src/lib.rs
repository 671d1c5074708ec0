#![doc = include_str!("../README.md")]

pub mod cli;
pub mod conversion;
pub mod error;
pub mod input;
pub mod job;
pub mod paths;
pub mod pool;
pub mod report;
pub mod schema;
pub mod smart_reader;
pub mod transcode;

use serde::Serialize;

pub use conversion::{DirectoryConfig, convert_directory, convert_file};
pub use error::{ConvertError, ErrorClass};
pub use pool::ThreadCount;
pub use report::BatchReport;

/// Per-file record counts.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct ConversionSummary {
    /// Records read from the input.
    pub total_records: usize,
    /// Rows written to the output table, header excluded.
    pub emitted_rows: usize,
    /// Records dropped because their filter tag marks an uncallable locus.
    pub filtered_records: usize,
    /// Records dropped because copy number or depth could not be read.
    pub skipped_records: usize,
}
