use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    ConversionSummary,
    error::ConvertError,
    input::VcfSource,
    smart_reader::TranscodingReader,
    transcode::{self, TranscodeError},
};

/// One VCF → CSV conversion with both streams already opened.
///
/// A job runs a single forward pass and is consumed by [`ConversionJob::execute`]
/// or [`ConversionJob::cleanup`]; it cannot be rewound.
pub struct ConversionJob {
    input: PathBuf,
    output: PathBuf,
    source: VcfSource<TranscodingReader>,
    writer: csv::Writer<File>,
}

impl ConversionJob {
    /// Creates (or truncates) `output` and opens `input`, reading its VCF header.
    ///
    /// Whatever was opened before a failure is released before returning.
    pub fn create(output: &Path, input: &Path) -> Result<Self, ConvertError> {
        let file = File::create(output).map_err(|source| ConvertError::Setup {
            path: output.to_path_buf(),
            source,
        })?;
        let reader = TranscodingReader::open(input).map_err(|source| ConvertError::Setup {
            path: input.to_path_buf(),
            source,
        })?;
        let source = VcfSource::new(reader).map_err(|source| ConvertError::Setup {
            path: input.to_path_buf(),
            source,
        })?;

        let writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);

        Ok(Self {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            source,
            writer,
        })
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Streams every record of the input into the output table.
    pub fn run(&mut self) -> Result<ConversionSummary, TranscodeError> {
        transcode::write_rows(&mut self.source, &mut self.writer)
    }

    /// Flushes and closes the output, then closes the input.
    ///
    /// Both sides are always released; the first failure is returned.
    pub fn cleanup(self) -> Result<(), ConvertError> {
        let ConversionJob {
            input,
            output,
            source,
            writer,
        } = self;

        let output_result = match writer.into_inner() {
            Ok(mut file) => file.flush(),
            Err(err) => Err(std::io::Error::new(err.error().kind(), err.error().to_string())),
        };
        let input_result = source.into_inner().close();

        output_result.map_err(|source| ConvertError::Close {
            path: output,
            source,
        })?;
        input_result.map_err(|source| ConvertError::Close {
            path: input,
            source,
        })?;
        Ok(())
    }

    /// Runs the conversion and releases both streams.
    ///
    /// A conversion error takes precedence over a close error.
    pub fn execute(mut self) -> Result<ConversionSummary, ConvertError> {
        tracing::info!(
            input = %self.input.display(),
            output = %self.output.display(),
            "writing variants",
        );

        let run_result = self.run();
        let input = self.input.clone();
        let cleanup_result = self.cleanup();

        let summary = run_result.map_err(|source| ConvertError::Conversion {
            input: input.clone(),
            source,
        })?;
        cleanup_result?;

        tracing::info!(
            input = %input.display(),
            records = summary.total_records,
            rows = summary.emitted_rows,
            filtered = summary.filtered_records,
            skipped = summary.skipped_records,
            "finished",
        );
        Ok(summary)
    }
}
