//! Mapping of ConSTRain locus calls onto rows of the CSV table.

use std::io::{self, BufRead, Write};

use noodles::vcf;
use thiserror::Error;

use crate::{
    ConversionSummary,
    input::{FieldError, LocusFields, VcfLocus, VcfSource},
    schema::{Column, HEADER, OutputRow, PASS_TAG, is_skip_tag},
};

/// Errors that stop the conversion of a whole file.
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("only VCF files with one sample are supported, found {samples}")]
    Schema { samples: usize },
    #[error("failed to read VCF record: {0}")]
    Read(#[from] io::Error),
    #[error("failed to write CSV row: {0}")]
    Write(#[from] csv::Error),
    #[error("required field at {locus}: {source}")]
    RequiredField {
        locus: String,
        #[source]
        source: FieldError,
    },
    #[error("malformed FREQS entry '{entry}' at {locus}")]
    MalformedFrequencies { locus: String, entry: String },
}

/// Annotations consulted for each locus.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Tag {
    FilterTag,
    CopyNumber,
    Depth,
    Frequencies,
    Genotype,
}

impl Tag {
    pub const fn key(self) -> &'static str {
        match self {
            Tag::FilterTag => "FT",
            Tag::CopyNumber => "CN",
            Tag::Depth => "DP",
            Tag::Frequencies => "FREQS",
            Tag::Genotype => "REPLEN",
        }
    }
}

/// What happens to a locus when looking up one of its annotations fails.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OnLookupFailure {
    /// Drop the locus and continue with the next one.
    SkipRecord,
    /// Emit the row with the column left empty.
    EmptyColumn,
    /// Abort the conversion of the file.
    Abort,
}

/// `REPLEN` is only looked up for passing calls; its policy applies there.
pub const fn lookup_policy(tag: Tag) -> OnLookupFailure {
    match tag {
        Tag::FilterTag | Tag::Genotype => OnLookupFailure::Abort,
        Tag::CopyNumber | Tag::Depth => OnLookupFailure::SkipRecord,
        Tag::Frequencies => OnLookupFailure::EmptyColumn,
    }
}

/// Result of mapping one locus.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Transcoded {
    Row(OutputRow),
    /// Filter tag is in the skip set.
    Filtered,
    /// A lookup failed under [`OnLookupFailure::SkipRecord`].
    Skipped,
}

/// Maps a single locus call onto a row of the table.
///
/// Loci whose filter tag is one of [`crate::schema::SKIP_TAGS`] or whose
/// `CN`/`DP` cannot be read produce no row.
pub fn transcode_locus<L>(locus: &L) -> Result<Transcoded, TranscodeError>
where
    L: LocusFields,
{
    // ids use the 0-based start
    let position = locus.position()? as i64;
    let str_id = format!("{}_{}", locus.chromosome(), position - 1);

    // FT lookups always abort, as lookup_policy states
    let filter_tag = locus
        .string(Tag::FilterTag.key())
        .map_err(|source| TranscodeError::RequiredField {
            locus: str_id.clone(),
            source,
        })?;
    if is_skip_tag(&filter_tag) {
        return Ok(Transcoded::Filtered);
    }

    let copy_number = lookup(locus, &str_id, Tag::CopyNumber, |l, key| l.integer(key))?;
    let depth = lookup(locus, &str_id, Tag::Depth, |l, key| l.integer(key))?;
    let (Some(copy_number), Some(depth)) = (copy_number, depth) else {
        return Ok(Transcoded::Skipped);
    };
    let depth_norm = f64::from(depth) / f64::from(copy_number);

    let mut row = OutputRow::new();
    row.set(Column::CopyNumber, copy_number.to_string());
    row.set(Column::Depth, depth.to_string());
    row.set(Column::DepthNorm, format_depth_norm(depth_norm));

    if let Some(raw) = lookup(locus, &str_id, Tag::Frequencies, |l, key| l.string(key))? {
        row.set(Column::Frequencies, format_frequencies(&raw, &str_id)?);
    }

    if filter_tag == PASS_TAG
        && let Some(raw) = lookup(locus, &str_id, Tag::Genotype, |l, key| l.string(key))?
    {
        row.set(Column::Genotype, format_genotype(&raw));
    }

    row.set(Column::StrId, str_id);
    Ok(Transcoded::Row(row))
}

/// Looks up `tag`, resolving a failure through [`lookup_policy`]: `Ok(None)`
/// means the caller should skip the record or leave the column empty.
fn lookup<L, T, F>(
    locus: &L,
    str_id: &str,
    tag: Tag,
    get: F,
) -> Result<Option<T>, TranscodeError>
where
    L: LocusFields,
    F: FnOnce(&L, &str) -> Result<T, FieldError>,
{
    match get(locus, tag.key()) {
        Ok(value) => Ok(Some(value)),
        Err(source) => match lookup_policy(tag) {
            OnLookupFailure::Abort => Err(TranscodeError::RequiredField {
                locus: str_id.to_string(),
                source,
            }),
            OnLookupFailure::SkipRecord => {
                tracing::trace!(locus = str_id, error = %source, "skipping locus");
                Ok(None)
            }
            OnLookupFailure::EmptyColumn => Ok(None),
        },
    }
}

/// Rewrites `"10,0.5|12,0.5"` as `"{10: 0.5,12: 0.5,}"`.
///
/// The trailing comma is part of the established output format.
pub fn format_frequencies(raw: &str, str_id: &str) -> Result<String, TranscodeError> {
    if raw.is_empty() {
        return Ok(String::new());
    }

    let mut formatted = String::with_capacity(raw.len() + 8);
    formatted.push('{');
    for entry in raw.split('|') {
        // fields past the second are ignored
        let mut parts = entry.split(',');
        let (Some(length), Some(frequency)) = (parts.next(), parts.next()) else {
            return Err(TranscodeError::MalformedFrequencies {
                locus: str_id.to_string(),
                entry: entry.to_string(),
            });
        };
        formatted.push_str(length);
        formatted.push_str(": ");
        formatted.push_str(frequency);
        formatted.push(',');
    }
    formatted.push('}');
    Ok(formatted)
}

/// Shortest round-trip decimal; a zero copy number gives `+Inf` or `NaN`.
pub fn format_depth_norm(value: f64) -> String {
    if value.is_nan() {
        String::from("NaN")
    } else if value.is_infinite() {
        String::from(if value > 0.0 { "+Inf" } else { "-Inf" })
    } else {
        value.to_string()
    }
}

/// Rewrites `"10,12"` as `"[10,12]"`.
pub fn format_genotype(raw: &str) -> String {
    format!("[{raw}]")
}

/// Writes the header and one row per retained locus of `source`, in order.
///
/// Nothing is written when the source does not hold exactly one sample.
pub fn write_rows<R, W>(
    source: &mut VcfSource<R>,
    writer: &mut csv::Writer<W>,
) -> Result<ConversionSummary, TranscodeError>
where
    R: BufRead,
    W: Write,
{
    let samples = source.sample_count();
    if samples != 1 {
        return Err(TranscodeError::Schema { samples });
    }

    writer.write_record(HEADER)?;

    let mut summary = ConversionSummary::default();
    let mut record = vcf::Record::default();
    loop {
        if source.read_record(&mut record)? == 0 {
            break;
        }
        summary.total_records += 1;

        let locus = VcfLocus::new(source.header(), &record);
        match transcode_locus(&locus)? {
            Transcoded::Row(row) => {
                writer.write_record(row.fields())?;
                summary.emitted_rows += 1;
            }
            Transcoded::Filtered => summary.filtered_records += 1,
            Transcoded::Skipped => summary.skipped_records += 1,
        }
    }

    writer
        .flush()
        .map_err(|e| TranscodeError::Write(e.into()))?;
    Ok(summary)
}
