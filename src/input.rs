use std::io::{self, BufRead};

use noodles::vcf::{
    self,
    variant::record::samples::{Sample as _, series::Value},
};
use thiserror::Error;

/// Why a per-sample annotation could not be read.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("record has no sample column")]
    NoSample,
    #[error("FORMAT field '{tag}' is missing")]
    Missing { tag: String },
    #[error("FORMAT field '{tag}' could not be parsed: {source}")]
    Invalid {
        tag: String,
        #[source]
        source: io::Error,
    },
    #[error("FORMAT field '{tag}' is not of type {expected}")]
    UnexpectedType { tag: String, expected: &'static str },
}

/// Tag-indexed access to the single sample of a locus call.
pub trait LocusFields {
    fn chromosome(&self) -> &str;

    /// 1-based position; VCF allows 0 for telomeric loci.
    fn position(&self) -> io::Result<usize>;

    fn integer(&self, tag: &str) -> Result<i32, FieldError>;

    fn string(&self, tag: &str) -> Result<String, FieldError>;
}

/// Reader over a single-sample VCF stream.
pub struct VcfSource<R> {
    reader: vcf::io::Reader<R>,
    header: vcf::Header,
}

impl<R> VcfSource<R>
where
    R: BufRead,
{
    /// Wraps `inner` and reads the VCF header.
    pub fn new(inner: R) -> io::Result<Self> {
        let mut reader = vcf::io::Reader::new(inner);
        let header = reader.read_header()?;
        Ok(Self { reader, header })
    }

    pub fn header(&self) -> &vcf::Header {
        &self.header
    }

    pub fn sample_count(&self) -> usize {
        self.header.sample_names().len()
    }

    /// Reads the next record into `record`, returning 0 at end of input.
    pub fn read_record(&mut self, record: &mut vcf::Record) -> io::Result<usize> {
        self.reader.read_record(record)
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

/// A VCF record viewed through its header.
pub struct VcfLocus<'a> {
    header: &'a vcf::Header,
    record: &'a vcf::Record,
}

impl<'a> VcfLocus<'a> {
    pub fn new(header: &'a vcf::Header, record: &'a vcf::Record) -> Self {
        Self { header, record }
    }

    fn value(&self, tag: &str) -> Result<SampleValue, FieldError> {
        let samples = self.record.samples();
        let sample = samples.get_index(0).ok_or(FieldError::NoSample)?;
        match sample.get(self.header, tag) {
            Some(Ok(Some(Value::Integer(n)))) => Ok(SampleValue::Integer(n)),
            Some(Ok(Some(Value::String(s)))) => Ok(SampleValue::String(s.into_owned())),
            Some(Ok(Some(_))) => Ok(SampleValue::Other),
            Some(Ok(None)) | None => Err(FieldError::Missing {
                tag: tag.to_string(),
            }),
            Some(Err(source)) => Err(FieldError::Invalid {
                tag: tag.to_string(),
                source,
            }),
        }
    }
}

enum SampleValue {
    Integer(i32),
    String(String),
    Other,
}

impl LocusFields for VcfLocus<'_> {
    fn chromosome(&self) -> &str {
        self.record.reference_sequence_name()
    }

    fn position(&self) -> io::Result<usize> {
        Ok(self
            .record
            .variant_start()
            .transpose()?
            .map(usize::from)
            .unwrap_or(0))
    }

    fn integer(&self, tag: &str) -> Result<i32, FieldError> {
        match self.value(tag)? {
            SampleValue::Integer(n) => Ok(n),
            _ => Err(FieldError::UnexpectedType {
                tag: tag.to_string(),
                expected: "Integer",
            }),
        }
    }

    fn string(&self, tag: &str) -> Result<String, FieldError> {
        match self.value(tag)? {
            SampleValue::String(s) => Ok(s),
            _ => Err(FieldError::UnexpectedType {
                tag: tag.to_string(),
                expected: "String",
            }),
        }
    }
}
