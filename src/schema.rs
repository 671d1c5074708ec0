//! Fixed layout of the CSV output and the filter tags that drive record selection.
//!
//! Everything here is immutable and shared by every worker; nothing is
//! configured at runtime.

/// Column names in output order.
pub const HEADER: [&str; 6] = [
    "str_id",
    "copy_number",
    "frequencies",
    "genotype",
    "depth",
    "depth_norm",
];

/// `FT` value of a call that passed every ConSTRain filter.
pub const PASS_TAG: &str = "PASS";

/// `FT` values whose records are dropped from the table.
pub const SKIP_TAGS: [&str; 4] = ["UNDEF", "DPZERO", "CNZERO", "CNMISSING"];

pub fn is_skip_tag(filter_tag: &str) -> bool {
    SKIP_TAGS.contains(&filter_tag)
}

/// A column of the output table.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Column {
    StrId,
    CopyNumber,
    Frequencies,
    Genotype,
    Depth,
    DepthNorm,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::StrId,
        Column::CopyNumber,
        Column::Frequencies,
        Column::Genotype,
        Column::Depth,
        Column::DepthNorm,
    ];

    /// Position of the column in [`HEADER`].
    pub const fn index(self) -> usize {
        match self {
            Column::StrId => 0,
            Column::CopyNumber => 1,
            Column::Frequencies => 2,
            Column::Genotype => 3,
            Column::Depth => 4,
            Column::DepthNorm => 5,
        }
    }

    pub const fn name(self) -> &'static str {
        HEADER[self.index()]
    }
}

/// One line of the output table. Unset columns stay empty so the width is
/// always that of [`HEADER`].
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct OutputRow {
    fields: [String; 6],
}

impl OutputRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: Column, value: impl Into<String>) {
        self.fields[column.index()] = value.into();
    }

    pub fn get(&self, column: Column) -> &str {
        &self.fields[column.index()]
    }

    pub fn fields(&self) -> &[String; 6] {
        &self.fields
    }
}
