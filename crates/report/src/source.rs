//! Row sources.
//!
//! A source yields raw rows already split into fields. Any failure to open
//! or read the underlying input is a [`Error::SourceUnavailable`].

use std::fs::File;
use std::path::Path;
use tickstats_core::config::SchemaConfig;
use tickstats_core::{Error, Result};

/// Supplier of raw delimited rows.
pub trait RowSource {
    /// Human-readable origin used in errors and logs.
    fn origin(&self) -> &str;

    /// Next row split into fields, or `None` once exhausted.
    fn next_row(&mut self) -> Result<Option<Vec<String>>>;
}

/// Delimited file reader. No quoting, ragged rows allowed, empty lines
/// skipped.
pub struct FileSource {
    origin: String,
    reader: csv::Reader<File>,
    record: csv::ByteRecord,
}

impl FileSource {
    /// Open a file using the schema's delimiter and header setting.
    pub fn open(path: impl AsRef<Path>, schema: &SchemaConfig) -> Result<Self> {
        let path = path.as_ref();
        let origin = path.display().to_string();

        let reader = csv::ReaderBuilder::new()
            .has_headers(schema.has_header)
            .flexible(true)
            .quoting(false)
            .delimiter(schema.delimiter as u8)
            .from_path(path)
            .map_err(|e| Error::source_unavailable(origin.clone(), e.into()))?;

        Ok(Self {
            origin,
            reader,
            record: csv::ByteRecord::new(),
        })
    }
}

impl RowSource for FileSource {
    fn origin(&self) -> &str {
        &self.origin
    }

    fn next_row(&mut self) -> Result<Option<Vec<String>>> {
        let more = self
            .reader
            .read_byte_record(&mut self.record)
            .map_err(|e| Error::source_unavailable(self.origin.clone(), e.into()))?;
        if !more {
            return Ok(None);
        }

        // Undecodable bytes are kept lossily; the parser treats them as
        // malformed fields rather than failing the run.
        let fields = self
            .record
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();
        Ok(Some(fields))
    }
}

/// Rows held in memory as raw lines.
pub struct MemorySource {
    origin: String,
    lines: std::vec::IntoIter<String>,
    delimiter: char,
}

impl MemorySource {
    /// Wrap raw lines, skipping the first when the schema has a header.
    ///
    /// Empty lines are dropped before the header is considered, the same
    /// way [`FileSource`] never yields them.
    pub fn from_lines<I, S>(lines: I, schema: &SchemaConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let skip = usize::from(schema.has_header);
        let lines: Vec<String> = lines
            .into_iter()
            .map(|line| -> String { line.into() })
            .filter(|line| !line.trim_end_matches(['\r', '\n']).is_empty())
            .skip(skip)
            .collect();
        Self {
            origin: "memory".to_string(),
            lines: lines.into_iter(),
            delimiter: schema.delimiter,
        }
    }

    /// Override the origin label.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }
}

impl RowSource for MemorySource {
    fn origin(&self) -> &str {
        &self.origin
    }

    fn next_row(&mut self) -> Result<Option<Vec<String>>> {
        Ok(self.lines.next().map(|line| {
            line.trim_end_matches(['\r', '\n'])
                .split(self.delimiter)
                .map(str::to_string)
                .collect()
        }))
    }
}
