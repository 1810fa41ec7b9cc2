//! Summary sinks.
//!
//! Any failure to create or write the output is a
//! [`Error::SinkUnavailable`].

use std::fs::File;
use std::io::Write;
use std::path::Path;
use tickstats_core::config::OutputConfig;
use tickstats_core::{Error, MetricSummary, Result};

/// Receiver of summary rows.
pub trait SummarySink {
    /// Write one instrument's summary.
    fn write_summary(&mut self, summary: &MetricSummary) -> Result<()>;

    /// Flush and close. Called once after the last summary.
    fn finish(&mut self) -> Result<()>;
}

/// Format a statistic for the report.
///
/// Uses the shortest representation that round-trips, so whole values
/// print without a fractional part (`20`, `0`).
pub fn format_value(value: f64) -> String {
    format!("{}", value)
}

/// Delimited report writer.
pub struct CsvSink<W: Write> {
    origin: String,
    writer: csv::Writer<W>,
    write_header: bool,
    header_written: bool,
}

impl CsvSink<File> {
    /// Create (or truncate) the report file.
    pub fn create(path: impl AsRef<Path>, config: &OutputConfig) -> Result<Self> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let file = File::create(path).map_err(|e| Error::sink_unavailable(origin.clone(), e))?;
        Ok(Self::new(file, origin, config))
    }
}

impl<W: Write> CsvSink<W> {
    /// Wrap any writer.
    pub fn new(writer: W, origin: impl Into<String>, config: &OutputConfig) -> Self {
        Self {
            origin: origin.into(),
            writer: csv::WriterBuilder::new().has_headers(false).from_writer(writer),
            write_header: config.write_header,
            header_written: false,
        }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        let origin = self.origin;
        self.writer
            .into_inner()
            .map_err(|e| Error::sink_unavailable(origin, e.into_error()))
    }

    fn sink_error(&self, err: csv::Error) -> Error {
        Error::sink_unavailable(self.origin.clone(), err.into())
    }

    fn ensure_header(&mut self) -> Result<()> {
        if self.write_header && !self.header_written {
            self.writer
                .write_record(MetricSummary::COLUMNS)
                .map_err(|e| self.sink_error(e))?;
        }
        self.header_written = true;
        Ok(())
    }
}

impl<W: Write> SummarySink for CsvSink<W> {
    fn write_summary(&mut self, summary: &MetricSummary) -> Result<()> {
        self.ensure_header()?;
        let row = std::iter::once(summary.instrument_id.clone())
            .chain(summary.values().into_iter().map(format_value));
        self.writer.write_record(row).map_err(|e| self.sink_error(e))
    }

    fn finish(&mut self) -> Result<()> {
        self.ensure_header()?;
        let origin = self.origin.clone();
        self.writer
            .flush()
            .map_err(|e| Error::sink_unavailable(origin, e))
    }
}

/// Collects summaries in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    summaries: Vec<MetricSummary>,
    finished: bool,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Summaries received so far.
    pub fn summaries(&self) -> &[MetricSummary] {
        &self.summaries
    }

    /// Whether `finish` was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Take the collected summaries.
    pub fn into_summaries(self) -> Vec<MetricSummary> {
        self.summaries
    }
}

impl SummarySink for MemorySink {
    fn write_summary(&mut self, summary: &MetricSummary) -> Result<()> {
        self.summaries.push(summary.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
