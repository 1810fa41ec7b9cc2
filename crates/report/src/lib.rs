//! Report generation for the tickstats system.
//!
//! This crate provides:
//! - Row sources (delimited files, in-memory lines)
//! - Summary sinks (delimited report writer, in-memory collector)
//! - The batch pipeline tying ingestion and metrics together

pub mod source;
pub mod sink;
pub mod pipeline;

pub use source::{FileSource, MemorySource, RowSource};
pub use sink::{CsvSink, MemorySink, SummarySink};
pub use pipeline::{Ingested, Pipeline, RunReport};
