//! Data ingestion for the tickstats system.
//!
//! This crate handles:
//! - Row parsing with tolerant numeric conversion
//! - Exclusion of zero-volume and crossed-book records
//! - Partitioning by instrument (and date) with chronological ordering

pub mod parser;
pub mod filter;
pub mod grouping;

pub use parser::{ParseStats, RecordParser};
pub use filter::{admit, Exclusion, ExclusionFilter, FilterStats};
pub use grouping::{PartitionBuilder, Partitions};
