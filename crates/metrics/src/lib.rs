//! Metric computation for the tickstats system.
//!
//! This crate handles:
//! - Trade, tick-change and update-type-change interval series
//! - Bid-ask spread series
//! - Price and volume round-number counters
//! - Mean/median/max/percentage reductions into summary rows

pub mod stats;
pub mod calculator;
pub mod engine;

pub use calculator::{MetricCalculator, MetricSeries};
pub use engine::SummaryEngine;
