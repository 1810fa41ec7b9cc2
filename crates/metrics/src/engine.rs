//! Per-instrument summary engine.
//!
//! Runs the calculator over each partition of an instrument, concatenates
//! the resulting series in date order, and reduces them to a
//! [`MetricSummary`].

use crate::calculator::{MetricCalculator, MetricSeries};
use crate::stats::{max, mean, median, percentage};
use tickstats_core::{Config, InstrumentSeries, MetricSummary};
use tickstats_ingestion::Partitions;
use tracing::debug;

/// Summary computation engine.
#[derive(Debug, Clone, Default)]
pub struct SummaryEngine {
    calculator: MetricCalculator,
}

impl SummaryEngine {
    /// Create a new engine from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            calculator: MetricCalculator::new(&config.metrics),
        }
    }

    /// Compute the merged series for one instrument's partitions.
    ///
    /// Partitions are processed independently; no interval spans two of them.
    pub fn instrument_series(&self, partitions: &[InstrumentSeries]) -> MetricSeries {
        let mut merged = MetricSeries::default();
        for partition in partitions {
            merged.append(self.calculator.compute_series(partition));
        }
        merged
    }

    /// Summarize one instrument.
    pub fn summarize(&self, instrument_id: &str, partitions: &[InstrumentSeries]) -> MetricSummary {
        let series = self.instrument_series(partitions);
        debug!(
            instrument = instrument_id,
            partitions = partitions.len(),
            records = series.spreads.len(),
            trade_intervals = series.trade_intervals.len(),
            "summarizing instrument"
        );
        reduce(instrument_id, &series)
    }

    /// Summarize every instrument, consuming the partitions one at a time.
    pub fn summarize_all(&self, partitions: Partitions) -> Vec<MetricSummary> {
        let mut summaries = Vec::with_capacity(partitions.instrument_count());
        for (instrument_id, series) in partitions {
            summaries.push(self.summarize(&instrument_id, &series));
        }
        summaries
    }
}

/// Reduce raw series to summary statistics.
///
/// Both round-number effects divide by the trade-eligible record count.
pub fn reduce(instrument_id: &str, series: &MetricSeries) -> MetricSummary {
    MetricSummary {
        instrument_id: instrument_id.to_string(),
        mean_trade_interval: mean(&series.trade_intervals),
        median_trade_interval: median(&series.trade_intervals),
        mean_tick_change_interval: mean(&series.tick_change_intervals),
        median_tick_change_interval: median(&series.tick_change_intervals),
        longest_trade_interval: max(&series.trade_intervals),
        longest_tick_change_interval: max(&series.tick_change_intervals),
        mean_spread: mean(&series.spreads),
        median_spread: median(&series.spreads),
        price_round_number_effect: percentage(series.round_price_count, series.trade_eligible_count),
        volume_round_number_effect: percentage(series.round_volume_count, series.trade_eligible_count),
        mean_type_change_interval: mean(&series.type_change_intervals),
        median_type_change_interval: median(&series.type_change_intervals),
    }
}
