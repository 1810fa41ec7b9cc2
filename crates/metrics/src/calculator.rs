//! Single-pass metric computation over one ordered partition.
//!
//! Each record is compared with its immediate predecessor only; the running
//! state is constant-size, so the pass never looks past the partition it is
//! given.

use tickstats_core::config::{MetricsConfig, TickChangePolicy, TradeIntervalPolicy};
use tickstats_core::{InstrumentSeries, TickRecord, Timestamp};

/// Raw metric series for one partition (or several, concatenated).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSeries {
    /// Time between trades.
    pub trade_intervals: Vec<f64>,
    /// Time between tick changes.
    pub tick_change_intervals: Vec<f64>,
    /// Time between update-type changes.
    pub type_change_intervals: Vec<f64>,
    /// Ask minus bid, one entry per record.
    pub spreads: Vec<f64>,
    /// Trade-eligible records whose truncated price ends in zero.
    pub round_price_count: u64,
    /// Trade-eligible records whose volume ends in zero.
    pub round_volume_count: u64,
    /// Trade-eligible records. Denominator for both round-number effects.
    pub trade_eligible_count: u64,
}

impl MetricSeries {
    /// Concatenate another partition's series after this one.
    pub fn append(&mut self, mut other: MetricSeries) {
        self.trade_intervals.append(&mut other.trade_intervals);
        self.tick_change_intervals.append(&mut other.tick_change_intervals);
        self.type_change_intervals.append(&mut other.type_change_intervals);
        self.spreads.append(&mut other.spreads);
        self.round_price_count += other.round_price_count;
        self.round_volume_count += other.round_volume_count;
        self.trade_eligible_count += other.trade_eligible_count;
    }

    fn count_round_numbers(&mut self, record: &TickRecord) {
        self.trade_eligible_count += 1;
        if (record.trade_price.trunc() as i64) % 10 == 0 {
            self.round_price_count += 1;
        }
        if record.trade_volume % 10 == 0 {
            self.round_volume_count += 1;
        }
    }
}

/// Accumulates elapsed time while a keyed value stays unchanged.
#[derive(Debug, Clone, Copy)]
struct ChangeRun {
    elapsed: f64,
    skip_zero: bool,
}

impl ChangeRun {
    fn new(skip_zero: bool) -> Self {
        Self {
            elapsed: 0.0,
            skip_zero,
        }
    }

    /// Feed one consecutive pair. On a change the accumulated run is
    /// emitted and the accumulator restarts at zero; the changing pair's
    /// own gap is not part of either run.
    fn observe(&mut self, unchanged: bool, gap: f64, out: &mut Vec<f64>) {
        if unchanged {
            self.elapsed += gap;
        } else {
            emit(out, self.elapsed, self.skip_zero);
            self.elapsed = 0.0;
        }
    }
}

/// Elapsed time between two timestamps, in floating point so extreme
/// values cannot overflow.
fn elapsed(later: Timestamp, earlier: Timestamp) -> f64 {
    later as f64 - earlier as f64
}

fn emit(out: &mut Vec<f64>, value: f64, skip_zero: bool) {
    if !(skip_zero && value == 0.0) {
        out.push(value);
    }
}

/// Walks ordered partitions and produces [`MetricSeries`].
#[derive(Debug, Clone)]
pub struct MetricCalculator {
    trade_interval: TradeIntervalPolicy,
    tick_change: TickChangePolicy,
    skip_zero_durations: bool,
    trade_update_type: i64,
    quote_update_types: Vec<i64>,
}

impl MetricCalculator {
    /// Create a calculator from configuration.
    pub fn new(config: &MetricsConfig) -> Self {
        Self {
            trade_interval: config.trade_interval,
            tick_change: config.tick_change,
            skip_zero_durations: config.skip_zero_durations,
            trade_update_type: config.trade_update_type,
            quote_update_types: config.quote_update_types.clone(),
        }
    }

    /// Compute series for one ordered partition.
    pub fn compute_series(&self, series: &InstrumentSeries) -> MetricSeries {
        self.compute(&series.records)
    }

    /// Compute series for records already ordered by timestamp.
    pub fn compute(&self, records: &[TickRecord]) -> MetricSeries {
        let mut out = MetricSeries {
            spreads: Vec::with_capacity(records.len()),
            ..MetricSeries::default()
        };

        let mut price_run = ChangeRun::new(self.skip_zero_durations);
        let mut type_run = ChangeRun::new(self.skip_zero_durations);
        let mut last_trade_ts: Option<Timestamp> = None;
        let mut last_quote_ts: Option<Timestamp> = None;
        let mut prev: Option<&TickRecord> = None;

        for record in records {
            out.spreads.push(record.spread());

            let is_trade = record.is_trade(self.trade_update_type);
            let trade_eligible = match self.trade_interval {
                TradeIntervalPolicy::AllPairs => true,
                TradeIntervalPolicy::TradeOnly => is_trade,
            };
            if trade_eligible {
                out.count_round_numbers(record);
            }

            if self.trade_interval == TradeIntervalPolicy::TradeOnly && is_trade {
                if let Some(last) = last_trade_ts {
                    out.trade_intervals.push(elapsed(record.timestamp, last));
                }
                last_trade_ts = Some(record.timestamp);
            }

            if self.tick_change == TickChangePolicy::QuoteUpdates
                && self.quote_update_types.contains(&record.update_type)
            {
                if let Some(last) = last_quote_ts {
                    let gap = elapsed(record.timestamp, last);
                    emit(&mut out.tick_change_intervals, gap, self.skip_zero_durations);
                }
                last_quote_ts = Some(record.timestamp);
            }

            if let Some(prev) = prev {
                let gap = elapsed(record.timestamp, prev.timestamp);

                if self.trade_interval == TradeIntervalPolicy::AllPairs {
                    out.trade_intervals.push(gap);
                }
                if self.tick_change == TickChangePolicy::PriceChange {
                    price_run.observe(
                        record.trade_price == prev.trade_price,
                        gap,
                        &mut out.tick_change_intervals,
                    );
                }
                type_run.observe(
                    record.update_type == prev.update_type,
                    gap,
                    &mut out.type_change_intervals,
                );
            }
            prev = Some(record);
        }

        out
    }
}

impl Default for MetricCalculator {
    fn default() -> Self {
        Self::new(&MetricsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(ts: i64, price: f64, vol: i64, update_type: i64) -> TickRecord {
        TickRecord {
            instrument_id: "ABC".to_string(),
            date: None,
            bid_price: 10.0,
            ask_price: 11.0,
            trade_price: price,
            trade_volume: vol,
            update_type,
            timestamp: ts,
            condition_code: String::new(),
        }
    }

    fn calculator(trade_interval: TradeIntervalPolicy) -> MetricCalculator {
        MetricCalculator::new(&MetricsConfig {
            trade_interval,
            ..MetricsConfig::default()
        })
    }

    #[test]
    fn test_empty_and_single_record() {
        let calc = MetricCalculator::default();

        let empty = calc.compute(&[]);
        assert_eq!(empty, MetricSeries::default());

        let single = calc.compute(&[make_record(100, 50.0, 10, 1)]);
        assert!(single.trade_intervals.is_empty());
        assert!(single.tick_change_intervals.is_empty());
        assert!(single.type_change_intervals.is_empty());
        assert_eq!(single.spreads, vec![1.0]);
        assert_eq!(single.trade_eligible_count, 1);
    }

    #[test]
    fn test_all_pairs_gives_n_minus_one_samples() {
        let records: Vec<TickRecord> = (0..6)
            .map(|i| make_record(i * 7, 100.0, 10, 1 + (i % 3)))
            .collect();

        let series = calculator(TradeIntervalPolicy::AllPairs).compute(&records);
        assert_eq!(series.trade_intervals, vec![7.0; 5]);
        assert_eq!(series.spreads.len(), 6);
        assert_eq!(series.trade_eligible_count, 6);
    }

    #[test]
    fn test_trade_only_measures_from_previous_trade() {
        let records = vec![
            make_record(100, 10.0, 10, 2),
            make_record(110, 10.0, 10, 1),
            make_record(115, 10.0, 10, 3),
            make_record(130, 10.0, 10, 1),
            make_record(131, 10.0, 10, 1),
        ];

        let series = calculator(TradeIntervalPolicy::TradeOnly).compute(&records);
        assert_eq!(series.trade_intervals, vec![20.0, 1.0]);
        assert_eq!(series.trade_eligible_count, 3);
        assert_eq!(series.spreads.len(), 5);
    }

    #[test]
    fn test_tick_change_accumulation() {
        // Prices: 10, 10, 10, 11, 11, 12 at t = 0, 5, 15, 20, 30, 31.
        let records = vec![
            make_record(0, 10.0, 10, 1),
            make_record(5, 10.0, 10, 1),
            make_record(15, 10.0, 10, 1),
            make_record(20, 11.0, 10, 1),
            make_record(30, 11.0, 10, 1),
            make_record(31, 12.0, 10, 1),
        ];

        let series = MetricCalculator::default().compute(&records);
        // Run of 15 emitted at the first change, run of 10 at the second.
        assert_eq!(series.tick_change_intervals, vec![15.0, 10.0]);
        // Update type never changes, so nothing is emitted.
        assert!(series.type_change_intervals.is_empty());
    }

    #[test]
    fn test_zero_duration_skip_variant() {
        let records = vec![
            make_record(0, 10.0, 10, 1),
            make_record(5, 11.0, 10, 2),
            make_record(9, 11.0, 10, 2),
            make_record(12, 12.0, 10, 1),
        ];

        let keep = MetricCalculator::default().compute(&records);
        assert_eq!(keep.tick_change_intervals, vec![0.0, 4.0]);
        assert_eq!(keep.type_change_intervals, vec![0.0, 4.0]);

        let skip = MetricCalculator::new(&MetricsConfig {
            skip_zero_durations: true,
            ..MetricsConfig::default()
        })
        .compute(&records);
        assert_eq!(skip.tick_change_intervals, vec![4.0]);
        assert_eq!(skip.type_change_intervals, vec![4.0]);
    }

    #[test]
    fn test_quote_update_tick_policy() {
        let records = vec![
            make_record(0, 10.0, 10, 2),
            make_record(3, 10.0, 10, 1),
            make_record(8, 10.0, 10, 3),
            make_record(20, 10.0, 10, 2),
        ];

        let calc = MetricCalculator::new(&MetricsConfig {
            tick_change: TickChangePolicy::QuoteUpdates,
            ..MetricsConfig::default()
        });
        let series = calc.compute(&records);
        assert_eq!(series.tick_change_intervals, vec![8.0, 12.0]);
    }

    #[test]
    fn test_round_numbers_share_denominator() {
        let records = vec![
            make_record(0, 100.0, 50, 1), // round price, round volume
            make_record(1, 105.0, 60, 1), // round volume
            make_record(2, 109.9, 7, 2),  // neither; not a trade
            make_record(3, 120.7, 15, 1), // round price (truncated)
        ];

        let all = calculator(TradeIntervalPolicy::AllPairs).compute(&records);
        assert_eq!(all.trade_eligible_count, 4);
        assert_eq!(all.round_price_count, 2);
        assert_eq!(all.round_volume_count, 2);

        let trades = calculator(TradeIntervalPolicy::TradeOnly).compute(&records);
        assert_eq!(trades.trade_eligible_count, 3);
        assert_eq!(trades.round_price_count, 2);
        assert_eq!(trades.round_volume_count, 2);
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        let records = vec![
            make_record(i64::MIN, 10.0, 10, 1),
            make_record(0, 10.0, 10, 2),
            make_record(i64::MAX, 11.0, 10, 1),
        ];

        let all = calculator(TradeIntervalPolicy::AllPairs).compute(&records);
        assert_eq!(all.trade_intervals, vec![-(i64::MIN as f64), i64::MAX as f64]);
        assert_eq!(all.type_change_intervals, vec![0.0, 0.0]);

        let trades = calculator(TradeIntervalPolicy::TradeOnly).compute(&records);
        assert_eq!(trades.trade_intervals, vec![i64::MAX as f64 - i64::MIN as f64]);
    }

    #[test]
    fn test_append_concatenates() {
        let calc = MetricCalculator::default();
        let mut first = calc.compute(&[make_record(0, 10.0, 10, 1), make_record(10, 10.0, 10, 1)]);
        let second = calc.compute(&[make_record(500, 10.0, 10, 1), make_record(503, 10.0, 10, 1)]);

        first.append(second);
        // No interval spans the gap between the two partitions.
        assert_eq!(first.trade_intervals, vec![10.0, 3.0]);
        assert_eq!(first.spreads.len(), 4);
        assert_eq!(first.trade_eligible_count, 4);
    }
}
