//! Core data types for the tickstats system.

use serde::{Deserialize, Serialize};

/// Seconds since midnight of the trading day.
pub type Timestamp = i64;

/// Update type carried by an actual trade print.
pub const TRADE_UPDATE_TYPE: i64 = 1;

/// Condition codes that exempt a crossed book from exclusion.
pub const EXEMPT_CONDITIONS: [&str; 2] = ["XT", ""];

/// One observation for one instrument at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    /// Stable instrument key (e.g. exchange code).
    pub instrument_id: String,
    /// Trading day, present only when a date column is configured.
    pub date: Option<String>,
    /// Best bid price.
    pub bid_price: f64,
    /// Best ask price.
    pub ask_price: f64,
    /// Last trade price.
    pub trade_price: f64,
    /// Trade volume; zero means no trade occurred.
    pub trade_volume: i64,
    /// Update class discriminator (1 = trade, 2/3 = quote-level updates).
    pub update_type: i64,
    /// Seconds since midnight.
    pub timestamp: Timestamp,
    /// Exchange-assigned condition marker.
    pub condition_code: String,
}

impl TickRecord {
    /// Calculate spread.
    #[inline]
    pub fn spread(&self) -> f64 {
        self.ask_price - self.bid_price
    }

    /// Bid above ask.
    #[inline]
    pub fn is_crossed(&self) -> bool {
        self.bid_price > self.ask_price
    }

    /// Whether this record carries the given trade update type.
    #[inline]
    pub fn is_trade(&self, trade_update_type: i64) -> bool {
        self.update_type == trade_update_type
    }
}

/// Chronologically ordered records for one instrument, or one
/// instrument-date when per-date grouping is configured.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentSeries {
    /// Instrument key.
    pub instrument_id: String,
    /// Trading day of this partition in per-date mode.
    pub date: Option<String>,
    /// Records ordered by ascending timestamp.
    pub records: Vec<TickRecord>,
}

impl InstrumentSeries {
    /// Number of records in the partition.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the partition holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether timestamps never decrease.
    pub fn is_ordered(&self) -> bool {
        self.records
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
    }
}

/// Per-instrument summary statistics. One row of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub instrument_id: String,
    pub mean_trade_interval: f64,
    pub median_trade_interval: f64,
    pub mean_tick_change_interval: f64,
    pub median_tick_change_interval: f64,
    pub longest_trade_interval: f64,
    pub longest_tick_change_interval: f64,
    pub mean_spread: f64,
    pub median_spread: f64,
    /// Share of trade-eligible records whose truncated price ends in zero.
    pub price_round_number_effect: f64,
    /// Share of trade-eligible records whose volume ends in zero.
    pub volume_round_number_effect: f64,
    pub mean_type_change_interval: f64,
    pub median_type_change_interval: f64,
}

impl MetricSummary {
    /// Report column names, in output order.
    pub const COLUMNS: [&'static str; 13] = [
        "InstrumentId",
        "MeanTradeInterval",
        "MedianTradeInterval",
        "MeanTickChangeInterval",
        "MedianTickChangeInterval",
        "LongestTradeInterval",
        "LongestTickChangeInterval",
        "MeanSpread",
        "MedianSpread",
        "PriceRoundNumberEffect",
        "VolumeRoundNumberEffect",
        "MeanTypeChangeInterval",
        "MedianTypeChangeInterval",
    ];

    /// A summary with every statistic at zero.
    pub fn zeroed(instrument_id: impl Into<String>) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            mean_trade_interval: 0.0,
            median_trade_interval: 0.0,
            mean_tick_change_interval: 0.0,
            median_tick_change_interval: 0.0,
            longest_trade_interval: 0.0,
            longest_tick_change_interval: 0.0,
            mean_spread: 0.0,
            median_spread: 0.0,
            price_round_number_effect: 0.0,
            volume_round_number_effect: 0.0,
            mean_type_change_interval: 0.0,
            median_type_change_interval: 0.0,
        }
    }

    /// Statistic values in column order (excluding the instrument id).
    pub fn values(&self) -> [f64; 12] {
        [
            self.mean_trade_interval,
            self.median_trade_interval,
            self.mean_tick_change_interval,
            self.median_tick_change_interval,
            self.longest_trade_interval,
            self.longest_tick_change_interval,
            self.mean_spread,
            self.median_spread,
            self.price_round_number_effect,
            self.volume_round_number_effect,
            self.mean_type_change_interval,
            self.median_type_change_interval,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(ts: Timestamp, bid: f64, ask: f64) -> TickRecord {
        TickRecord {
            instrument_id: "ABC".to_string(),
            date: None,
            bid_price: bid,
            ask_price: ask,
            trade_price: 100.0,
            trade_volume: 10,
            update_type: TRADE_UPDATE_TYPE,
            timestamp: ts,
            condition_code: String::new(),
        }
    }

    #[test]
    fn test_spread_and_crossed() {
        let rec = make_record(0, 10.0, 12.5);
        assert!((rec.spread() - 2.5).abs() < 1e-10);
        assert!(!rec.is_crossed());

        let crossed = make_record(0, 13.0, 12.5);
        assert!(crossed.is_crossed());
    }

    #[test]
    fn test_series_ordering() {
        let mut series = InstrumentSeries {
            instrument_id: "ABC".to_string(),
            date: None,
            records: vec![make_record(10, 1.0, 2.0), make_record(10, 1.0, 2.0), make_record(20, 1.0, 2.0)],
        };
        assert!(series.is_ordered());

        series.records.push(make_record(5, 1.0, 2.0));
        assert!(!series.is_ordered());
        assert_eq!(series.len(), 4);
    }

    #[test]
    fn test_summary_shape() {
        let summary = MetricSummary::zeroed("XYZ");
        assert_eq!(MetricSummary::COLUMNS.len(), summary.values().len() + 1);
        assert!(summary.values().iter().all(|v| *v == 0.0));
    }
}
