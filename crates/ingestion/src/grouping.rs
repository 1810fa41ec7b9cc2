//! Partitioning of admitted records by instrument (and optionally date).
//!
//! Records are collected into a [`PartitionBuilder`] as they stream in, then
//! frozen into [`Partitions`], where each leaf is stable-sorted by timestamp.
//! Iteration order is ascending instrument id, then ascending date.

use std::collections::BTreeMap;
use tickstats_core::{InstrumentSeries, TickRecord};

/// Accumulates admitted records per instrument and date.
#[derive(Debug, Default)]
pub struct PartitionBuilder {
    /// Sub-partition by trading date.
    per_date: bool,
    /// Records keyed by instrument, then date key.
    groups: BTreeMap<String, BTreeMap<Option<String>, Vec<TickRecord>>>,
    /// Records added so far.
    record_count: usize,
}

impl PartitionBuilder {
    /// Create a new builder.
    pub fn new(per_date: bool) -> Self {
        Self {
            per_date,
            groups: BTreeMap::new(),
            record_count: 0,
        }
    }

    /// Add an admitted record.
    pub fn push(&mut self, record: TickRecord) {
        let date_key = if self.per_date { record.date.clone() } else { None };
        self.groups
            .entry(record.instrument_id.clone())
            .or_default()
            .entry(date_key)
            .or_default()
            .push(record);
        self.record_count += 1;
    }

    /// Add multiple admitted records.
    pub fn extend(&mut self, records: impl IntoIterator<Item = TickRecord>) {
        for record in records {
            self.push(record);
        }
    }

    /// Number of records added.
    pub fn len(&self) -> usize {
        self.record_count
    }

    /// Whether no records were added.
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// Number of distinct instruments seen.
    pub fn instrument_count(&self) -> usize {
        self.groups.len()
    }

    /// Order every partition chronologically and freeze the result.
    pub fn build(self) -> Partitions {
        let instruments = self
            .groups
            .into_iter()
            .map(|(instrument_id, by_date)| {
                let series = by_date
                    .into_iter()
                    .map(|(date, mut records)| {
                        // Stable: same-instant events keep input order.
                        records.sort_by_key(|r| r.timestamp);
                        InstrumentSeries {
                            instrument_id: instrument_id.clone(),
                            date,
                            records,
                        }
                    })
                    .collect();
                (instrument_id, series)
            })
            .collect();

        Partitions {
            instruments,
            record_count: self.record_count,
        }
    }
}

/// Ordered partitions, one entry per instrument.
///
/// Each instrument holds a single series, or one series per date in
/// per-date mode.
#[derive(Debug, Default)]
pub struct Partitions {
    instruments: BTreeMap<String, Vec<InstrumentSeries>>,
    record_count: usize,
}

impl Partitions {
    /// Number of instruments.
    pub fn instrument_count(&self) -> usize {
        self.instruments.len()
    }

    /// Number of leaf partitions across all instruments.
    pub fn partition_count(&self) -> usize {
        self.instruments.values().map(Vec::len).sum()
    }

    /// Number of records across all partitions.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Partitions for one instrument.
    pub fn get(&self, instrument_id: &str) -> Option<&[InstrumentSeries]> {
        self.instruments.get(instrument_id).map(Vec::as_slice)
    }

    /// Instrument ids in ascending order.
    pub fn instrument_ids(&self) -> impl Iterator<Item = &str> {
        self.instruments.keys().map(String::as_str)
    }
}

impl IntoIterator for Partitions {
    type Item = (String, Vec<InstrumentSeries>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Vec<InstrumentSeries>>;

    fn into_iter(self) -> Self::IntoIter {
        self.instruments.into_iter()
    }
}
