//! Exclusion filter for noisy tick records.
//!
//! A record is excluded when it carries no trade volume, or when the book is
//! crossed (bid above ask) outside an exempt condition such as an auction
//! cross. Excluded records never reach a series.

use tickstats_core::config::FilterConfig;
use tickstats_core::{TickRecord, EXEMPT_CONDITIONS};

/// Why a record was excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Volume is zero: a non-trade update.
    ZeroVolume,
    /// Bid above ask without an exempt condition code.
    CrossedBook,
}

/// Counts of admitted and excluded records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Records admitted.
    pub admitted: u64,
    /// Records excluded for zero volume.
    pub zero_volume: u64,
    /// Records excluded for a crossed book.
    pub crossed_book: u64,
}

impl FilterStats {
    /// Total excluded records.
    pub fn rejected(&self) -> u64 {
        self.zero_volume + self.crossed_book
    }

    /// Total records seen.
    pub fn total(&self) -> u64 {
        self.admitted + self.rejected()
    }
}

/// Check a record against the default exemptions (`"XT"` and empty).
pub fn admit(record: &TickRecord) -> bool {
    exclusion(record, &EXEMPT_CONDITIONS[..]).is_none()
}

fn exclusion<S: AsRef<str>>(record: &TickRecord, exempt: &[S]) -> Option<Exclusion> {
    if record.trade_volume == 0 {
        return Some(Exclusion::ZeroVolume);
    }
    if record.is_crossed() && !exempt.iter().any(|c| c.as_ref() == record.condition_code) {
        return Some(Exclusion::CrossedBook);
    }
    None
}

/// Stateful filter that tracks exclusion statistics.
pub struct ExclusionFilter {
    /// Condition codes exempting a crossed book.
    exempt_conditions: Vec<String>,
    /// Filter statistics.
    stats: FilterStats,
}

impl ExclusionFilter {
    /// Create a filter from configuration.
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            exempt_conditions: config.exempt_conditions.clone(),
            stats: FilterStats::default(),
        }
    }

    /// Reason a record would be excluded, without touching statistics.
    pub fn check(&self, record: &TickRecord) -> Option<Exclusion> {
        exclusion(record, self.exempt_conditions.as_slice())
    }

    /// Admit or reject a record, updating statistics.
    pub fn admit(&mut self, record: &TickRecord) -> bool {
        match self.check(record) {
            None => {
                self.stats.admitted += 1;
                true
            }
            Some(Exclusion::ZeroVolume) => {
                self.stats.zero_volume += 1;
                false
            }
            Some(Exclusion::CrossedBook) => {
                self.stats.crossed_book += 1;
                false
            }
        }
    }

    /// Get filter statistics.
    pub fn stats(&self) -> &FilterStats {
        &self.stats
    }
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::new(&FilterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(bid: f64, ask: f64, vol: i64, cond: &str) -> TickRecord {
        TickRecord {
            instrument_id: "ABC".to_string(),
            date: None,
            bid_price: bid,
            ask_price: ask,
            trade_price: 100.0,
            trade_volume: vol,
            update_type: 1,
            timestamp: 0,
            condition_code: cond.to_string(),
        }
    }

    #[test]
    fn test_truth_table() {
        assert!(!admit(&make_record(1.0, 2.0, 0, "")));
        assert!(!admit(&make_record(3.0, 2.0, 5, "AU")));
        assert!(admit(&make_record(3.0, 2.0, 5, "XT")));
        assert!(admit(&make_record(1.0, 2.0, 5, "")));
    }

    #[test]
    fn test_crossed_with_empty_condition_is_exempt() {
        // Empty condition is an exemption, so a crossed book with no code passes.
        assert!(admit(&make_record(3.0, 2.0, 5, "")));
    }

    #[test]
    fn test_zero_volume_wins_over_exemption() {
        let filter = ExclusionFilter::default();
        assert_eq!(filter.check(&make_record(3.0, 2.0, 0, "XT")), Some(Exclusion::ZeroVolume));
    }

    #[test]
    fn test_locked_book_admitted() {
        assert!(admit(&make_record(2.0, 2.0, 5, "OB")));
    }

    #[test]
    fn test_custom_exemptions() {
        let mut filter = ExclusionFilter::new(&FilterConfig {
            exempt_conditions: vec!["AU".to_string()],
        });
        assert!(filter.admit(&make_record(3.0, 2.0, 5, "AU")));
        assert!(!filter.admit(&make_record(3.0, 2.0, 5, "XT")));
        assert!(!filter.admit(&make_record(3.0, 2.0, 5, "")));
    }

    #[test]
    fn test_stats() {
        let mut filter = ExclusionFilter::default();
        filter.admit(&make_record(1.0, 2.0, 10, ""));
        filter.admit(&make_record(1.0, 2.0, 0, ""));
        filter.admit(&make_record(3.0, 2.0, 10, "OB"));
        filter.admit(&make_record(3.0, 2.0, 10, "XT"));

        let stats = filter.stats();
        assert_eq!(stats.admitted, 2);
        assert_eq!(stats.zero_volume, 1);
        assert_eq!(stats.crossed_book, 1);
        assert_eq!(stats.rejected(), 2);
        assert_eq!(stats.total(), 4);
    }
}
