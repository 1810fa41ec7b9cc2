//! Raw row parsing and validation.
//!
//! Turns one delimited row into a [`TickRecord`]. Numeric fields are parsed
//! tolerantly: an empty or unparseable field is replaced by the configured
//! default and counted, rather than dropping the row. A row is only skipped
//! when it is too short to hold the schema's columns even after padding.

use tickstats_core::config::{ColumnLayout, ParseDefaults};
use tickstats_core::{Config, Result, RowError, TickRecord};
use tracing::debug;

/// Row issues logged individually before going quiet.
const MAX_LOGGED_ROW_ISSUES: u64 = 20;

/// Statistics about parse quality for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Rows handed to the parser.
    pub rows_read: u64,
    /// Rows turned into records.
    pub rows_parsed: u64,
    /// Rows skipped for having too few columns.
    pub invalid_rows: u64,
    /// Numeric fields replaced by their default.
    pub malformed_fields: u64,
}

impl ParseStats {
    /// Fraction of rows skipped as structurally invalid.
    pub fn invalid_frac(&self) -> f64 {
        if self.rows_read > 0 {
            self.invalid_rows as f64 / self.rows_read as f64
        } else {
            0.0
        }
    }
}

/// Parse a price field.
pub fn parse_f64(raw: &str, column: usize) -> std::result::Result<f64, RowError> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(RowError::MalformedField {
            column,
            raw: raw.to_string(),
        }),
    }
}

/// Parse an integer field.
///
/// Integral text parses directly; finite decimal text is truncated toward
/// zero (`"12.7"` reads as `12`). Decimal text outside the `i64` range is
/// malformed rather than clamped.
pub fn parse_i64(raw: &str, column: usize) -> std::result::Result<i64, RowError> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(value);
    }
    match trimmed.parse::<f64>().map(f64::trunc) {
        Ok(value) if (i64::MIN as f64..i64::MAX as f64).contains(&value) => Ok(value as i64),
        _ => Err(RowError::MalformedField {
            column,
            raw: raw.to_string(),
        }),
    }
}

/// Schema-driven row parser.
pub struct RecordParser {
    /// Column indices for each field.
    columns: ColumnLayout,
    /// Column holding the trading date.
    date_column: Option<usize>,
    /// Field delimiter.
    delimiter: char,
    /// Columns that may be missing at the end of a row.
    max_padding: usize,
    /// Minimum number of columns a full row has.
    required: usize,
    /// Field defaults.
    defaults: ParseDefaults,
    /// Parse statistics.
    stats: ParseStats,
}

impl RecordParser {
    /// Create a parser for the configured schema.
    pub fn new(config: &Config) -> Result<Self> {
        let columns = config.schema.columns()?;
        let date_column = config.date_column();
        let widest = date_column.map_or(columns.max_index(), |d| d.max(columns.max_index()));

        Ok(Self {
            columns,
            date_column,
            delimiter: config.schema.delimiter,
            max_padding: config.schema.max_padding,
            required: widest + 1,
            defaults: config.parse.clone(),
            stats: ParseStats::default(),
        })
    }

    /// Number of columns a complete row has.
    pub fn required_columns(&self) -> usize {
        self.required
    }

    /// Split a raw line on the delimiter and parse it.
    pub fn parse_line(&mut self, line: &str) -> std::result::Result<TickRecord, RowError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let fields: Vec<&str> = line.split(self.delimiter).collect();
        self.parse_fields(&fields)
    }

    /// Parse an already split row.
    pub fn parse_fields<S: AsRef<str>>(
        &mut self,
        fields: &[S],
    ) -> std::result::Result<TickRecord, RowError> {
        self.stats.rows_read += 1;

        if fields.len() + self.max_padding < self.required {
            self.stats.invalid_rows += 1;
            let err = RowError::StructurallyInvalidRow {
                found: fields.len(),
                required: self.required,
            };
            if self.stats.invalid_rows <= MAX_LOGGED_ROW_ISSUES {
                debug!(row = self.stats.rows_read, "{}", err);
            }
            return Err(err);
        }

        let field = |idx: usize| fields.get(idx).map_or("", |f| f.as_ref());
        let cols = self.columns;

        let bid_price = self.price(field(cols.bid), cols.bid);
        let ask_price = self.price(field(cols.ask), cols.ask);
        let trade_price = self.price(field(cols.trade), cols.trade);
        let trade_volume = self.integer(field(cols.volume), cols.volume);
        let update_type = self.integer(field(cols.update_type), cols.update_type);
        let timestamp = self.integer(field(cols.time), cols.time);

        self.stats.rows_parsed += 1;

        Ok(TickRecord {
            instrument_id: field(cols.instrument).to_string(),
            date: self.date_column.map(|d| field(d).to_string()),
            bid_price,
            ask_price,
            trade_price,
            trade_volume,
            update_type,
            timestamp,
            condition_code: field(cols.condition).to_string(),
        })
    }

    fn price(&mut self, raw: &str, column: usize) -> f64 {
        parse_f64(raw, column).unwrap_or_else(|err| {
            self.note_malformed(&err);
            self.defaults.price_default
        })
    }

    fn integer(&mut self, raw: &str, column: usize) -> i64 {
        parse_i64(raw, column).unwrap_or_else(|err| {
            self.note_malformed(&err);
            self.defaults.integer_default
        })
    }

    fn note_malformed(&mut self, err: &RowError) {
        self.stats.malformed_fields += 1;
        if self.stats.malformed_fields <= MAX_LOGGED_ROW_ISSUES {
            debug!(row = self.stats.rows_read, "{}; using default", err);
        }
    }

    /// Get parse statistics.
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }
}
