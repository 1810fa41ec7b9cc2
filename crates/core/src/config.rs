//! Configuration structures for the tickstats system.

use crate::error::{Error, Result};
use crate::types::{EXEMPT_CONDITIONS, TRADE_UPDATE_TYPE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Date column used by the per-date feed variant when none is configured.
pub const DEFAULT_V2_DATE_COLUMN: usize = 10;

/// Main configuration for a tickstats run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input column layout.
    pub schema: SchemaConfig,
    /// Defaults substituted for malformed numeric fields.
    pub parse: ParseDefaults,
    /// Exclusion filter configuration.
    pub filter: FilterConfig,
    /// Partitioning configuration.
    pub grouping: GroupingConfig,
    /// Metric policy configuration.
    pub metrics: MetricsConfig,
    /// Report output configuration.
    pub output: OutputConfig,
}

impl Config {
    /// Load a configuration from a JSON file. Missing sections take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<()> {
        if !self.schema.delimiter.is_ascii() || matches!(self.schema.delimiter, '\n' | '\r') {
            return Err(Error::config(format!(
                "delimiter {:?} must be a single ASCII character other than a line break",
                self.schema.delimiter
            )));
        }
        self.schema.columns()?;
        if self.grouping.per_date && self.date_column().is_none() {
            return Err(Error::config(
                "per-date grouping requires a date column for this schema",
            ));
        }
        if self.metrics.quote_update_types.contains(&self.metrics.trade_update_type) {
            return Err(Error::config(format!(
                "update type {} cannot be both the trade type and a quote type",
                self.metrics.trade_update_type
            )));
        }
        Ok(())
    }

    /// Date column to read, if any.
    ///
    /// An explicit column always wins. Otherwise the V2 layout falls back to
    /// its conventional date column when per-date grouping is enabled.
    pub fn date_column(&self) -> Option<usize> {
        match (self.schema.date_column, self.schema.layout) {
            (Some(col), _) => Some(col),
            (None, SchemaLayout::V2) if self.grouping.per_date => Some(DEFAULT_V2_DATE_COLUMN),
            _ => None,
        }
    }
}

/// Named input column layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaLayout {
    /// bid/ask/trade at columns 1/2/3.
    #[default]
    V1,
    /// bid/ask/trade at columns 2/3/4.
    V2,
    /// Column indices supplied in `SchemaConfig::columns`.
    Custom,
}

impl FromStr for SchemaLayout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v1" | "schema_v1" | "schemav1" => Ok(SchemaLayout::V1),
            "v2" | "schema_v2" | "schemav2" => Ok(SchemaLayout::V2),
            "custom" => Ok(SchemaLayout::Custom),
            other => Err(format!("unknown schema layout '{other}' (expected v1, v2 or custom)")),
        }
    }
}

impl fmt::Display for SchemaLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchemaLayout::V1 => "v1",
            SchemaLayout::V2 => "v2",
            SchemaLayout::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// Zero-based column index for each field of a tick row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub instrument: usize,
    pub bid: usize,
    pub ask: usize,
    pub trade: usize,
    pub volume: usize,
    pub update_type: usize,
    pub time: usize,
    pub condition: usize,
}

impl ColumnLayout {
    /// Layout with bid/ask/trade at 1/2/3.
    pub const V1: ColumnLayout = ColumnLayout {
        instrument: 0,
        bid: 1,
        ask: 2,
        trade: 3,
        volume: 7,
        update_type: 8,
        time: 11,
        condition: 14,
    };

    /// Layout with bid/ask/trade at 2/3/4.
    pub const V2: ColumnLayout = ColumnLayout {
        instrument: 0,
        bid: 2,
        ask: 3,
        trade: 4,
        volume: 7,
        update_type: 8,
        time: 11,
        condition: 14,
    };

    /// Highest column index referenced.
    pub fn max_index(&self) -> usize {
        [
            self.instrument,
            self.bid,
            self.ask,
            self.trade,
            self.volume,
            self.update_type,
            self.time,
            self.condition,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Input schema configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Which column layout the feed uses.
    pub layout: SchemaLayout,
    /// Explicit column indices, required for the custom layout.
    pub columns: Option<ColumnLayout>,
    /// Column holding the trading date.
    pub date_column: Option<usize>,
    /// Field delimiter.
    pub delimiter: char,
    /// Skip the first input line.
    pub has_header: bool,
    /// Trailing columns that may be absent and are padded with empty fields.
    pub max_padding: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            layout: SchemaLayout::V1,
            columns: None,
            date_column: None,
            delimiter: ',',
            has_header: false,
            max_padding: 1,
        }
    }
}

impl SchemaConfig {
    /// Resolve the column layout for the configured schema.
    pub fn columns(&self) -> Result<ColumnLayout> {
        match (self.layout, self.columns) {
            (SchemaLayout::V1, _) => Ok(ColumnLayout::V1),
            (SchemaLayout::V2, _) => Ok(ColumnLayout::V2),
            (SchemaLayout::Custom, Some(columns)) => Ok(columns),
            (SchemaLayout::Custom, None) => {
                Err(Error::config("custom schema layout requires explicit columns"))
            }
        }
    }
}

/// Defaults substituted for empty or unparseable numeric fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseDefaults {
    /// Used for bid, ask and trade prices.
    pub price_default: f64,
    /// Used for volume, update type and time.
    pub integer_default: i64,
}

impl Default for ParseDefaults {
    fn default() -> Self {
        Self {
            price_default: 0.0,
            integer_default: 0,
        }
    }
}

/// Exclusion filter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Condition codes under which a crossed book is still admitted.
    pub exempt_conditions: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exempt_conditions: EXEMPT_CONDITIONS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Partitioning configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Sub-partition each instrument by trading date.
    pub per_date: bool,
}

/// How trade intervals are sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeIntervalPolicy {
    /// Every consecutive pair contributes one sample.
    #[default]
    AllPairs,
    /// Only trade records contribute, measured from the previous trade.
    TradeOnly,
}

impl FromStr for TradeIntervalPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "all_pairs" | "a" => Ok(TradeIntervalPolicy::AllPairs),
            "trade_only" | "b" => Ok(TradeIntervalPolicy::TradeOnly),
            other => Err(format!(
                "unknown trade interval policy '{other}' (expected all-pairs or trade-only)"
            )),
        }
    }
}

/// How tick-change intervals are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickChangePolicy {
    /// Accumulate time while the trade price is unchanged.
    #[default]
    PriceChange,
    /// Time between consecutive quote-class updates.
    QuoteUpdates,
}

impl FromStr for TickChangePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "price_change" => Ok(TickChangePolicy::PriceChange),
            "quote_updates" => Ok(TickChangePolicy::QuoteUpdates),
            other => Err(format!(
                "unknown tick change policy '{other}' (expected price-change or quote-updates)"
            )),
        }
    }
}

/// Metric computation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Trade interval sampling policy.
    pub trade_interval: TradeIntervalPolicy,
    /// Tick change measurement policy.
    pub tick_change: TickChangePolicy,
    /// Drop accumulated change intervals of exactly zero.
    pub skip_zero_durations: bool,
    /// Update type that marks a trade.
    pub trade_update_type: i64,
    /// Update types that mark quote-level updates.
    pub quote_update_types: Vec<i64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            trade_interval: TradeIntervalPolicy::AllPairs,
            tick_change: TickChangePolicy::PriceChange,
            skip_zero_durations: false,
            trade_update_type: TRADE_UPDATE_TYPE,
            quote_update_types: vec![2, 3],
        }
    }
}

/// Report output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Emit the column header row.
    pub write_header: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { write_header: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.schema.layout, SchemaLayout::V1);
        assert_eq!(config.metrics.trade_interval, TradeIntervalPolicy::AllPairs);
        assert_eq!(config.metrics.trade_update_type, 1);
        assert_eq!(config.filter.exempt_conditions, vec!["XT".to_string(), String::new()]);
        assert!(config.output.write_header);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_schema_columns() {
        let mut schema = SchemaConfig::default();
        assert_eq!(schema.columns().unwrap().bid, 1);

        schema.layout = SchemaLayout::V2;
        let v2 = schema.columns().unwrap();
        assert_eq!((v2.bid, v2.ask, v2.trade), (2, 3, 4));
        assert_eq!(v2.max_index(), 14);

        schema.layout = SchemaLayout::Custom;
        assert!(schema.columns().is_err());
    }

    #[test]
    fn test_per_date_requires_date_column() {
        let mut config = Config::default();
        config.grouping.per_date = true;
        assert!(config.validate().is_err());

        config.schema.layout = SchemaLayout::V2;
        assert_eq!(config.date_column(), Some(DEFAULT_V2_DATE_COLUMN));
        assert!(config.validate().is_ok());

        config.schema.layout = SchemaLayout::V1;
        config.schema.date_column = Some(9);
        assert_eq!(config.date_column(), Some(9));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_delimiter() {
        let mut config = Config::default();
        config.schema.delimiter = '\n';
        assert!(config.validate().is_err());
        config.schema.delimiter = 'é';
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_overlapping_update_types() {
        let mut config = Config::default();
        config.metrics.quote_update_types = vec![1, 2];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("trade-only".parse::<TradeIntervalPolicy>(), Ok(TradeIntervalPolicy::TradeOnly));
        assert_eq!("ALL_PAIRS".parse::<TradeIntervalPolicy>(), Ok(TradeIntervalPolicy::AllPairs));
        assert_eq!("quote-updates".parse::<TickChangePolicy>(), Ok(TickChangePolicy::QuoteUpdates));
        assert_eq!("schemaV2".parse::<SchemaLayout>(), Ok(SchemaLayout::V2));
        assert!("v3".parse::<SchemaLayout>().is_err());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"schema": {{"layout": "v2"}}, "metrics": {{"trade_interval": "trade_only"}}}}"#
        )
        .unwrap();

        let config = Config::from_json_file(file.path()).unwrap();
        assert_eq!(config.schema.layout, SchemaLayout::V2);
        assert_eq!(config.schema.delimiter, ',');
        assert_eq!(config.metrics.trade_interval, TradeIntervalPolicy::TradeOnly);
        assert_eq!(config.metrics.quote_update_types, vec![2, 3]);
    }

    #[test]
    fn test_missing_config_file() {
        let err = Config::from_json_file("/nonexistent/tickstats.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
