//! PyO3 bindings for the tickstats pipeline.
//!
//! Exposes to Python:
//! - Per-instrument summaries
//! - A configured pipeline over files or in-memory rows

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

use tickstats_core::config::{SchemaLayout, TickChangePolicy, TradeIntervalPolicy};
use tickstats_core::{Config as RustConfig, Error as RustError, MetricSummary as RustMetricSummary};
use tickstats_report::{CsvSink, FileSource, MemorySink, MemorySource, Pipeline, RunReport};

// ============================================================================
// Python-exposed Types
// ============================================================================

/// Summary statistics for one instrument.
#[pyclass]
#[derive(Clone)]
pub struct MetricSummary {
    #[pyo3(get)]
    pub instrument_id: String,
    #[pyo3(get)]
    pub mean_trade_interval: f64,
    #[pyo3(get)]
    pub median_trade_interval: f64,
    #[pyo3(get)]
    pub mean_tick_change_interval: f64,
    #[pyo3(get)]
    pub median_tick_change_interval: f64,
    #[pyo3(get)]
    pub longest_trade_interval: f64,
    #[pyo3(get)]
    pub longest_tick_change_interval: f64,
    #[pyo3(get)]
    pub mean_spread: f64,
    #[pyo3(get)]
    pub median_spread: f64,
    #[pyo3(get)]
    pub price_round_number_effect: f64,
    #[pyo3(get)]
    pub volume_round_number_effect: f64,
    #[pyo3(get)]
    pub mean_type_change_interval: f64,
    #[pyo3(get)]
    pub median_type_change_interval: f64,
}

#[pymethods]
impl MetricSummary {
    /// Report column names, in output order.
    #[staticmethod]
    fn columns() -> Vec<&'static str> {
        RustMetricSummary::COLUMNS.to_vec()
    }

    /// Statistic values in report column order (without the id).
    fn values(&self) -> Vec<f64> {
        RustMetricSummary::from(self.clone()).values().to_vec()
    }

    fn __repr__(&self) -> String {
        format!(
            "MetricSummary(instrument_id={:?}, mean_trade_interval={}, mean_spread={})",
            self.instrument_id, self.mean_trade_interval, self.mean_spread
        )
    }
}

impl From<RustMetricSummary> for MetricSummary {
    fn from(s: RustMetricSummary) -> Self {
        MetricSummary {
            instrument_id: s.instrument_id,
            mean_trade_interval: s.mean_trade_interval,
            median_trade_interval: s.median_trade_interval,
            mean_tick_change_interval: s.mean_tick_change_interval,
            median_tick_change_interval: s.median_tick_change_interval,
            longest_trade_interval: s.longest_trade_interval,
            longest_tick_change_interval: s.longest_tick_change_interval,
            mean_spread: s.mean_spread,
            median_spread: s.median_spread,
            price_round_number_effect: s.price_round_number_effect,
            volume_round_number_effect: s.volume_round_number_effect,
            mean_type_change_interval: s.mean_type_change_interval,
            median_type_change_interval: s.median_type_change_interval,
        }
    }
}

impl From<MetricSummary> for RustMetricSummary {
    fn from(s: MetricSummary) -> Self {
        RustMetricSummary {
            instrument_id: s.instrument_id,
            mean_trade_interval: s.mean_trade_interval,
            median_trade_interval: s.median_trade_interval,
            mean_tick_change_interval: s.mean_tick_change_interval,
            median_tick_change_interval: s.median_tick_change_interval,
            longest_trade_interval: s.longest_trade_interval,
            longest_tick_change_interval: s.longest_tick_change_interval,
            mean_spread: s.mean_spread,
            median_spread: s.median_spread,
            price_round_number_effect: s.price_round_number_effect,
            volume_round_number_effect: s.volume_round_number_effect,
            mean_type_change_interval: s.mean_type_change_interval,
            median_type_change_interval: s.median_type_change_interval,
        }
    }
}

fn to_py_err(err: RustError) -> PyErr {
    match err {
        RustError::SourceUnavailable { .. } | RustError::SinkUnavailable { .. } | RustError::Io(_) => {
            PyIOError::new_err(err.to_string())
        }
        _ => PyValueError::new_err(err.to_string()),
    }
}

// ============================================================================
// Pipeline Wrapper
// ============================================================================

/// Configured summary pipeline.
#[pyclass]
pub struct PyPipeline {
    inner: Pipeline,
    last_report: Option<RunReport>,
}

#[pymethods]
impl PyPipeline {
    #[new]
    #[pyo3(signature = (
        schema = "v1",
        trade_interval = "all_pairs",
        tick_change = "price_change",
        per_date = false,
        date_column = None,
        skip_zero_durations = false,
        has_header = false,
    ))]
    fn new(
        schema: &str,
        trade_interval: &str,
        tick_change: &str,
        per_date: bool,
        date_column: Option<usize>,
        skip_zero_durations: bool,
        has_header: bool,
    ) -> PyResult<Self> {
        let mut config = RustConfig::default();
        config.schema.layout = schema.parse::<SchemaLayout>().map_err(PyValueError::new_err)?;
        config.schema.date_column = date_column;
        config.schema.has_header = has_header;
        config.grouping.per_date = per_date;
        config.metrics.trade_interval = trade_interval
            .parse::<TradeIntervalPolicy>()
            .map_err(PyValueError::new_err)?;
        config.metrics.tick_change = tick_change
            .parse::<TickChangePolicy>()
            .map_err(PyValueError::new_err)?;
        config.metrics.skip_zero_durations = skip_zero_durations;

        Self::build(config)
    }

    /// Create a pipeline from a JSON configuration file.
    #[staticmethod]
    fn from_config_file(path: &str) -> PyResult<Self> {
        let config = RustConfig::from_json_file(path).map_err(to_py_err)?;
        Self::build(config)
    }

    /// Summarize raw delimited lines.
    fn summarize_rows(&mut self, lines: Vec<String>) -> PyResult<Vec<MetricSummary>> {
        let mut source =
            MemorySource::from_lines(lines, &self.inner.config().schema).with_origin("python rows");
        let mut sink = MemorySink::new();
        let report = self.inner.run(&mut source, &mut sink).map_err(to_py_err)?;
        self.last_report = Some(report);
        Ok(sink.into_summaries().into_iter().map(|s| s.into()).collect())
    }

    /// Summarize a tick data file.
    fn summarize_file(&mut self, path: &str) -> PyResult<Vec<MetricSummary>> {
        let mut source = FileSource::open(path, &self.inner.config().schema).map_err(to_py_err)?;
        let (summaries, report) = self.inner.summarize(&mut source).map_err(to_py_err)?;
        self.last_report = Some(report);
        Ok(summaries.into_iter().map(|s| s.into()).collect())
    }

    /// Summarize `input` and write the report to `output`.
    ///
    /// Returns the number of instruments written.
    fn write_report(&mut self, input: &str, output: &str) -> PyResult<usize> {
        let mut source = FileSource::open(input, &self.inner.config().schema).map_err(to_py_err)?;
        let (summaries, report) = self.inner.summarize(&mut source).map_err(to_py_err)?;
        let mut sink = CsvSink::create(output, &self.inner.config().output).map_err(to_py_err)?;
        self.inner.emit(&summaries, &mut sink).map_err(to_py_err)?;

        let instruments = report.instruments;
        self.last_report = Some(report);
        Ok(instruments)
    }

    /// Statistics of the last run: (rows_read, invalid_rows,
    /// malformed_fields, admitted, zero_volume, crossed_book, instruments).
    fn stats(&self) -> (u64, u64, u64, u64, u64, u64, usize) {
        let r = self.last_report.clone().unwrap_or_default();
        (
            r.parse.rows_read,
            r.parse.invalid_rows,
            r.parse.malformed_fields,
            r.filter.admitted,
            r.filter.zero_volume,
            r.filter.crossed_book,
            r.instruments,
        )
    }

    /// Clear the last run's statistics.
    fn reset_stats(&mut self) {
        self.last_report = None;
    }
}

impl PyPipeline {
    fn build(config: RustConfig) -> PyResult<Self> {
        Ok(PyPipeline {
            inner: Pipeline::new(config).map_err(to_py_err)?,
            last_report: None,
        })
    }
}

// ============================================================================
// Module Definition
// ============================================================================

/// tickstats - per-instrument microstructure statistics.
#[pymodule]
fn tickstats(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<MetricSummary>()?;
    m.add_class::<PyPipeline>()?;
    Ok(())
}
