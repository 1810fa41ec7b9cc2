//! Batch pipeline: ingest, filter, group, summarize, emit.

use crate::sink::SummarySink;
use crate::source::RowSource;
use tickstats_core::{Config, MetricSummary, Result};
use tickstats_ingestion::{ExclusionFilter, FilterStats, ParseStats, PartitionBuilder, Partitions, RecordParser};
use tickstats_metrics::SummaryEngine;
use tracing::{info, warn};

/// Counters describing one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Parser statistics.
    pub parse: ParseStats,
    /// Exclusion filter statistics.
    pub filter: FilterStats,
    /// Instruments summarized.
    pub instruments: usize,
    /// Leaf partitions processed.
    pub partitions: usize,
}

/// Output of the ingestion pass.
#[derive(Debug)]
pub struct Ingested {
    /// Ordered partitions.
    pub partitions: Partitions,
    /// Parser statistics.
    pub parse: ParseStats,
    /// Exclusion filter statistics.
    pub filter: FilterStats,
}

/// Configured batch pipeline.
pub struct Pipeline {
    config: Config,
    engine: SummaryEngine,
}

impl Pipeline {
    /// Create a pipeline after validating the configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let engine = SummaryEngine::new(&config);
        Ok(Self { config, engine })
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read every row, keeping admitted records grouped and ordered.
    pub fn ingest(&self, source: &mut dyn RowSource) -> Result<Ingested> {
        let mut parser = RecordParser::new(&self.config)?;
        let mut filter = ExclusionFilter::new(&self.config.filter);
        let mut builder = PartitionBuilder::new(self.config.grouping.per_date);

        while let Some(fields) = source.next_row()? {
            // Structurally invalid rows are counted by the parser and skipped.
            let Ok(record) = parser.parse_fields(&fields) else {
                continue;
            };
            if filter.admit(&record) {
                builder.push(record);
            }
        }

        let parse = parser.stats().clone();
        let filter = filter.stats().clone();

        if parse.invalid_rows > 0 {
            warn!(
                source = source.origin(),
                invalid_rows = parse.invalid_rows,
                invalid_frac = parse.invalid_frac(),
                required_columns = parser.required_columns(),
                "skipped structurally invalid rows"
            );
        }
        info!(
            source = source.origin(),
            rows = parse.rows_read,
            malformed_fields = parse.malformed_fields,
            admitted = filter.admitted,
            zero_volume = filter.zero_volume,
            crossed_book = filter.crossed_book,
            instruments = builder.instrument_count(),
            "ingested tick rows"
        );

        Ok(Ingested {
            partitions: builder.build(),
            parse,
            filter,
        })
    }

    /// Ingest a source and compute one summary per instrument, in
    /// ascending instrument order.
    pub fn summarize(&self, source: &mut dyn RowSource) -> Result<(Vec<MetricSummary>, RunReport)> {
        let ingested = self.ingest(source)?;
        let report = RunReport {
            parse: ingested.parse,
            filter: ingested.filter,
            instruments: ingested.partitions.instrument_count(),
            partitions: ingested.partitions.partition_count(),
        };

        let summaries = self.engine.summarize_all(ingested.partitions);
        info!(
            instruments = report.instruments,
            partitions = report.partitions,
            "computed instrument summaries"
        );
        Ok((summaries, report))
    }

    /// Write summaries to a sink and finish it.
    pub fn emit(&self, summaries: &[MetricSummary], sink: &mut dyn SummarySink) -> Result<()> {
        for summary in summaries {
            sink.write_summary(summary)?;
        }
        sink.finish()
    }

    /// Summarize a source and write the result to a sink.
    ///
    /// All summaries are computed before the first write, so a source
    /// failure never leaves partial output in the sink.
    pub fn run(&self, source: &mut dyn RowSource, sink: &mut dyn SummarySink) -> Result<RunReport> {
        let (summaries, report) = self.summarize(source)?;
        self.emit(&summaries, sink)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use crate::source::MemorySource;
    use tickstats_core::config::SchemaLayout;

    fn v1_row(id: &str, bid: f64, ask: f64, trade: f64, vol: i64, ut: i64, time: i64, cond: &str) -> String {
        format!("{id},{bid},{ask},{trade},,,,{vol},{ut},,,{time},,,{cond}")
    }

    #[test]
    fn test_run_counts() {
        let pipeline = Pipeline::new(Config::default()).unwrap();
        let lines = vec![
            v1_row("B", 1.0, 2.0, 1.5, 10, 1, 100, ""),
            v1_row("A", 1.0, 2.0, 1.5, 0, 1, 100, ""),
            v1_row("A", 3.0, 2.0, 1.5, 10, 1, 110, "OB"),
            v1_row("A", 1.0, 2.0, 1.5, 10, 1, 120, ""),
            "A,1,2".to_string(),
        ];
        let mut source = MemorySource::from_lines(lines, &Config::default().schema);
        let mut sink = MemorySink::new();

        let report = pipeline.run(&mut source, &mut sink).unwrap();
        assert_eq!(report.parse.rows_read, 5);
        assert_eq!(report.parse.invalid_rows, 1);
        assert_eq!(report.filter.admitted, 2);
        assert_eq!(report.filter.zero_volume, 1);
        assert_eq!(report.filter.crossed_book, 1);
        assert_eq!(report.instruments, 2);
        assert!(sink.is_finished());

        let ids: Vec<&str> = sink.summaries().iter().map(|s| s.instrument_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.schema.layout = SchemaLayout::Custom;
        assert!(Pipeline::new(config).is_err());
    }
}
