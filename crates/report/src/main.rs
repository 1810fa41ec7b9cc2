//! tickstats command-line entry point.
//!
//! ```bash
//! tickstats ticks.csv report.csv --schema v2 --trade-interval trade-only
//! ```
//!
//! Exit codes: 0 on success, 2 when the input cannot be read, 3 when the
//! report cannot be written, 4 for configuration errors, 1 otherwise.
//! Log level is taken from `RUST_LOG` (default `tickstats=info`).

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tickstats_core::config::{SchemaLayout, TickChangePolicy, TradeIntervalPolicy};
use tickstats_core::{Config, Error};
use tickstats_report::{CsvSink, FileSource, Pipeline};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "tickstats", about = "Per-instrument microstructure statistics from tick data")]
struct Args {
    /// Tick data file (delimited, one tick per row)
    input: PathBuf,

    /// Report file to create
    output: PathBuf,

    /// JSON configuration file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Column layout: v1, v2 or custom
    #[arg(long)]
    schema: Option<SchemaLayout>,

    /// Zero-based column holding the trading date
    #[arg(long)]
    date_column: Option<usize>,

    /// Process each trading date separately before merging
    #[arg(long)]
    per_date: bool,

    /// Trade interval policy: all-pairs or trade-only
    #[arg(long)]
    trade_interval: Option<TradeIntervalPolicy>,

    /// Tick change policy: price-change or quote-updates
    #[arg(long)]
    tick_change: Option<TickChangePolicy>,

    /// Drop change intervals of exactly zero
    #[arg(long)]
    skip_zero_durations: bool,

    /// Input starts with a header line
    #[arg(long)]
    has_header: bool,

    /// Do not write the report header row
    #[arg(long)]
    no_header: bool,
}

impl Args {
    fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(layout) = self.schema {
            config.schema.layout = layout;
        }
        if let Some(col) = self.date_column {
            config.schema.date_column = Some(col);
        }
        if self.per_date {
            config.grouping.per_date = true;
        }
        if let Some(policy) = self.trade_interval {
            config.metrics.trade_interval = policy;
        }
        if let Some(policy) = self.tick_change {
            config.metrics.tick_change = policy;
        }
        if self.skip_zero_durations {
            config.metrics.skip_zero_durations = true;
        }
        if self.has_header {
            config.schema.has_header = true;
        }
        if self.no_header {
            config.output.write_header = false;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tickstats=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tickstats failed: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = args.load_config()?;
    let pipeline = Pipeline::new(config)?;

    let mut source = FileSource::open(&args.input, &pipeline.config().schema)?;
    let (summaries, report) = pipeline.summarize(&mut source)?;

    // The report is only created once every summary is ready.
    let mut sink = CsvSink::create(&args.output, &pipeline.config().output)?;
    pipeline.emit(&summaries, &mut sink)?;

    info!(
        output = %args.output.display(),
        instruments = report.instruments,
        rows = report.parse.rows_read,
        invalid_rows = report.parse.invalid_rows,
        "report written"
    );
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<Error>() {
        Some(Error::SourceUnavailable { .. }) => 2,
        Some(Error::SinkUnavailable { .. }) => 3,
        Some(Error::Config(_) | Error::Json(_) | Error::Io(_)) => 4,
        _ => 1,
    }
}
