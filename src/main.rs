use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use canopy::{
    controller::ControllerBuilder,
    grid::Grid,
    policy::{Policy, PolicyLoader},
    protocol::ProtocolReader,
    trace::{TraceConfig, TraceWriter},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Canopy bot speaking the referee line protocol")]
struct Cli {
    /// Policy YAML file (built-in defaults when omitted)
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Directory for per-decision JSON traces
    #[arg(long)]
    trace_dir: Option<PathBuf>,

    /// Write a trace every N decisions
    #[arg(long, default_value_t = 1)]
    trace_interval: u64,

    /// Log filter, e.g. `canopy=debug` (falls back to RUST_LOG)
    #[arg(long)]
    log: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol, so logs go to stderr.
    let filter = match &cli.log {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("Invalid log filter {directives}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let policy = match &cli.policy {
        Some(path) => PolicyLoader::new(".").load(path)?,
        None => Policy::default(),
    };

    let stdin = io::stdin();
    let mut reader = ProtocolReader::new(stdin.lock());
    let records = reader.read_board().context("Failed to read the board")?;
    let grid = Grid::from_records(&records).context("Invalid board")?;
    info!(cells = grid.len(), policy = ?policy.name, "board loaded");

    let mut builder = ControllerBuilder::new(grid, policy).with_default_planners();
    if let Some(dir) = cli.trace_dir {
        let config = TraceConfig::default()
            .with_output_dir(dir)
            .with_interval(cli.trace_interval);
        builder = builder.with_trace(TraceWriter::new(config));
    }
    let mut controller = builder.build();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    while let Some(input) = reader
        .read_turn()
        .with_context(|| format!("Failed to read turn near line {}", reader.line()))?
    {
        let action = controller.decide(&input)?;
        writeln!(out, "{action}")?;
        out.flush()?;
    }
    info!("input closed");
    Ok(())
}
