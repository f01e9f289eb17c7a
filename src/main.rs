use anyhow::{Context, Result};
use clap::Parser;
use megafile::{init_tracing_with_level, parse_iso_date, DirPublisher, MegafileExport, TidyTable};
use std::path::PathBuf;

const DATA_DIR: &str = "./public/data";

/// Export the merged COVID-19 dataset as CSV, XLSX and JSON, plus the latest snapshot.
#[derive(Debug, Parser)]
#[command(name = "megafile", version)]
struct Cli {
    /// Merged long-format table (CSV with a header row).
    #[arg(long)]
    input: PathBuf,

    /// Directory that receives the artifacts.
    #[arg(long, default_value = DATA_DIR)]
    out_dir: PathBuf,

    /// Static (per-location) column; repeat for each one.
    #[arg(long = "macro", value_name = "COLUMN")]
    macros: Vec<String>,

    /// Column holding the location identifier.
    #[arg(long, default_value = "location")]
    key_column: String,

    /// Reference date of the run (YYYY-MM-DD); defaults to today (UTC).
    #[arg(long, value_parser = parse_date)]
    date: Option<time::Date>,

    /// Trailing window of the latest snapshot, in days.
    #[arg(long, default_value_t = 14)]
    window_days: u32,

    /// Artifacts published in parallel.
    #[arg(long, default_value_t = 1)]
    jobs: usize,

    /// Destination prefix inside the output directory.
    #[arg(long, default_value = "public")]
    prefix: String,

    #[arg(long)]
    progress: bool,

    /// More logging (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_date(s: &str) -> Result<time::Date, String> {
    parse_iso_date(s).ok_or_else(|| format!("expected YYYY-MM-DD, got '{s}'"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => None,
        1 => Some("debug"),
        _ => Some("trace"),
    };
    init_tracing_with_level(level);

    let table = TidyTable::from_csv_path(&cli.input)
        .with_context(|| format!("loading {}", cli.input.display()))?;
    tracing::info!(rows = table.len(), columns = table.columns().len(), "loaded table");

    let mut export = MegafileExport::new()
        .destination_prefix(&cli.prefix)
        .key_column(cli.key_column.as_str())
        .window_days(cli.window_days)
        .publish_concurrency(cli.jobs)
        .progress(cli.progress);
    if let Some(date) = cli.date {
        export = export.reference_date(date);
    }

    let publisher = DirPublisher::new(&cli.out_dir);
    let report = export
        .run(&table, cli.macros.as_slice(), &publisher)
        .context("export failed; re-run the whole export")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
