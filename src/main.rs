use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand};
use quarterly_revenue::model::Quarter;
use quarterly_revenue::pipeline::{self, MappingOverrides};
use quarterly_revenue::{Result, ToolError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    match cli.command {
        Command::Inspect(args) => execute_inspect(args),
        Command::Combine(args) => execute_combine(args),
    }
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn execute_inspect(args: InspectArgs) -> Result<()> {
    let inspection = pipeline::inspect(&args.files.into_paths())?;

    for quarter in Quarter::ALL {
        println!(
            "{} ({}): {} rows",
            quarter.label(),
            quarter.period(),
            inspection.row_counts[quarter.index()]
        );
    }

    println!("\nAvailable columns:");
    for (index, column) in inspection.columns.iter().enumerate() {
        println!("  {}. {column}", index + 1);
    }

    println!("\nProposed mapping:");
    println!("  equipment key: {}", slot_display(&inspection.proposed.equipment_key));
    println!("  revenue:       {}", slot_display(&inspection.proposed.revenue));
    println!("  description:   {}", slot_display(&inspection.proposed.description));
    Ok(())
}

fn execute_combine(args: CombineArgs) -> Result<()> {
    let output = args.output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "Quarterly_Revenue_{}_{}.xlsx",
            args.year,
            Local::now().format("%Y%m%d")
        ))
    });

    let overrides = MappingOverrides {
        equipment_key: args.equipment_col,
        revenue: args.revenue_col,
        description: args.desc_col,
    };

    let report = pipeline::combine(&args.files.into_paths(), &overrides, &args.year, &output)?;

    println!("Combined {} equipment items", report.records.len());
    for quarter in Quarter::ALL {
        println!(
            "{} revenue: ${:.2}",
            quarter.label(),
            report.quarter_total(quarter)
        );
    }
    println!("Total: ${:.2}", report.grand_total());
    println!("Exported: {}", output.display());
    Ok(())
}

fn slot_display(slot: &Option<String>) -> &str {
    slot.as_deref().unwrap_or("(unset)")
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Combine four quarterly spreadsheets into one revenue report."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available columns and the proposed column mapping.
    Inspect(InspectArgs),
    /// Aggregate the four quarters and export the yearly report.
    Combine(CombineArgs),
}

#[derive(clap::Args)]
struct QuarterFiles {
    /// Q1 (Jan-Mar) workbook path.
    #[arg(long)]
    q1: PathBuf,

    /// Q2 (Apr-Jun) workbook path.
    #[arg(long)]
    q2: PathBuf,

    /// Q3 (Jul-Sep) workbook path.
    #[arg(long)]
    q3: PathBuf,

    /// Q4 (Oct-Dec) workbook path.
    #[arg(long)]
    q4: PathBuf,
}

impl QuarterFiles {
    fn into_paths(self) -> [PathBuf; 4] {
        [self.q1, self.q2, self.q3, self.q4]
    }
}

#[derive(clap::Args)]
struct InspectArgs {
    #[command(flatten)]
    files: QuarterFiles,
}

#[derive(clap::Args)]
struct CombineArgs {
    #[command(flatten)]
    files: QuarterFiles,

    /// Year label used in the report title and column headers.
    #[arg(long, default_value = "2025")]
    year: String,

    /// Destination workbook; defaults to Quarterly_Revenue_<year>_<date>.xlsx.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Override the equipment key column.
    #[arg(long)]
    equipment_col: Option<String>,

    /// Override the revenue column.
    #[arg(long)]
    revenue_col: Option<String>,

    /// Override the description column.
    #[arg(long)]
    desc_col: Option<String>,
}
