mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::export::ExportArgs;
use commands::ViewArgs;

/// Financial controlling dashboard on synthetic company data
#[derive(Parser)]
#[command(
    name = "fcd",
    version,
    about = "Financial controlling dashboard on synthetic company data",
    long_about = "Generates a seeded synthetic monthly financial dataset for a five-department \
                  company and derives the controlling dashboard from it: KPI cards, ratio \
                  table, cash flow metrics, margin heatmap, correlation matrix and what-if \
                  scenarios over a trailing time window."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log debug events to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the monthly and department base tables
    Generate(ViewArgs),
    /// Full dashboard: filtered tables, KPIs, ratios, cash flow and charts
    Dashboard(ViewArgs),
    /// Financial ratio table for the latest month in the window
    Ratios(ViewArgs),
    /// Profit margin heatmap by year and month
    Heatmap(ViewArgs),
    /// Correlation matrix of revenue, expenses, profit and margin
    Correlation(ViewArgs),
    /// Write the filtered tables as CSV files
    Export(ExportArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("fincontrol_core=debug,fcd=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Generate(args) => commands::dashboard::run_generate(args),
        Commands::Dashboard(args) => commands::dashboard::run_dashboard(args),
        Commands::Ratios(args) => commands::dashboard::run_ratios(args),
        Commands::Heatmap(args) => commands::dashboard::run_heatmap(args),
        Commands::Correlation(args) => commands::dashboard::run_correlation(args),
        Commands::Export(args) => commands::export::run_export(args),
        Commands::Version => {
            println!("fcd {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
