//! CLI application for the invoice OCR scanning pipeline.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{parse, run, scan};

/// Invoice OCR scanner - ingest scanned invoices from a bucket into PostgreSQL
#[derive(Parser)]
#[command(name = "invoscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduled scanning loop (the deployment entrypoint)
    Run(run::RunArgs),

    /// Run a single scan pass and exit
    Scan(scan::ScanArgs),

    /// Parse invoice fields from a text file (debugging aid)
    Parse(parse::ParseArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    match cli.command {
        Commands::Run(args) => run::run(args).await,
        Commands::Scan(args) => scan::run(args).await,
        Commands::Parse(args) => parse::run(args).await,
    }
}
