//! CLI entry point for the dataset cleaning pipeline.

use anyhow::{anyhow, Result};
use clap::Parser;
use police_killings_cleaner::{io, Cleaner, CleaningConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Police killings dataset cleaner",
    long_about = "Normalizes the raw police killings export into a fixed canonical \
                  schema: renamed headers, curated cell corrections, controlled \
                  vocabularies, typed age and date columns, and a null-free output.\n\n\
                  EXAMPLES:\n  \
                  # Clean the raw export into ./output\n  \
                  police-killings-cleaner -i police_killings.csv\n\n  \
                  # Custom output location and name\n  \
                  police-killings-cleaner -i raw.csv -o results --output-name clean\n\n  \
                  # Keep the row audit column\n  \
                  police-killings-cleaner -i raw.csv --keep-row-key"
)]
struct Args {
    /// Path to the raw CSV file
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for the cleaned CSV
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Output file name (without extension)
    #[arg(long, default_value = "police_killings_clean")]
    output_name: String,

    /// Skip the post-cleaning vocabulary scan
    #[arg(long)]
    no_vocabulary_check: bool,

    /// Keep the internal row key column in the output
    #[arg(long)]
    keep_row_key: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet);

    if !args.input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input.display()));
    }

    let config = CleaningConfig::builder()
        .enforce_vocabulary(!args.no_vocabulary_check)
        .keep_row_key(args.keep_row_key)
        .output_dir(&args.output)
        .output_name(&args.output_name)
        .build()?;

    info!("Loading dataset from: {}", args.input.display());
    let data = io::load_csv(&args.input)?;

    let cleaner = Cleaner::builder().config(config.clone()).build();
    let mut outcome = cleaner.clean(data)?;

    let output_path = config
        .output_dir
        .join(format!("{}.csv", config.output_name));
    io::write_csv(&mut outcome.data, &output_path)?;

    println!();
    println!("CLEANING COMPLETE");
    println!(
        "  Rows: {} -> {} ({} removed)",
        outcome.rows_in,
        outcome.rows_out,
        outcome.rows_in - outcome.rows_out
    );
    println!("  Columns: {}", outcome.data.width());
    println!("  Output: {}", output_path.display());
    if !outcome.vocabulary_warnings.is_empty() {
        println!(
            "  Vocabulary warnings: {} (see log)",
            outcome.vocabulary_warnings.len()
        );
    }
    println!();
    println!("Steps applied:");
    for step in &outcome.steps {
        println!("  - {}", step);
    }

    Ok(())
}
