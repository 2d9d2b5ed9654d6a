//! ABCForge: ABC inventory analysis CLI
//!
//! This is the main entrypoint that orchestrates data loading, classification,
//! reporting and persistence of the results.

use anyhow::Result;
use abcforge::{load_articles, report, run_analysis, Args};
use clap::Parser;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    run_pipeline(&args)
}

/// Run the full analysis pipeline
fn run_pipeline(args: &Args) -> Result<()> {
    println!("=== ABC Inventory Analysis ===\n");

    let start_time = Instant::now();
    let config = args.analysis_config()?;
    let dialect = args.dialect()?;

    // Step 1: Load data
    debug!("Input file: {}", args.input);
    let load_start = Instant::now();
    let table = load_articles(&args.input, &config.columns, dialect)?;
    debug!("Loading time: {:.2}s", load_start.elapsed().as_secs_f64());

    println!(
        "✓ Data loaded: {} articles, {} periods",
        table.len(),
        table.period_count()
    );

    // Step 2: Classify
    debug!(
        "Window: last {} periods, tiers: {:?}",
        config.window,
        config.tiers.labels().collect::<Vec<_>>()
    );
    let analysis = run_analysis(&table, &config)?;
    println!("✓ Articles classified");

    // Step 3: Report
    report::print_report(&analysis, args.top);

    if !analysis.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &analysis.warnings {
            println!("  - {}", warning);
        }
    }

    // Step 4: Persist
    if args.no_save {
        info!("Skipping results file (--no-save)");
    } else {
        let output_path = report::save_results(&analysis, &args.output_dir)?;
        println!("\nResults saved to: {}", output_path.display());
    }

    println!("\n=== Analysis Complete ===");
    println!(
        "Total processing time: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
