//! BasketForge: market-basket analysis CLI
//!
//! This is the main entrypoint that loads the transaction table, runs the
//! analysis pipeline once, prints the results, and writes charts and exports.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use basketforge::{compute, export, present, viz, Analysis, Args, RawTable};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        println!("BasketForge - Market Basket Analysis");
        println!("====================================\n");
    }

    // Reject out-of-range parameters before touching the data
    let params = args.mining_params()?;

    let start_time = Instant::now();

    // Step 1: Load data
    if args.verbose {
        println!("Step 1: Loading data");
        println!("  Input file: {}", args.input);
    }
    let table = RawTable::from_path(&args.input)
        .with_context(|| format!("failed to read {}", args.input))?;
    viz::print_table_preview(&table, args.preview_rows);

    // Step 2: Normalize, encode, mine
    if args.verbose {
        println!("\nStep 2: Mining");
        println!("  Minimum support: {}", params.min_support);
        println!("  Metric: {} >= {}", params.metric, params.min_threshold);
        if let Some(max_len) = params.max_len {
            println!("  Maximum itemset size: {}", max_len);
        }
    }
    let mining_start = Instant::now();
    let analysis = compute(&table, &params)
        .with_context(|| format!("could not analyse {}", args.input))?;
    let mining_time = mining_start.elapsed();

    viz::print_basket_preview(&analysis.basket, args.preview_rows);
    if args.verbose {
        println!("  Item column: {}", analysis.item_column);
        println!("  Mining time: {:.2}s", mining_time.as_secs_f64());
    }

    print_results(&analysis);

    // Step 3: Exports
    export::export_analysis(
        &analysis,
        args.top_n,
        args.itemsets_csv.as_deref().map(Path::new),
        args.rules_csv.as_deref().map(Path::new),
        args.report.as_deref().map(Path::new),
    )?;

    // Step 4: Visualize
    if analysis.notice().is_none() && !args.no_plots {
        if args.verbose {
            println!("\nStep 4: Generating visualizations");
        }
        viz::generate_visualization_report(&analysis, args.top_n, &args.chart, &args.graph)?;
        println!("\nBar chart saved to: {}", args.chart);
        println!("Rule network saved to: {}", args.graph);
    }

    let total_time = start_time.elapsed();
    println!("\n=== Analysis Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Print itemsets, rules and recommendations, or the notice explaining why they are missing
fn print_results(analysis: &Analysis) {
    if !analysis.itemsets.is_empty() {
        viz::print_frequent_itemsets(&analysis.itemsets);
    }
    if let Some(notice) = analysis.notice() {
        println!("\n! {}", notice);
        return;
    }
    viz::print_rules(&analysis.rules);
    viz::print_recommendations(&present::recommendations(&analysis.rules));
}
