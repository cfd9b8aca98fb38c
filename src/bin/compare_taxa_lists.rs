//! Sample comparisons against a microbe directory
//!
//! Usage: cargo run --release --bin compare_taxa_lists -- [directory.csv] [config.json]
//!
//! Runs the comparators on small hand-made groups, then compares two slices
//! of the directory (rows 0-4 vs rows 9-13) unweighted and weighted.

use anyhow::{Context, Result};
use microbe_directory_rust::{
    compare_categorical, compare_categorical_abundances, compare_numeric, utils::trait_rng,
    ComparisonConfig, DirectoryComparator, MicrobeDirectory, Report, WeightedValues,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DIRECTORY: &str = "microbe-directory.csv";

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "microbe_directory_rust=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let directory_path = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_DIRECTORY.to_string()));
    let config = match args.next() {
        Some(path) => ComparisonConfig::load(Path::new(&path))
            .with_context(|| format!("Failed to load comparison config from {}", path))?,
        None => ComparisonConfig::default(),
    };

    println!("\n=== Comparator samples ===\n");

    let categorical = compare_categorical(
        &"yes",
        &["yes", "yes", "no", "yes", "yes"],
        &["no", "no", "no", "yes", "yes", "no", "no"],
        &config,
    );
    println!("categorical 'yes':  {:?}", categorical);

    let categorical_absent = compare_categorical(&"A", &["A", "B", "D"], &["B", "C", "D", "E"], &config);
    println!("categorical 'A':    {:?}", categorical_absent);

    let numeric = compare_numeric(
        &[0.0, 1.0, 3.0, 0.0, 1.0, 1.0, 2.0, 2.0],
        &[2.0, 2.0, 1.0, 3.0, 1.0, 3.0, 4.0],
        &config,
    );
    println!("numeric:            {:?}", numeric);

    let group_a: WeightedValues<&str> = [("A", 0.2), ("B", 0.3), ("D", 0.5)].into_iter().collect();
    let group_b: WeightedValues<&str> =
        [("B", 0.25), ("C", 0.4), ("D", 0.25), ("E", 0.1)].into_iter().collect();
    let weighted = compare_categorical_abundances(
        &"A",
        &group_a,
        &group_b,
        &config,
        &mut trait_rng(config.seed, 0),
    )?;
    println!("weighted 'A':       {:?}", weighted);

    println!("\n=== Directory comparisons ===\n");

    let directory = MicrobeDirectory::load(&directory_path, &config)
        .with_context(|| format!("Failed to load microbe directory from {}", directory_path.display()))?;

    let taxa: Vec<&str> = directory.taxa().collect();
    anyhow::ensure!(
        taxa.len() >= 14,
        "Need at least 14 taxa for the sample comparison, found {}",
        taxa.len()
    );
    let first = &taxa[0..5];
    let second = &taxa[9..14];

    let comparator = DirectoryComparator::new(&directory, config)?;

    let start = Instant::now();
    let report = comparator.compare(first, second)?;
    print_report("Taxa lists", &report, start.elapsed().as_secs_f64());

    let weights = |names: &[&str]| -> Vec<(String, f64)> {
        let share = 1.0 / names.len() as f64;
        names.iter().map(|name| (name.to_string(), share)).collect()
    };

    let start = Instant::now();
    let weighted_report = comparator.compare_weighted_parallel(&weights(first), &weights(second))?;
    print_report("Weighted taxa", &weighted_report, start.elapsed().as_secs_f64());

    Ok(())
}

fn print_report(title: &str, report: &Report, seconds: f64) {
    println!("{} ({} rows, {:.3} ms)", title, report.len(), seconds * 1000.0);
    println!("{:-<100}", "");
    println!(
        "{:<30} {:<12} {:<20} {:>12} {:>12} {:>10}",
        "variable", "type", "value", "in", "out", "p-value"
    );
    for row in report {
        println!(
            "{:<30} {:<12} {:<20} {:>12.4} {:>12.4} {:>10.4e}",
            row.variable,
            row.variable_type.as_str(),
            row.value,
            row.abundance_in.primary(),
            row.abundance_out.primary(),
            row.p_value
        );
    }
    println!();
}
