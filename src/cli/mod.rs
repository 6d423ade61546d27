pub mod sample;
pub mod scan;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "spendwatch",
    about = "Flags anomalous expense records for finance review."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train on an expense CSV and report anomalous records.
    Scan {
        /// Path to the expense CSV (date, amount, vendor, description, department, category)
        file: String,
        /// Path to a JSON config file; flags below override it
        #[arg(long)]
        config: Option<String>,
        /// Anomaly score threshold (default 0.6)
        #[arg(long)]
        threshold: Option<f64>,
        /// Number of isolation trees (default 100)
        #[arg(long)]
        trees: Option<usize>,
        /// Per-tree subsample size (default 256)
        #[arg(long)]
        subsample: Option<usize>,
        /// Maximum tree depth (default 10)
        #[arg(long = "max-depth")]
        max_depth: Option<usize>,
        /// Seed for reproducible forests (default: entropy)
        #[arg(long)]
        seed: Option<u64>,
        /// Write the full detection report as JSON to this path
        #[arg(long)]
        json: Option<String>,
    },
    /// Write a synthetic expense CSV for exploring the tool.
    Sample {
        /// Output CSV path
        output: String,
        /// Number of records to generate
        #[arg(long, default_value_t = 500)]
        count: usize,
        /// Seed for a reproducible file
        #[arg(long)]
        seed: Option<u64>,
    },
}
