mod baseline;
mod cli;
mod detector;
mod error;
mod features;
mod fmt;
mod forest;
mod loader;
mod models;
mod patterns;
mod report;
mod stats;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan {
            file,
            config,
            threshold,
            trees,
            subsample,
            max_depth,
            seed,
            json,
        } => cli::scan::run(
            &file,
            config.as_deref(),
            threshold,
            trees,
            subsample,
            max_depth,
            seed,
            json.as_deref(),
        ),
        Commands::Sample {
            output,
            count,
            seed,
        } => cli::sample::run(&output, count, seed),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
