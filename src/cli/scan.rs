use std::path::Path;

use colored::Colorize;
use comfy_table::Table;

use crate::detector::{AnomalyDetector, DetectorConfig};
use crate::error::Result;
use crate::fmt::money;
use crate::loader::load_expenses_csv;
use crate::report::DetectionReport;

const TABLE_LIMIT: usize = 20;

fn load_config(path: Option<&str>) -> Result<DetectorConfig> {
    match path {
        Some(p) => {
            let content = std::fs::read_to_string(p)?;
            Ok(serde_json::from_str(&content)?)
        }
        None => Ok(DetectorConfig::default()),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    file: &str,
    config_path: Option<&str>,
    threshold: Option<f64>,
    trees: Option<usize>,
    subsample: Option<usize>,
    max_depth: Option<usize>,
    seed: Option<u64>,
    json: Option<&str>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(t) = threshold {
        config.anomaly_threshold = t;
    }
    if let Some(n) = trees {
        config.n_trees = n;
    }
    if let Some(s) = subsample {
        config.subsample_size = s;
    }
    if let Some(d) = max_depth {
        config.max_depth = d;
    }
    if seed.is_some() {
        config.seed = seed;
    }

    let records = load_expenses_csv(Path::new(file))?;
    println!("Loaded {} expense records from {file}", records.len());

    let mut detector = AnomalyDetector::new(config);
    let training = detector.train(&records)?;
    println!(
        "Trained on {} records ({} department baselines, {} category baselines, {} vendor patterns)",
        training.training_samples,
        training.department_baselines,
        training.category_baselines,
        training.vendor_patterns,
    );

    let report = detector.detect(&records)?;
    print_report(&report);

    let recommendations =
        crate::report::recommendations(&report, detector.config().large_amount_threshold);
    println!("\nRecommendations:");
    for rec in &recommendations {
        println!("  - {rec}");
    }

    if let Some(path) = json {
        std::fs::write(path, format!("{}\n", serde_json::to_string_pretty(&report)?))?;
        println!("\nReport written to {path}");
    }
    Ok(())
}

fn print_report(report: &DetectionReport) {
    if report.anomalies.is_empty() {
        println!(
            "\nNo anomalies found in {} records (threshold {:.2}).",
            report.total_expenses, report.threshold_used
        );
        return;
    }

    let mut table = Table::new();
    table.set_header(["Date", "Amount", "Vendor", "Department", "Score", "Severity", "Reason"]);
    for anomaly in report.anomalies.iter().take(TABLE_LIMIT) {
        let reason = anomaly
            .reasons
            .first()
            .cloned()
            .unwrap_or_else(|| "General anomaly".to_string());
        table.add_row([
            anomaly.date.clone(),
            money(anomaly.amount),
            anomaly.vendor.clone(),
            anomaly.department.clone(),
            format!("{:.3}", anomaly.anomaly_score),
            anomaly.severity.to_string(),
            reason,
        ]);
    }
    println!("\n{table}");
    if report.anomalies.len() > TABLE_LIMIT {
        println!("... and {} more", report.anomalies.len() - TABLE_LIMIT);
    }

    let b = report.severity_breakdown;
    println!(
        "\n{} of {} records flagged ({:.1}% anomaly rate, threshold {:.2})",
        report.anomalies_detected,
        report.total_expenses,
        report.anomaly_rate,
        report.threshold_used
    );
    println!(
        "Severity: {} high, {} medium, {} low",
        b.high.to_string().red().bold(),
        b.medium.to_string().yellow(),
        b.low
    );
}
