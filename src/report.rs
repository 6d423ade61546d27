use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::fmt::money_whole;

/// Coarse triage bucket derived from the fused anomaly score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Exhaustive, non-overlapping partition of [threshold, 1]:
    /// ≥ 0.8 High, ≥ 0.7 Medium, else Low.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Severity::High
        } else if score >= 0.7 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "Low"),
            Severity::Medium => write!(f, "Medium"),
            Severity::High => write!(f, "High"),
        }
    }
}

/// One flagged record with its score, tier, and the reasons that fired,
/// in signal-evaluation order.
#[derive(Debug, Clone, Serialize)]
pub struct Anomaly {
    pub date: String,
    pub amount: f64,
    pub vendor: String,
    pub department: String,
    pub category: String,
    pub anomaly_score: f64,
    pub severity: Severity,
    pub reasons: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SeverityBreakdown {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl SeverityBreakdown {
    fn tally(anomalies: &[Anomaly]) -> Self {
        let mut counts = Self::default();
        for anomaly in anomalies {
            match anomaly.severity {
                Severity::Low => counts.low += 1,
                Severity::Medium => counts.medium += 1,
                Severity::High => counts.high += 1,
            }
        }
        counts
    }
}

/// Batch detection output, consumed verbatim by the terminal renderer and
/// the JSON exporter.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub total_expenses: usize,
    pub anomalies_detected: usize,
    pub anomaly_rate: f64,
    pub severity_breakdown: SeverityBreakdown,
    pub anomalies: Vec<Anomaly>,
    pub threshold_used: f64,
}

/// Sort anomalies by descending score and compute the batch statistics.
pub fn aggregate(total_expenses: usize, mut anomalies: Vec<Anomaly>, threshold: f64) -> DetectionReport {
    anomalies.sort_by(|a, b| {
        b.anomaly_score
            .partial_cmp(&a.anomaly_score)
            .unwrap_or(Ordering::Equal)
    });
    let anomalies_detected = anomalies.len();
    let anomaly_rate = if total_expenses > 0 {
        anomalies_detected as f64 / total_expenses as f64 * 100.0
    } else {
        0.0
    };
    DetectionReport {
        total_expenses,
        anomalies_detected,
        anomaly_rate,
        severity_breakdown: SeverityBreakdown::tally(&anomalies),
        anomalies,
        threshold_used: threshold,
    }
}

/// Deterministic rule-based review recommendations for the batch.
pub fn recommendations(report: &DetectionReport, large_amount_threshold: f64) -> Vec<String> {
    if report.anomalies.is_empty() {
        return vec!["No anomalies detected - spending patterns appear normal".to_string()];
    }
    let mut recs = Vec::new();

    let high = report.severity_breakdown.high;
    if high > 0 {
        recs.push(format!("Review {high} high-severity anomalies immediately"));
    }

    let large = report
        .anomalies
        .iter()
        .filter(|a| a.amount > large_amount_threshold)
        .count();
    if large > 0 {
        recs.push(format!(
            "Verify approval for {large} large expenses (>{}+)",
            money_whole(large_amount_threshold)
        ));
    }

    let mut dept_counts: HashMap<&str, usize> = HashMap::new();
    for anomaly in &report.anomalies {
        *dept_counts.entry(anomaly.department.as_str()).or_default() += 1;
    }
    // Highest count wins; ties break to the alphabetically first department
    // so output is stable across runs.
    if let Some((dept, count)) = dept_counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
    {
        recs.push(format!("Focus review on {dept} department ({count} anomalies)"));
    }

    let distinct_vendors: HashSet<&str> = report
        .anomalies
        .iter()
        .map(|a| a.vendor.as_str())
        .collect();
    if report.anomalies.len() as f64 > distinct_vendors.len() as f64 * 0.5 {
        recs.push("Multiple anomalies from same vendors - review vendor relationships".to_string());
    }

    recs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anomaly(score: f64, amount: f64, vendor: &str, department: &str) -> Anomaly {
        Anomaly {
            date: "2025-01-15".to_string(),
            amount,
            vendor: vendor.to_string(),
            department: department.to_string(),
            category: "Other".to_string(),
            anomaly_score: score,
            severity: Severity::from_score(score),
            reasons: vec![],
            description: String::new(),
        }
    }

    #[test]
    fn test_severity_boundaries() {
        assert_eq!(Severity::from_score(0.699), Severity::Low);
        assert_eq!(Severity::from_score(0.7), Severity::Medium);
        assert_eq!(Severity::from_score(0.799), Severity::Medium);
        assert_eq!(Severity::from_score(0.8), Severity::High);
        assert_eq!(Severity::from_score(1.0), Severity::High);
    }

    #[test]
    fn test_aggregate_sorts_and_counts() {
        let report = aggregate(
            100,
            vec![
                anomaly(0.65, 200.0, "a", "Eng"),
                anomaly(0.95, 9.0, "b", "Eng"),
                anomaly(0.75, 40.0, "c", "Sales"),
            ],
            0.6,
        );
        assert_eq!(report.total_expenses, 100);
        assert_eq!(report.anomalies_detected, 3);
        assert!((report.anomaly_rate - 3.0).abs() < 1e-12);
        assert_eq!(report.anomalies[0].anomaly_score, 0.95);
        assert_eq!(report.anomalies[2].anomaly_score, 0.65);
        assert_eq!(report.severity_breakdown.high, 1);
        assert_eq!(report.severity_breakdown.medium, 1);
        assert_eq!(report.severity_breakdown.low, 1);
        assert_eq!(report.threshold_used, 0.6);
    }

    #[test]
    fn test_recommendations_empty_batch() {
        let report = aggregate(10, vec![], 0.6);
        let recs = recommendations(&report, 10_000.0);
        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("No anomalies detected"));
    }

    #[test]
    fn test_recommendations_rules_fire() {
        let report = aggregate(
            50,
            vec![
                anomaly(0.9, 50_000.0, "MegaCorp", "Finance"),
                anomaly(0.85, 12_000.0, "MegaCorp", "Finance"),
                anomaly(0.65, 300.0, "MegaCorp", "Eng"),
            ],
            0.6,
        );
        let recs = recommendations(&report, 10_000.0);
        assert!(recs.iter().any(|r| r == "Review 2 high-severity anomalies immediately"));
        assert!(recs.iter().any(|r| r == "Verify approval for 2 large expenses (>$10,000+)"));
        assert!(recs.iter().any(|r| r == "Focus review on Finance department (2 anomalies)"));
        // 3 anomalies from 1 vendor: concentration rule fires.
        assert!(recs.iter().any(|r| r.contains("same vendors")));
    }

    #[test]
    fn test_vendor_concentration_not_flagged_when_spread() {
        let report = aggregate(
            50,
            vec![
                anomaly(0.65, 100.0, "a", "Eng"),
                anomaly(0.65, 100.0, "b", "Eng"),
            ],
            0.6,
        );
        let recs = recommendations(&report, 10_000.0);
        assert!(!recs.iter().any(|r| r.contains("same vendors")));
    }

    #[test]
    fn test_department_tie_breaks_alphabetically() {
        let report = aggregate(
            10,
            vec![
                anomaly(0.65, 10.0, "a", "Zeta"),
                anomaly(0.65, 10.0, "b", "Alpha"),
            ],
            0.6,
        );
        let recs = recommendations(&report, 10_000.0);
        assert!(recs.iter().any(|r| r.contains("Focus review on Alpha department")));
    }
}
