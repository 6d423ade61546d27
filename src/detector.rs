use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::baseline::{build_baselines, Baseline};
use crate::error::{Result, SpendwatchError};
use crate::features::{self, FeatureVector};
use crate::fmt::money_whole;
use crate::forest::IsolationForest;
use crate::models::ExpenseRecord;
use crate::patterns::{
    build_calendar_patterns, build_vendor_patterns, normalize_vendor, CalendarPatterns,
    VendorPattern,
};
use crate::report::{self, Anomaly, DetectionReport, Severity};

/// The forest is only built once the corpus is at least this large; smaller
/// batches still train baselines but score the isolation signal as neutral.
const MIN_FOREST_SAMPLES: usize = 10;

/// The isolation signal contributes a reason above this score.
const ISOLATION_REASON_CUTOFF: f64 = 0.6;

/// Vendor deviations beyond this many standard deviations fire the signal.
const VENDOR_DEVIATION_CUTOFF: f64 = 2.0;

/// Divisor that maps very large amounts onto [0, 1].
const LARGE_AMOUNT_SCALE: f64 = 50_000.0;

fn default_anomaly_threshold() -> f64 {
    0.6
}
fn default_n_trees() -> usize {
    100
}
fn default_subsample_size() -> usize {
    256
}
fn default_max_depth() -> usize {
    10
}
fn default_z_score_threshold() -> f64 {
    3.0
}
fn default_iqr_multiplier() -> f64 {
    1.5
}
fn default_large_amount_threshold() -> f64 {
    10_000.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    #[serde(default = "default_anomaly_threshold")]
    pub anomaly_threshold: f64,
    #[serde(default = "default_n_trees")]
    pub n_trees: usize,
    #[serde(default = "default_subsample_size")]
    pub subsample_size: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_z_score_threshold")]
    pub z_score_threshold: f64,
    #[serde(default = "default_iqr_multiplier")]
    pub iqr_multiplier: f64,
    #[serde(default = "default_large_amount_threshold")]
    pub large_amount_threshold: f64,
    /// Seed for the tree-construction generator. None draws from entropy,
    /// so repeated training yields topologically different forests.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            anomaly_threshold: default_anomaly_threshold(),
            n_trees: default_n_trees(),
            subsample_size: default_subsample_size(),
            max_depth: default_max_depth(),
            z_score_threshold: default_z_score_threshold(),
            iqr_multiplier: default_iqr_multiplier(),
            large_amount_threshold: default_large_amount_threshold(),
            seed: None,
        }
    }
}

impl DetectorConfig {
    /// Reject structurally invalid values. Finite out-of-range values (for
    /// example a threshold above 1.0) are accepted as given.
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(SpendwatchError::Config("n_trees must be positive".to_string()));
        }
        if self.subsample_size == 0 {
            return Err(SpendwatchError::Config(
                "subsample_size must be positive".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(SpendwatchError::Config("max_depth must be positive".to_string()));
        }
        for (name, value) in [
            ("anomaly_threshold", self.anomaly_threshold),
            ("z_score_threshold", self.z_score_threshold),
            ("iqr_multiplier", self.iqr_multiplier),
            ("large_amount_threshold", self.large_amount_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SpendwatchError::Config(format!(
                    "{name} must be a non-negative finite number"
                )));
            }
        }
        Ok(())
    }
}

/// Everything built by one training run. Assembled fully before it replaces
/// the previous state, so the detector is never partially trained.
struct TrainedState {
    forest: IsolationForest,
    department_baselines: HashMap<String, Baseline>,
    category_baselines: HashMap<String, Baseline>,
    vendor_patterns: HashMap<String, VendorPattern>,
    calendar: CalendarPatterns,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub training_samples: usize,
    pub department_baselines: usize,
    pub category_baselines: usize,
    pub vendor_patterns: usize,
    /// Mean isolation score over (up to) the first 100 training vectors;
    /// a sanity check, not a model parameter.
    pub mean_isolation_score: f64,
    pub anomaly_threshold: f64,
    pub calendar: CalendarPatterns,
}

pub struct AnomalyDetector {
    config: DetectorConfig,
    state: Option<TrainedState>,
}

impl AnomalyDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.state.is_some()
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Build the forest, baselines, and patterns from one batch, replacing
    /// any previous state wholesale.
    pub fn train(&mut self, records: &[ExpenseRecord]) -> Result<TrainingReport> {
        self.config.validate()?;
        if records.is_empty() {
            return Err(SpendwatchError::NoData(
                "cannot train on an empty record set".to_string(),
            ));
        }

        let vectors: Vec<FeatureVector> = records.iter().map(features::extract).collect();
        let forest = if vectors.len() >= MIN_FOREST_SAMPLES {
            let mut rng = match self.config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            IsolationForest::fit(
                &vectors,
                self.config.n_trees,
                self.config.subsample_size,
                self.config.max_depth,
                &mut rng,
            )
        } else {
            IsolationForest::empty()
        };

        let state = TrainedState {
            forest,
            department_baselines: build_baselines(records, |r| &r.department),
            category_baselines: build_baselines(records, |r| &r.category),
            vendor_patterns: build_vendor_patterns(records),
            calendar: build_calendar_patterns(records),
        };

        let probe = vectors.len().min(100);
        let mean_isolation_score = vectors[..probe]
            .iter()
            .map(|v| state.forest.score(v))
            .sum::<f64>()
            / probe as f64;

        let training = TrainingReport {
            training_samples: records.len(),
            department_baselines: state.department_baselines.len(),
            category_baselines: state.category_baselines.len(),
            vendor_patterns: state.vendor_patterns.len(),
            mean_isolation_score,
            anomaly_threshold: self.config.anomaly_threshold,
            calendar: state.calendar.clone(),
        };
        self.state = Some(state);
        Ok(training)
    }

    /// Score every record and aggregate the ones at or above the threshold.
    pub fn detect(&self, records: &[ExpenseRecord]) -> Result<DetectionReport> {
        let state = self.state.as_ref().ok_or(SpendwatchError::NotTrained)?;
        if records.is_empty() {
            return Err(SpendwatchError::NoData(
                "no expense records to score".to_string(),
            ));
        }

        let mut anomalies = Vec::new();
        for record in records {
            let (score, reasons) = self.score_record(state, record);
            if score >= self.config.anomaly_threshold {
                anomalies.push(Anomaly {
                    date: record.date.format("%Y-%m-%d").to_string(),
                    amount: record.amount,
                    vendor: record.vendor.clone(),
                    department: record.department.clone(),
                    category: record.category.clone(),
                    anomaly_score: score,
                    severity: Severity::from_score(score),
                    description: describe(record, &reasons),
                    reasons,
                });
            }
        }
        Ok(report::aggregate(
            records.len(),
            anomalies,
            self.config.anomaly_threshold,
        ))
    }

    /// Evaluate the five signals for one record. The fused score is the
    /// maximum contribution: the single most alarming signal wins.
    fn score_record(&self, state: &TrainedState, record: &ExpenseRecord) -> (f64, Vec<String>) {
        let mut scores = Vec::new();
        let mut reasons = Vec::new();

        // 1. Isolation forest, always evaluated.
        let isolation = state.forest.score(&features::extract(record));
        scores.push(isolation);
        if isolation > ISOLATION_REASON_CUTOFF {
            reasons.push(format!(
                "Unusual spending pattern (isolation score: {isolation:.2})"
            ));
        }

        // 2. Department z-score.
        if let Some(baseline) = state.department_baselines.get(&record.department) {
            if baseline.stddev > 0.0 {
                let z = ((record.amount - baseline.mean) / baseline.stddev).abs();
                if z > self.config.z_score_threshold {
                    scores.push((z / 10.0).min(1.0));
                    reasons.push(format!(
                        "Unusual amount for {} department (Z-score: {z:.1})",
                        record.department
                    ));
                }
            }
        }

        // 3. Category IQR fences.
        if let Some(baseline) = state.category_baselines.get(&record.category) {
            let iqr = baseline.q3 - baseline.q1;
            let lower = baseline.q1 - self.config.iqr_multiplier * iqr;
            let upper = baseline.q3 + self.config.iqr_multiplier * iqr;
            if record.amount < lower || record.amount > upper {
                let contribution = if baseline.median > 0.0 {
                    ((record.amount - baseline.median).abs() / baseline.median).min(1.0)
                } else {
                    0.0
                };
                scores.push(contribution);
                reasons.push(format!("Unusual amount for {} category", record.category));
            }
        }

        // 4. Vendor deviation.
        if let Some(pattern) = state.vendor_patterns.get(&normalize_vendor(&record.vendor)) {
            if pattern.stddev > 0.0 {
                let ratio = (record.amount - pattern.avg_amount).abs() / pattern.stddev;
                if ratio > VENDOR_DEVIATION_CUTOFF {
                    scores.push((ratio / 10.0).min(1.0));
                    reasons.push(format!("Unusual amount for vendor {}", record.vendor));
                }
            }
        }

        // 5. Absolute large amount.
        if record.amount > self.config.large_amount_threshold {
            scores.push((record.amount / LARGE_AMOUNT_SCALE).min(1.0));
            reasons.push(format!(
                "Large expense amount: {}",
                money_whole(record.amount)
            ));
        }

        let fused = scores.iter().cloned().fold(0.0, f64::max);
        (fused, reasons)
    }
}

fn describe(record: &ExpenseRecord, reasons: &[String]) -> String {
    let base = format!(
        "{} expense to {} in {}",
        money_whole(record.amount),
        record.vendor,
        record.department
    );
    if reasons.is_empty() {
        format!("{base}. General anomaly detected.")
    } else {
        format!("{base}. {}.", reasons.join("; "))
    }
}
