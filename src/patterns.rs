use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use serde::Serialize;

use crate::models::ExpenseRecord;
use crate::stats;

/// Minimum records a vendor needs before it gets a pattern entry.
pub const MIN_VENDOR_RECORDS: usize = 2;

/// Spending profile for one vendor, keyed by the normalized vendor string.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct VendorPattern {
    pub avg_amount: f64,
    pub frequency: usize,
    pub stddev: f64,
    pub min_amount: f64,
    pub max_amount: f64,
}

/// Mean spend per weekday (0=Mon) and per calendar month. Informational
/// output only; the fusion step never reads these.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CalendarPatterns {
    pub weekday_means: BTreeMap<u32, f64>,
    pub month_means: BTreeMap<u32, f64>,
}

/// Canonical form of a vendor string for grouping and lookup.
pub fn normalize_vendor(vendor: &str) -> String {
    vendor.trim().to_lowercase()
}

pub fn build_vendor_patterns(records: &[ExpenseRecord]) -> HashMap<String, VendorPattern> {
    let mut groups: HashMap<String, Vec<f64>> = HashMap::new();
    for record in records {
        groups
            .entry(normalize_vendor(&record.vendor))
            .or_default()
            .push(record.amount);
    }
    groups
        .into_iter()
        .filter(|(_, amounts)| amounts.len() >= MIN_VENDOR_RECORDS)
        .map(|(vendor, amounts)| {
            let pattern = VendorPattern {
                avg_amount: stats::mean(&amounts),
                frequency: amounts.len(),
                stddev: stats::sample_stddev(&amounts),
                min_amount: amounts.iter().cloned().fold(f64::INFINITY, f64::min),
                max_amount: amounts.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            };
            (vendor, pattern)
        })
        .collect()
}

pub fn build_calendar_patterns(records: &[ExpenseRecord]) -> CalendarPatterns {
    let mut by_weekday: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    let mut by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for record in records {
        by_weekday
            .entry(record.date.weekday().num_days_from_monday())
            .or_default()
            .push(record.amount);
        by_month
            .entry(record.date.month())
            .or_default()
            .push(record.amount);
    }
    CalendarPatterns {
        weekday_means: by_weekday
            .into_iter()
            .map(|(day, amounts)| (day, stats::mean(&amounts)))
            .collect(),
        month_means: by_month
            .into_iter()
            .map(|(month, amounts)| (month, stats::mean(&amounts)))
            .collect(),
    }
}
