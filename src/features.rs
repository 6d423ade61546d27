use chrono::Datelike;

use crate::models::ExpenseRecord;

pub const FEATURE_COUNT: usize = 5;

/// Numeric view of a record used by the isolation forest. Ephemeral,
/// recomputed per use.
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Extract the feature vector for one record:
/// `[ln(amount+1), day_of_month, weekday (0=Mon), month, hour]`.
///
/// The log transform keeps a few very large amounts from dominating splits;
/// calendar fields let the ensemble isolate time-based outliers. Rows without
/// a timestamp score as noon.
pub fn extract(record: &ExpenseRecord) -> FeatureVector {
    [
        (record.amount + 1.0).ln(),
        record.date.day() as f64,
        record.date.weekday().num_days_from_monday() as f64,
        record.date.month() as f64,
        record.hour.unwrap_or(12) as f64,
    ]
}
