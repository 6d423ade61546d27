use std::collections::HashMap;

use crate::models::ExpenseRecord;
use crate::stats;

/// Minimum records a department/category needs before it gets a baseline.
/// Smaller groups are simply absent from the map, which disables the
/// corresponding signal for their records.
pub const MIN_GROUP_SIZE: usize = 3;

/// Normal-spending summary for one department or category.
#[derive(Debug, Clone)]
pub struct Baseline {
    pub mean: f64,
    pub stddev: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
}

impl Baseline {
    fn from_amounts(amounts: &[f64]) -> Self {
        let (q1, q3) = stats::quartiles(amounts);
        Self {
            mean: stats::mean(amounts),
            stddev: stats::sample_stddev(amounts),
            median: stats::median(amounts),
            q1,
            q3,
        }
    }
}

/// Group record amounts by `key` and build a baseline for every group with at
/// least [`MIN_GROUP_SIZE`] members.
pub fn build_baselines<F>(records: &[ExpenseRecord], key: F) -> HashMap<String, Baseline>
where
    F: Fn(&ExpenseRecord) -> &str,
{
    let mut groups: HashMap<String, Vec<f64>> = HashMap::new();
    for record in records {
        groups
            .entry(key(record).to_string())
            .or_default()
            .push(record.amount);
    }
    groups
        .into_iter()
        .filter(|(_, amounts)| amounts.len() >= MIN_GROUP_SIZE)
        .map(|(name, amounts)| (name, Baseline::from_amounts(&amounts)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(amount: f64, department: &str, category: &str) -> ExpenseRecord {
        ExpenseRecord::new(
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            amount,
            "Acme",
            department,
            category,
        )
    }

    #[test]
    fn test_small_groups_absent() {
        let records = vec![
            record(10.0, "Eng", "Software"),
            record(20.0, "Eng", "Software"),
            record(30.0, "Eng", "Software"),
            record(40.0, "Sales", "Travel"),
            record(50.0, "Sales", "Travel"),
        ];
        let by_dept = build_baselines(&records, |r| &r.department);
        assert!(by_dept.contains_key("Eng"));
        assert!(!by_dept.contains_key("Sales"));
    }

    #[test]
    fn test_three_point_group_uses_min_max_quartiles() {
        let records = vec![
            record(10.0, "Eng", "Software"),
            record(20.0, "Eng", "Software"),
            record(60.0, "Eng", "Software"),
        ];
        let b = &build_baselines(&records, |r| &r.department)["Eng"];
        assert_eq!(b.q1, 10.0);
        assert_eq!(b.q3, 60.0);
        assert_eq!(b.median, 20.0);
        assert!((b.mean - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_identical_amounts_give_zero_spread() {
        let records: Vec<_> = (0..50).map(|_| record(75.0, "Ops", "Supplies")).collect();
        let b = &build_baselines(&records, |r| &r.department)["Ops"];
        assert_eq!(b.stddev, 0.0);
        assert_eq!(b.q3 - b.q1, 0.0);
        assert_eq!(b.median, 75.0);
    }

    #[test]
    fn test_category_grouping_independent_of_department() {
        let records = vec![
            record(10.0, "A", "Travel"),
            record(20.0, "B", "Travel"),
            record(30.0, "C", "Travel"),
        ];
        let by_cat = build_baselines(&records, |r| &r.category);
        assert!(by_cat.contains_key("Travel"));
        assert!(build_baselines(&records, |r| &r.department).is_empty());
    }
}
