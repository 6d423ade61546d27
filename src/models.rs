use chrono::NaiveDate;

/// A clean expense record as produced by the loader. Immutable once loaded.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct ExpenseRecord {
    pub date: NaiveDate,
    /// Hour of day when the source row carried a timestamp; None for
    /// date-only rows (scoring substitutes noon).
    pub hour: Option<u32>,
    pub amount: f64,
    pub vendor: String,
    pub description: Option<String>,
    pub department: String,
    pub category: String,
}

impl ExpenseRecord {
    pub fn new(date: NaiveDate, amount: f64, vendor: &str, department: &str, category: &str) -> Self {
        Self {
            date,
            hour: None,
            amount,
            vendor: vendor.to_string(),
            description: None,
            department: department.to_string(),
            category: category.to_string(),
        }
    }
}
