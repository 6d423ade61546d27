//! CSV ingestion: maps header names to columns, parses dates and amounts,
//! and silently drops rows the engine could not use.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::error::{Result, SpendwatchError};
use crate::models::ExpenseRecord;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M:%S"];

/// Parse a date cell, returning the day plus the hour when the cell carried
/// a timestamp.
fn parse_date(text: &str) -> Option<(NaiveDate, Option<u32>)> {
    let text = text.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some((date, None));
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(text, format) {
            return Some((stamp.date(), Some(stamp.hour())));
        }
    }
    None
}

fn column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name))
}

/// Load expense records from a headed CSV with columns
/// `date, amount, vendor, description, department, category`.
/// Rows with unparseable dates or amounts, or non-positive amounts, are
/// skipped; a file yielding nothing usable is an error.
pub fn load_expenses_csv(path: &Path) -> Result<Vec<ExpenseRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let date_col = column(&headers, "date").ok_or_else(|| {
        SpendwatchError::NoData(format!("{}: no 'date' column", path.display()))
    })?;
    let amount_col = column(&headers, "amount").ok_or_else(|| {
        SpendwatchError::NoData(format!("{}: no 'amount' column", path.display()))
    })?;
    let vendor_col = column(&headers, "vendor");
    let description_col = column(&headers, "description");
    let department_col = column(&headers, "department");
    let category_col = column(&headers, "category");

    let cell = |row: &csv::StringRecord, col: Option<usize>| -> String {
        col.and_then(|i| row.get(i)).unwrap_or("").trim().to_string()
    };

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let Some((date, hour)) = row.get(date_col).and_then(parse_date) else {
            continue;
        };
        let Some(amount) = row.get(amount_col).and_then(|a| a.trim().parse::<f64>().ok())
        else {
            continue;
        };
        if !amount.is_finite() || amount <= 0.0 {
            continue;
        }

        let description = cell(&row, description_col);
        let category = cell(&row, category_col);
        records.push(ExpenseRecord {
            date,
            hour,
            amount,
            vendor: cell(&row, vendor_col),
            description: if description.is_empty() {
                None
            } else {
                Some(description)
            },
            department: cell(&row, department_col),
            category: if category.is_empty() {
                "Other".to_string()
            } else {
                category
            },
        });
    }

    if records.is_empty() {
        return Err(SpendwatchError::NoData(format!(
            "{}: no usable expense rows",
            path.display()
        )));
    }
    Ok(records)
}
