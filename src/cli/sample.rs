use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;

struct SpendingProfile {
    department: &'static str,
    category: &'static str,
    vendors: &'static [&'static str],
    min_amount: f64,
    max_amount: f64,
}

const PROFILES: &[SpendingProfile] = &[
    SpendingProfile {
        department: "Engineering",
        category: "IT Infrastructure",
        vendors: &["AWS", "GitHub", "DigitalOcean", "JetBrains"],
        min_amount: 20.0,
        max_amount: 900.0,
    },
    SpendingProfile {
        department: "Marketing",
        category: "Advertising",
        vendors: &["Google Ads", "Mailchimp", "LinkedIn Marketing"],
        min_amount: 100.0,
        max_amount: 2_500.0,
    },
    SpendingProfile {
        department: "Sales",
        category: "Travel",
        vendors: &["Delta Airlines", "Marriott Hotels", "Uber", "Expedia"],
        min_amount: 40.0,
        max_amount: 1_800.0,
    },
    SpendingProfile {
        department: "Operations",
        category: "Office Supplies",
        vendors: &["Staples", "Office Depot", "Amazon Business"],
        min_amount: 10.0,
        max_amount: 400.0,
    },
    SpendingProfile {
        department: "Finance",
        category: "Professional Services",
        vendors: &["Deloitte Consulting", "Smith & Associates"],
        min_amount: 500.0,
        max_amount: 6_000.0,
    },
];

/// Roughly one record in fifty gets its amount multiplied into outlier
/// territory so a fresh sample always gives the scanner something to find.
const OUTLIER_RATE: f64 = 0.02;
const OUTLIER_MULTIPLIER: f64 = 25.0;

pub fn run(output: &str, count: usize, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(["date", "amount", "vendor", "description", "department", "category"])?;

    for _ in 0..count {
        let profile = &PROFILES[rng.gen_range(0..PROFILES.len())];
        let vendor = profile.vendors[rng.gen_range(0..profile.vendors.len())];

        let month = rng.gen_range(1..=12u32);
        let day = rng.gen_range(1..=28u32);
        let date = NaiveDate::from_ymd_opt(2025, month, day).unwrap();

        let mut amount = rng.gen_range(profile.min_amount..profile.max_amount);
        if rng.gen_bool(OUTLIER_RATE) {
            amount *= OUTLIER_MULTIPLIER;
        }

        writer.write_record([
            date.format("%Y-%m-%d").to_string(),
            format!("{amount:.2}"),
            vendor.to_string(),
            String::new(),
            profile.department.to_string(),
            profile.category.to_string(),
        ])?;
    }
    writer.flush()?;

    println!("Wrote {count} sample expense records to {output}");
    Ok(())
}
