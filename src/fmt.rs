fn group_thousands(int_part: &str) -> String {
    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    with_commas.chars().rev().collect()
}

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((&cents, "00"));
    let grouped = group_thousands(int_part);
    if negative {
        format!("-${grouped}.{dec_part}")
    } else {
        format!("${grouped}.{dec_part}")
    }
}

/// Whole-dollar variant used in reason strings: $50,000
pub fn money_whole(val: f64) -> String {
    let rounded = format!("{:.0}", val.abs());
    let grouped = group_thousands(&rounded);
    if val < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
