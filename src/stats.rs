//! Small descriptive-statistics helpers shared by the baseline and pattern
//! builders.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n−1 denominator). Returns 0.0 for fewer than
/// two values.
pub fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// First and third quartiles. Four or more values use exclusive-method
/// interpolation; exactly three fall back to (min, max) — the documented
/// small-sample policy for baseline groups.
pub fn quartiles(values: &[f64]) -> (f64, f64) {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    if sorted.len() < 4 {
        return (sorted[0], sorted[sorted.len() - 1]);
    }
    (quantile_exclusive(&sorted, 1), quantile_exclusive(&sorted, 3))
}

/// The i-th quartile (i in 1..=3) of sorted data by the exclusive method:
/// interpolation positions at i(n+1)/4, clamped to the data range.
fn quantile_exclusive(sorted: &[f64], i: usize) -> f64 {
    let n = sorted.len();
    let m = i * (n + 1);
    let delta = (m % 4) as f64;
    let j = (m / 4).clamp(1, n - 1);
    (sorted[j - 1] * (4.0 - delta) + sorted[j] * delta) / 4.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_stddev() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&xs) - 5.0).abs() < 1e-12);
        // Sample stddev of the classic example set.
        assert!((sample_stddev(&xs) - 2.138089935299395).abs() < 1e-9);
    }

    #[test]
    fn test_stddev_degenerate() {
        assert_eq!(sample_stddev(&[]), 0.0);
        assert_eq!(sample_stddev(&[42.0]), 0.0);
        assert_eq!(sample_stddev(&[5.0, 5.0, 5.0]), 0.0);
    }

    #[test]
    fn test_median_odd_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_quartiles_exclusive_four_points() {
        let (q1, q3) = quartiles(&[1.0, 2.0, 3.0, 4.0]);
        assert!((q1 - 1.25).abs() < 1e-12);
        assert!((q3 - 3.75).abs() < 1e-12);
    }

    #[test]
    fn test_quartiles_exclusive_five_points() {
        let (q1, q3) = quartiles(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        assert!((q1 - 15.0).abs() < 1e-12);
        assert!((q3 - 45.0).abs() < 1e-12);
    }

    #[test]
    fn test_quartiles_three_point_fallback() {
        let (q1, q3) = quartiles(&[7.0, 1.0, 4.0]);
        assert_eq!(q1, 1.0);
        assert_eq!(q3, 7.0);
    }
}
