/// Computes the arithmetic mean of a slice of values. Returns `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Computes the sample standard deviation (n - 1 denominator) given a
/// pre-computed mean. Returns `None` for fewer than two values.
pub fn stddev(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;

    Some(variance.sqrt())
}

/// Rounds to two decimal places, halves to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_mean_values() {
        assert_eq!(mean(&[2.0, 4.0, 9.0]), Some(5.0));
    }

    #[test]
    fn test_stddev_needs_two_values() {
        assert_eq!(stddev(&[], 0.0), None);
        assert_eq!(stddev(&[7.0], 7.0), None);
    }

    #[test]
    fn test_stddev_is_sample() {
        // 10, 4, 7 -> mean 7, squared deviations 9 + 9 + 0 = 18, / 2 = 9
        assert_eq!(stddev(&[10.0, 4.0, 7.0], 7.0), Some(3.0));
        assert_eq!(stddev(&[5.0, 5.0, 5.0], 5.0), Some(0.0));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(9.633333), 9.63);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(6.625), 6.62);
        assert_eq!(round2(-1.234), -1.23);
    }
}
