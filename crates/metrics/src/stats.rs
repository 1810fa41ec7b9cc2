//! Series reductions.
//!
//! Every function here is total: an empty series reduces to `0.0`.

use ordered_float::OrderedFloat;
use statrs::statistics::Statistics;

/// Arithmetic mean, `0.0` if empty.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    Statistics::mean(values)
}

/// Median of a sorted copy, averaging the two central values for even
/// lengths. `0.0` if empty.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted: Vec<OrderedFloat<f64>> = values.iter().copied().map(OrderedFloat).collect();
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1].0 + sorted[mid].0) / 2.0
    } else {
        sorted[mid].0
    }
}

/// Largest element, `0.0` if empty.
pub fn max(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .map(OrderedFloat)
        .max()
        .map_or(0.0, |m| m.0)
}

/// `count / total`, `0.0` when `total` is zero.
pub fn percentage(count: u64, total: u64) -> f64 {
    if total > 0 {
        count as f64 / total as f64
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_median_table() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[5.0]), 5.0);
        assert_eq!(median(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn test_median_ignores_input_order() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[9.0, -1.0, 3.0]), 3.0);
        assert_eq!(median(&[2.0, 2.0, 2.0, 7.0]), 2.0);
    }

    #[test]
    fn test_mean_table() {
        assert_eq!(mean(&[]), 0.0);
        assert_abs_diff_eq!(mean(&[2.0, 4.0, 6.0]), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mean(&[1.0, 2.0]), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_max() {
        assert_eq!(max(&[]), 0.0);
        assert_eq!(max(&[3.0, 10.0, 7.0]), 10.0);
        assert_eq!(max(&[-3.0, -1.0]), -1.0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
        assert_abs_diff_eq!(percentage(1, 2), 0.5);
        assert_abs_diff_eq!(percentage(3, 3), 1.0);
    }
}
