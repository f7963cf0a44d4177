use crate::scoring::round_to;

/// Pearson correlation between weekly fantasy points and average salary change
#[derive(Debug, Clone)]
pub struct CorrelationAnalyzer {
    min_observations: usize,
}

impl Default for CorrelationAnalyzer {
    fn default() -> Self {
        Self { min_observations: 3 }
    }
}

impl CorrelationAnalyzer {
    pub fn new(min_observations: usize) -> Self {
        Self { min_observations }
    }

    /// Correlate aligned `(fantasy_points, avg_salary_change)` pairs.
    ///
    /// Returns `None` with fewer than the minimum number of pairs or when the
    /// coefficient is undefined (a constant series). Defined results are
    /// rounded to 3 decimals.
    pub fn correlate(&self, pairs: &[(f64, f64)]) -> Option<f64> {
        if pairs.len() < self.min_observations {
            return None;
        }

        let (points, changes): (Vec<f64>, Vec<f64>) = pairs.iter().copied().unzip();
        pearson(&points, &changes).map(|r| round_to(r.clamp(-1.0, 1.0), 3))
    }
}

fn pearson(x_values: &[f64], y_values: &[f64]) -> Option<f64> {
    let n = x_values.len() as f64;

    let mean_x = x_values.iter().sum::<f64>() / n;
    let mean_y = y_values.iter().sum::<f64>() / n;

    let (covariance, variance_x, variance_y) = x_values
        .iter()
        .zip(y_values.iter())
        .map(|(x, y)| {
            let diff_x = x - mean_x;
            let diff_y = y - mean_y;
            (diff_x * diff_y, diff_x * diff_x, diff_y * diff_y)
        })
        .fold((0.0, 0.0, 0.0), |acc, (cov, var_x, var_y)| (acc.0 + cov, acc.1 + var_x, acc.2 + var_y));

    if variance_x == 0.0 || variance_y == 0.0 {
        return None;
    }

    let r = covariance / (variance_x.sqrt() * variance_y.sqrt());
    r.is_finite().then_some(r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fewer_than_three_pairs_is_unknown() {
        let analyzer = CorrelationAnalyzer::default();
        assert_eq!(analyzer.correlate(&[]), None);
        assert_eq!(analyzer.correlate(&[(10.0, 100.0)]), None);
        assert_eq!(analyzer.correlate(&[(10.0, 100.0), (20.0, 200.0)]), None);
    }

    #[test]
    fn test_perfect_positive_relation() {
        let pairs = [(10.0, 100.0), (20.0, 300.0), (5.0, 0.0), (15.0, 200.0)];
        assert_eq!(CorrelationAnalyzer::default().correlate(&pairs), Some(1.0));
    }

    #[test]
    fn test_perfect_negative_relation() {
        let pairs = [(10.0, -50.0), (20.0, -150.0), (30.0, -250.0)];
        assert_eq!(CorrelationAnalyzer::default().correlate(&pairs), Some(-1.0));
    }

    #[test]
    fn test_constant_series_is_unknown() {
        let flat_salary = [(10.0, 175.0), (20.0, 175.0), (5.0, 175.0)];
        let flat_points = [(12.0, 100.0), (12.0, -200.0), (12.0, 50.0)];
        let analyzer = CorrelationAnalyzer::default();
        assert_eq!(analyzer.correlate(&flat_salary), None);
        assert_eq!(analyzer.correlate(&flat_points), None);
    }

    #[test]
    fn test_rounds_to_three_decimals() {
        let pairs = [(1.0, 2.0), (2.0, 1.0), (3.0, 4.0), (4.0, 3.0)];
        // r = 0.6 exactly for this series
        assert_eq!(CorrelationAnalyzer::default().correlate(&pairs), Some(0.6));

        let noisy = [(12.4, 100.0), (8.1, -200.0), (22.0, 300.0), (15.5, 0.0)];
        let r = CorrelationAnalyzer::default().correlate(&noisy).unwrap();
        assert_eq!(r, round_to(r, 3));
        assert!(r > 0.0 && r < 1.0);
    }

    #[test]
    fn test_custom_minimum() {
        let analyzer = CorrelationAnalyzer::new(5);
        let pairs = [(1.0, 1.0), (2.0, 2.0), (3.0, 3.0), (4.0, 4.0)];
        assert_eq!(analyzer.correlate(&pairs), None);
    }

    proptest! {
        #[test]
        fn prop_short_series_always_unknown(
            pairs in proptest::collection::vec((-50.0..50.0f64, -500.0..500.0f64), 0..3)
        ) {
            prop_assert_eq!(CorrelationAnalyzer::default().correlate(&pairs), None);
        }

        #[test]
        fn prop_linear_series_has_unit_magnitude(
            xs in proptest::collection::btree_set(-100i32..100, 3..10),
            slope in prop_oneof![1..20i32, -20..-1i32],
            intercept in -100..100i32,
        ) {
            let pairs: Vec<(f64, f64)> = xs
                .iter()
                .map(|&x| (f64::from(x), f64::from(slope * x + intercept)))
                .collect();
            let r = CorrelationAnalyzer::default().correlate(&pairs).unwrap();
            prop_assert_eq!(r, if slope > 0 { 1.0 } else { -1.0 });
        }

        #[test]
        fn prop_defined_result_is_bounded(
            pairs in proptest::collection::vec((-50.0..50.0f64, -500.0..500.0f64), 3..12)
        ) {
            if let Some(r) = CorrelationAnalyzer::default().correlate(&pairs) {
                prop_assert!((-1.0..=1.0).contains(&r));
            }
        }
    }
}
