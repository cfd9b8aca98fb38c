//! CATEGORICAL COMPARISON
//!
//! Compares how often one categorical value occurs in two taxa groups.
//!
//! Algorithm:
//!   1. Project each group onto {present(v), absent(v)}, both buckets seeded
//!      with the pseudo-count so no bucket is ever zero
//!   2. Chi-square test with group A's frequencies as observed and group B's
//!      frequencies as expected
//!
//! Groups may differ in size; the totals of the two vectors are not required
//! to agree.

use crate::comparisons::Frequencies;
use crate::config::ComparisonConfig;
use crate::utils::chisquare;

/// Result of one categorical comparison
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoricalResult {
    /// Frequencies in group A
    pub abundance_in: Frequencies,
    /// Frequencies in group B
    pub abundance_out: Frequencies,
    pub pvalue: f64,
}

/// Count observations equal / not equal to `value`, pseudo-count seeded
pub fn count_values<T: PartialEq>(values: &[T], value: &T, pseudo_count: f64) -> Frequencies {
    values
        .iter()
        .fold(Frequencies::seeded(pseudo_count), |mut freqs, observed| {
            if observed == value {
                freqs.present += 1.0;
            } else {
                freqs.absent += 1.0;
            }
            freqs
        })
}

/// Compare presence of `value` between two groups of observations
pub fn compare_categorical<T: PartialEq>(
    value: &T,
    group_a: &[T],
    group_b: &[T],
    config: &ComparisonConfig,
) -> CategoricalResult {
    let abundance_in = count_values(group_a, value, config.pseudo_count);
    let abundance_out = count_values(group_b, value, config.pseudo_count);

    let test = chisquare(&abundance_in.as_array(), &abundance_out.as_array());

    CategoricalResult {
        abundance_in,
        abundance_out,
        pvalue: test.pvalue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPS: f64 = 1e-6;

    #[test]
    fn test_compare_categorical_binary() {
        let config = ComparisonConfig::default();
        let result = compare_categorical(
            &"yes",
            &["yes", "yes", "no", "yes", "yes"],
            &["no", "no", "no", "yes", "yes", "no", "no"], // note that these are NOT the same length
            &config,
        );

        assert_relative_eq!(result.abundance_in.present, 4.0 + EPS, epsilon = 1e-12);
        assert_relative_eq!(result.abundance_in.absent, 1.0 + EPS, epsilon = 1e-12);
        assert_relative_eq!(result.abundance_out.present, 2.0 + EPS, epsilon = 1e-12);
        assert_relative_eq!(result.abundance_out.absent, 5.0 + EPS, epsilon = 1e-12);

        // (4-2)²/2 + (1-5)²/5 = 5.2 on 1 degree of freedom
        assert!(result.pvalue.is_finite());
        assert!((0.0..=1.0).contains(&result.pvalue));
        assert_relative_eq!(result.pvalue, 0.0226, epsilon = 1e-3);
    }

    #[test]
    fn test_compare_categorical_multi() {
        let config = ComparisonConfig::default();
        let result = compare_categorical(&"A", &["A", "B", "D"], &["B", "C", "D", "E"], &config);

        assert_relative_eq!(result.abundance_in.present, 1.0 + EPS, epsilon = 1e-12);
        assert_relative_eq!(result.abundance_out.present, EPS, epsilon = 1e-12);
        assert_relative_eq!(result.abundance_out.absent, 4.0 + EPS, epsilon = 1e-12);
        // Near-zero expected bucket drives the statistic up, p towards 0
        assert!(result.pvalue >= 0.0 && result.pvalue < 1e-6);
    }

    #[test]
    fn test_swapping_compared_value_inverts_buckets() {
        let config = ComparisonConfig::default();
        let a = ["yes", "yes", "no", "yes", "yes"];
        let b = ["no", "no", "no", "yes", "yes", "no", "no"];

        let yes = compare_categorical(&"yes", &a, &b, &config);
        let no = compare_categorical(&"no", &a, &b, &config);

        assert_eq!(yes.abundance_in.present, no.abundance_in.absent);
        assert_eq!(yes.abundance_in.absent, no.abundance_in.present);
        assert_eq!(yes.abundance_out.present, no.abundance_out.absent);
        assert_relative_eq!(yes.pvalue, no.pvalue, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_group_uses_pseudo_count_only() {
        let config = ComparisonConfig::default();
        let empty: [&str; 0] = [];
        let result = compare_categorical(&"positive", &empty, &["positive", "negative"], &config);

        assert_eq!(result.abundance_in, Frequencies::seeded(EPS));
        assert!(!result.pvalue.is_nan());
        assert!((0.0..=1.0).contains(&result.pvalue));
    }

    #[test]
    fn test_missing_observations_count_as_absent() {
        let freqs = count_values(&[Some("gut"), None, Some("skin")], &Some("gut"), 0.0);
        assert_eq!(freqs.present, 1.0);
        assert_eq!(freqs.absent, 2.0);
    }
}
