//! Significance Test Kernels
//!
//! - Chi-square goodness-of-fit against a supplied expected vector
//! - Welch's unequal-variance two-sample t-test
//! - Two-sample Kolmogorov-Smirnov test over any totally ordered sample
//! - NaN-skipping means (plain and weighted)
//!
//! Degenerate inputs (too few observations, zero variance) produce NaN rather
//! than errors so a report can keep going through the remaining traits.

use statrs::distribution::{ChiSquared, ContinuousCDF, StudentsT};
use std::cmp::Ordering;

use crate::config::NanPolicy;
use crate::utils::weighted_values::{OrderedKey, WeightedValues};

/// Test statistic with its p-value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestResult {
    pub statistic: f64,
    pub pvalue: f64,
}

impl TestResult {
    fn nan() -> Self {
        Self { statistic: f64::NAN, pvalue: f64::NAN }
    }
}

/// Chi-square test of `observed` against `expected` frequencies
///
/// Statistic: Σ (obs - exp)² / exp with k - 1 degrees of freedom. The totals of
/// the two vectors are not required to agree, so an empirical frequency vector
/// from a differently sized group can serve as the expected distribution.
pub fn chisquare(observed: &[f64], expected: &[f64]) -> TestResult {
    debug_assert_eq!(observed.len(), expected.len());

    let k = observed.len().min(expected.len());
    if k < 2 {
        return TestResult::nan();
    }

    let statistic: f64 = observed
        .iter()
        .zip(expected)
        .map(|(obs, exp)| (obs - exp).powi(2) / exp)
        .sum();

    let pvalue = match ChiSquared::new((k - 1) as f64) {
        Ok(dist) if statistic.is_finite() => dist.sf(statistic),
        _ => f64::NAN,
    };

    TestResult { statistic, pvalue }
}

/// Welch's t-test (two-sided, no equal-variance assumption)
///
/// Fewer than two usable observations in either group gives NaN. When both
/// groups have zero variance the statistic is ±inf (p = 0) for different means
/// and NaN for equal means.
pub fn welch_ttest(a: &[f64], b: &[f64], nan_policy: NanPolicy) -> TestResult {
    let (a, b): (Vec<f64>, Vec<f64>) = match nan_policy {
        NanPolicy::Propagate => {
            if a.iter().chain(b).any(|x| x.is_nan()) {
                return TestResult::nan();
            }
            (a.to_vec(), b.to_vec())
        }
        NanPolicy::Omit => (
            a.iter().copied().filter(|x| !x.is_nan()).collect(),
            b.iter().copied().filter(|x| !x.is_nan()).collect(),
        ),
    };

    if a.len() < 2 || b.len() < 2 {
        return TestResult::nan();
    }

    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let mean1 = mean(&a);
    let mean2 = mean(&b);
    let vn1 = sample_variance(&a, mean1) / n1;
    let vn2 = sample_variance(&b, mean2) / n2;

    let diff = mean1 - mean2;
    let denom = (vn1 + vn2).sqrt();

    if denom == 0.0 {
        if diff == 0.0 {
            return TestResult::nan();
        }
        return TestResult { statistic: diff.signum() * f64::INFINITY, pvalue: 0.0 };
    }

    let df = (vn1 + vn2).powi(2) / (vn1.powi(2) / (n1 - 1.0) + vn2.powi(2) / (n2 - 1.0));
    let statistic = diff / denom;

    let pvalue = match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.sf(statistic.abs())).min(1.0),
        Err(_) => f64::NAN,
    };

    TestResult { statistic, pvalue }
}

/// Two-sample Kolmogorov-Smirnov test (two-sided)
pub fn ks_2samp<K: OrderedKey>(a: &[K], b: &[K]) -> TestResult {
    ks_2samp_by(a, b, |x, y| x.key_cmp(y))
}

/// Two-sample KS test under a caller-supplied total order
///
/// The statistic is the largest gap between the two empirical CDFs evaluated
/// at every pooled observation. Equal sample sizes get the exact p-value;
/// otherwise the asymptotic Kolmogorov distribution is evaluated at
/// `(sqrt(en) + 0.12 + 0.11 / sqrt(en)) * D` with `en = n1 * n2 / (n1 + n2)`
/// (Stephens' small-sample correction).
pub fn ks_2samp_by<T, F>(a: &[T], b: &[T], cmp: F) -> TestResult
where
    F: Fn(&T, &T) -> Ordering,
{
    let n1 = a.len();
    let n2 = b.len();
    if n1 == 0 || n2 == 0 {
        return TestResult::nan();
    }

    let mut sorted_a: Vec<&T> = a.iter().collect();
    let mut sorted_b: Vec<&T> = b.iter().collect();
    sorted_a.sort_by(|x, y| cmp(x, y));
    sorted_b.sort_by(|x, y| cmp(x, y));

    // Walk distinct pooled values; ties advance both sides together
    let (mut i, mut j) = (0usize, 0usize);
    let mut statistic: f64 = 0.0;
    while i < n1 && j < n2 {
        let current = if cmp(sorted_a[i], sorted_b[j]) != Ordering::Greater {
            sorted_a[i]
        } else {
            sorted_b[j]
        };
        while i < n1 && cmp(sorted_a[i], current) == Ordering::Equal {
            i += 1;
        }
        while j < n2 && cmp(sorted_b[j], current) == Ordering::Equal {
            j += 1;
        }
        let gap = (i as f64 / n1 as f64 - j as f64 / n2 as f64).abs();
        statistic = statistic.max(gap);
    }

    if n1 == n2 {
        let h = (statistic * n1 as f64).round() as usize;
        if h == 0 {
            return TestResult { statistic: 0.0, pvalue: 1.0 };
        }
        let statistic = h as f64 / n1 as f64;
        let pvalue = prob_outside_square(n1, h).clamp(0.0, 1.0);
        return TestResult { statistic, pvalue };
    }

    // Stephens' correction to the effective sample size
    let en = (n1 * n2) as f64 / (n1 + n2) as f64;
    let sqrt_en = en.sqrt();
    let lambda = (sqrt_en + 0.12 + 0.11 / sqrt_en) * statistic;
    TestResult { statistic, pvalue: kolmogorov_sf(lambda) }
}

/// P(D >= h/n) for two samples of equal size n
///
/// Fraction of lattice paths from (0,0) to (n,n) leaving the band |x - y| < h.
fn prob_outside_square(n: usize, h: usize) -> f64 {
    let n = n as i64;
    let h = h as i64;
    let mut p = 0.0;
    let mut k = n / h;
    while k >= 0 {
        let mut p1 = 1.0;
        for j in 0..h {
            p1 = (n - k * h - j) as f64 * p1 / (n + k * h + j + 1) as f64;
        }
        p = p1 * (1.0 - p);
        k -= 1;
    }
    2.0 * p
}

/// Survival function of the limiting Kolmogorov distribution
fn kolmogorov_sf(lambda: f64) -> f64 {
    if lambda.is_nan() {
        return f64::NAN;
    }
    if lambda < 0.2 {
        return 1.0;
    }

    let mut sum = 0.0;
    let mut sign = 1.0;
    for k in 1..=100 {
        let k = k as f64;
        let term = (-2.0 * k * k * lambda * lambda).exp();
        sum += sign * term;
        if term < 1e-16 {
            break;
        }
        sign = -sign;
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

/// Arithmetic mean skipping NaN; NaN when nothing remains
pub fn nan_mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|x| !x.is_nan())
        .fold((0.0, 0usize), |(sum, count), x| (sum + x, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Weighted mean of the value keys, skipping NaN keys entirely
///
/// Zero total weight over non-NaN keys gives 0.0.
pub fn weighted_mean_ignore_nan(values: &WeightedValues<f64>) -> f64 {
    let (num, denom) = values
        .iter()
        .filter(|(value, _)| !value.is_nan())
        .fold((0.0, 0.0), |(num, denom), (value, weight)| {
            (num + value * weight, denom + weight)
        });
    if denom != 0.0 {
        num / denom
    } else {
        0.0
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_variance(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0)
}
