//! WEIGHTED NUMERICAL COMPARISON
//!
//! Abundance-weighted version of the numerical comparison. Each group is a
//! mapping from trait value → weight; missing values are keyed as NaN.
//!
//! NaN keys are treated differently by the two halves:
//!   - the weighted mean skips them (no numerator, no denominator)
//!   - the resampling population keeps them, so missing data still shapes the
//!     resampled distribution fed to the KS test
//!
//! Zero non-NaN weight gives a mean of 0.

use rand::Rng;

use crate::comparisons::NumericalResult;
use crate::config::ComparisonConfig;
use crate::error::Result;
use crate::utils::{ks_2samp, resample, weighted_mean_ignore_nan, WeightedValues};

pub fn compare_numeric_abundances<R: Rng + ?Sized>(
    group_a: &WeightedValues<f64>,
    group_b: &WeightedValues<f64>,
    config: &ComparisonConfig,
    rng: &mut R,
) -> Result<NumericalResult> {
    let abundance_in = weighted_mean_ignore_nan(group_a);
    let abundance_out = weighted_mean_ignore_nan(group_b);

    let samples_a = resample(group_a, config.resample_size, rng, "group A")?;
    let samples_b = resample(group_b, config.resample_size, rng, "group B")?;
    let test = ks_2samp(&samples_a, &samples_b);

    Ok(NumericalResult {
        abundance_in,
        abundance_out,
        pvalue: test.pvalue,
    })
}
