//! WEIGHTED CATEGORICAL COMPARISON
//!
//! Abundance-weighted version of the categorical comparison. Each group is a
//! mapping from categorical value → weight (e.g. summed relative abundance of
//! the taxa carrying that value).
//!
//! Algorithm:
//!   1. Sum weights into {present(v), absent(v)}, pseudo-count seeded
//!   2. Resample `resample_size` labels per group, proportional to weight
//!   3. Two-sample KS test on the resampled labels themselves, so the whole
//!      category distribution is compared rather than the presence of `v`
//!
//! A group that cannot be sampled (no values, zero total weight) is an error.

use rand::Rng;

use crate::comparisons::{CategoricalResult, Frequencies};
use crate::config::ComparisonConfig;
use crate::error::Result;
use crate::utils::{ks_2samp, resample, OrderedKey, WeightedValues};

/// Sum weights equal / not equal to `value`, pseudo-count seeded
pub fn count_values_abundances<K: OrderedKey>(
    values: &WeightedValues<K>,
    value: &K,
    pseudo_count: f64,
) -> Frequencies {
    values
        .iter()
        .fold(Frequencies::seeded(pseudo_count), |mut freqs, (key, weight)| {
            if key.key_eq(value) {
                freqs.present += weight;
            } else {
                freqs.absent += weight;
            }
            freqs
        })
}

pub fn compare_categorical_abundances<K, R>(
    value: &K,
    group_a: &WeightedValues<K>,
    group_b: &WeightedValues<K>,
    config: &ComparisonConfig,
    rng: &mut R,
) -> Result<CategoricalResult>
where
    K: OrderedKey,
    R: Rng + ?Sized,
{
    let abundance_in = count_values_abundances(group_a, value, config.pseudo_count);
    let abundance_out = count_values_abundances(group_b, value, config.pseudo_count);

    let samples_a = resample(group_a, config.resample_size, rng, "group A")?;
    let samples_b = resample(group_b, config.resample_size, rng, "group B")?;
    let test = ks_2samp(&samples_a, &samples_b);

    Ok(CategoricalResult {
        abundance_in,
        abundance_out,
        pvalue: test.pvalue,
    })
}
