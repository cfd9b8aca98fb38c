//! Weighted Resampling
//!
//! Draws a fixed-size sample with replacement from a `WeightedValues`
//! collection, each value drawn with probability proportional to its weight.
//! Used to approximate KS tests over abundance-weighted distributions.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{ComparisonError, Result};
use crate::utils::weighted_values::{OrderedKey, WeightedValues};

/// Sample `size` values with replacement, proportional to weight
///
/// # Errors
/// - `InvalidWeight` if any weight is negative or not finite
/// - `EmptyDistribution` if there are no values or the weights sum to zero
pub fn resample<K, R>(
    values: &WeightedValues<K>,
    size: usize,
    rng: &mut R,
    group: &str,
) -> Result<Vec<K>>
where
    K: OrderedKey,
    R: Rng + ?Sized,
{
    if let Some((key, weight)) = values
        .iter()
        .find(|(_, weight)| !weight.is_finite() || *weight < 0.0)
    {
        return Err(ComparisonError::InvalidWeight { key: key.label(), weight });
    }

    let empty = || ComparisonError::EmptyDistribution { group: group.to_string() };
    if values.is_empty() || values.total_weight() <= 0.0 {
        return Err(empty());
    }

    let index = WeightedIndex::new(values.weights()).map_err(|_| empty())?;
    let keys: Vec<&K> = values.keys().collect();

    Ok((0..size).map(|_| keys[index.sample(rng)].clone()).collect())
}

/// Generator for one trait's resampling
///
/// With a base seed, every trait gets `seed + position`, so a report comes out
/// identical whether traits are compared sequentially or in parallel.
pub fn trait_rng(seed: Option<u64>, position: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(position as u64)),
        None => StdRng::from_entropy(),
    }
}
