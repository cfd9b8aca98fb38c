//! Weighted value collections
//!
//! An insertion-ordered mapping from value → non-negative weight, used for the
//! abundance-weighted comparators. Adding a value that is already present sums
//! the weights, so taxa sharing a trait value pool their abundance.
//!
//! Keys only need a total order (`OrderedKey`): the same order drives key
//! equality here and the empirical CDFs of the two-sample KS test.

use std::cmp::Ordering;

/// Total order over sample values
///
/// Floats order by `f64::total_cmp` (NaN after +inf, all NaNs equal to each
/// other), missing categorical values order after every present value.
pub trait OrderedKey: Clone {
    fn key_cmp(&self, other: &Self) -> Ordering;

    fn key_eq(&self, other: &Self) -> bool {
        self.key_cmp(other) == Ordering::Equal
    }

    /// Display form for error messages
    fn label(&self) -> String;
}

impl OrderedKey for String {
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn label(&self) -> String {
        self.clone()
    }
}

impl OrderedKey for &str {
    fn key_cmp(&self, other: &Self) -> Ordering {
        (*self).cmp(*other)
    }

    fn label(&self) -> String {
        (*self).to_string()
    }
}

impl OrderedKey for f64 {
    fn key_cmp(&self, other: &Self) -> Ordering {
        canonical_nan(*self).total_cmp(&canonical_nan(*other))
    }

    fn label(&self) -> String {
        self.to_string()
    }
}

impl<T: OrderedKey> OrderedKey for Option<T> {
    fn key_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Some(a), Some(b)) => a.key_cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    fn label(&self) -> String {
        match self {
            Some(value) => value.label(),
            None => "<missing>".to_string(),
        }
    }
}

// Every NaN bit pattern collapses to one key
fn canonical_nan(x: f64) -> f64 {
    if x.is_nan() {
        f64::NAN
    } else {
        x
    }
}

/// Insertion-ordered value → weight mapping
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedValues<K> {
    entries: Vec<(K, f64)>,
}

impl<K> Default for WeightedValues<K> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<K: OrderedKey> WeightedValues<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add weight to a value, summing with any weight it already carries
    pub fn add(&mut self, key: K, weight: f64) {
        match self.entries.iter_mut().find(|(existing, _)| existing.key_eq(&key)) {
            Some((_, total)) => *total += weight,
            None => self.entries.push((key, weight)),
        }
    }

    pub fn get(&self, key: &K) -> Option<f64> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.key_eq(key))
            .map(|(_, weight)| *weight)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, f64)> {
        self.entries.iter().map(|(key, weight)| (key, *weight))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn weights(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, weight)| *weight)
    }

    pub fn total_weight(&self) -> f64 {
        self.weights().sum()
    }

    /// Multiply every weight by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(key, weight)| (key.clone(), weight * factor))
                .collect(),
        }
    }
}

impl<K: OrderedKey> FromIterator<(K, f64)> for WeightedValues<K> {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (key, weight) in iter {
            values.add(key, weight);
        }
        values
    }
}
