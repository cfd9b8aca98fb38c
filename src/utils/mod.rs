//! Utility modules for taxa comparisons
//!
//! Contains shared functionality used across multiple comparators:
//! - Statistics: chi-square, Welch t-test, two-sample KS, NaN-aware means
//! - Sampling: weighted resampling with replacement
//! - Weighted values: ordered value → weight collections
//! - LazyFrame helpers: Safe materialization with column validation

pub mod statistics;
pub mod sampling;
pub mod weighted_values;
pub mod lazy_helpers;

// Re-export commonly used types
pub use statistics::{chisquare, ks_2samp, nan_mean, weighted_mean_ignore_nan, welch_ttest, TestResult};
pub use sampling::{resample, trait_rng};
pub use weighted_values::{OrderedKey, WeightedValues};
pub use lazy_helpers::{materialize_with_columns, require_columns};
