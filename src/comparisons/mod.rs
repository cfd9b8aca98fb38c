//! Comparator modules for taxa comparisons
//!
//! Each comparator is implemented in its own module:
//! - `categorical`: presence/absence counts + chi-square
//! - `numerical`: means + Welch's t-test
//! - `categorical_abundances`: weighted presence/absence + resampled KS test
//! - `numerical_abundances`: NaN-skipping weighted mean + resampled KS test

pub mod categorical;
pub mod numerical;
pub mod categorical_abundances;
pub mod numerical_abundances;

// Re-export comparator functions
pub use categorical::{compare_categorical, count_values, CategoricalResult};
pub use numerical::{compare_numeric, NumericalResult};
pub use categorical_abundances::{compare_categorical_abundances, count_values_abundances};
pub use numerical_abundances::compare_numeric_abundances;

use serde::{Deserialize, Serialize};

/// Two-bucket frequency table for one categorical value
///
/// Serialized with the `True`/`False` keys of the presence/absence projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frequencies {
    /// Observations (or weight) equal to the compared value
    #[serde(rename = "True")]
    pub present: f64,
    /// Everything else, missing values included
    #[serde(rename = "False")]
    pub absent: f64,
}

impl Frequencies {
    /// Both buckets start at the pseudo-count
    pub fn seeded(pseudo_count: f64) -> Self {
        Self {
            present: pseudo_count,
            absent: pseudo_count,
        }
    }

    pub fn total(&self) -> f64 {
        self.present + self.absent
    }

    /// Share of the total falling in the present bucket
    pub fn present_ratio(&self) -> f64 {
        self.present / self.total()
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.present, self.absent]
    }
}
