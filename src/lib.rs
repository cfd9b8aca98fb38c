//! Microbe Directory Taxa Comparison
//!
//! Compares two groups of microbial taxa against a shared microbe directory
//! and reports, per trait, whether the groups differ.
//!
//! Module structure:
//! - `data`: Microbe directory loading with Polars, taxon lookup
//! - `comparisons/`: Categorical (chi-square), numerical (Welch t-test) and
//!   their abundance-weighted versions (resampling + two-sample KS)
//! - `comparator`: Report assembler over the fixed trait lists
//! - `report`: Long-format report rows, DataFrame and JSON output
//! - `utils/`: Statistics kernels, weighted resampling, LazyFrame helpers

pub mod utils;
pub mod error;
pub mod config;
pub mod data;
pub mod comparisons;
pub mod comparator;
pub mod report;

// Re-export commonly used types
pub use comparator::DirectoryComparator;
pub use comparisons::*;
pub use config::{ComparisonConfig, NanPolicy};
pub use data::{CategoricalTrait, MicrobeDirectory, NumericalTrait, TaxonRecord, CATEGORICAL_TRAITS, NUMERICAL_TRAITS};
pub use error::{ComparisonError, Result};
pub use report::{Abundance, ComparisonRow, Report, VariableType};
pub use utils::WeightedValues;
