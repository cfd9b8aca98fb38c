//! Error types for directory loading and taxa comparisons
//!
//! Lookup and sampling failures abort the comparison that triggered them.
//! Statistical degeneracies (empty groups, zero variance) are not errors:
//! they surface as NaN values in the report.

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComparisonError {
    /// Taxon identifier absent from the microbe directory
    #[error("Taxon '{0}' not found in microbe directory")]
    TaxonNotFound(String),

    /// Weighted group with nothing to sample from (empty or zero total weight)
    #[error("Cannot resample {group}: distribution is empty or has zero total weight")]
    EmptyDistribution { group: String },

    #[error("Invalid weight {weight} for '{key}': weights must be finite and non-negative")]
    InvalidWeight { key: String, weight: f64 },

    #[error("Duplicate taxon '{0}' in microbe directory index")]
    DuplicateTaxon(String),

    #[error("Missing expected column '{0}'")]
    MissingColumn(String),

    #[error("Invalid comparison config: {0}")]
    InvalidConfig(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure while comparing one trait of the directory
    #[error("Comparison of '{variable}' failed: {source}")]
    Variable {
        variable: String,
        #[source]
        source: Box<ComparisonError>,
    },
}

impl ComparisonError {
    pub(crate) fn in_variable(self, variable: &str) -> Self {
        ComparisonError::Variable {
            variable: variable.to_string(),
            source: Box::new(self),
        }
    }

    /// Innermost error, looking through per-trait context
    pub fn root(&self) -> &ComparisonError {
        match self {
            ComparisonError::Variable { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, ComparisonError>;
