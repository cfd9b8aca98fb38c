//! Comparison Configuration
//!
//! Tunables for the comparators and the report assembler. Defaults reproduce
//! the reference behavior: 1e-6 pseudo-count, 10,000 resampled draws,
//! missing values propagated into the t-test, dataset label "df".
//!
//! Loaded from JSON the same way calibration parameters are: any field left
//! out of the file falls back to its default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ComparisonError, Result};

pub const DEFAULT_PSEUDO_COUNT: f64 = 1e-6;
pub const DEFAULT_RESAMPLE_SIZE: usize = 10_000;
pub const DEFAULT_DATASET_LABEL: &str = "df";
pub const DEFAULT_INDEX_COLUMN: &str = "species";

/// How the Welch t-test treats missing (NaN) numeric observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NanPolicy {
    /// Any NaN makes the test statistic and p-value NaN
    #[default]
    Propagate,
    /// NaN observations are dropped before testing
    Omit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Seeded into both frequency buckets before counting
    pub pseudo_count: f64,
    /// Draws per group for the weighted KS tests
    pub resample_size: usize,
    /// Fixed seed for reproducible resampling; entropy-seeded when absent
    pub seed: Option<u64>,
    pub nan_policy: NanPolicy,
    /// Written to the `dataset` column of every report row
    pub dataset_label: String,
    /// Directory column holding the taxon name
    pub index_column: String,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            pseudo_count: DEFAULT_PSEUDO_COUNT,
            resample_size: DEFAULT_RESAMPLE_SIZE,
            seed: None,
            nan_policy: NanPolicy::default(),
            dataset_label: DEFAULT_DATASET_LABEL.to_string(),
            index_column: DEFAULT_INDEX_COLUMN.to_string(),
        }
    }
}

impl ComparisonConfig {
    /// Load config from a JSON file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: ComparisonConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Same defaults with a fixed resampling seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.pseudo_count.is_finite() || self.pseudo_count <= 0.0 {
            return Err(ComparisonError::InvalidConfig(format!(
                "pseudo_count must be positive and finite, got {}",
                self.pseudo_count
            )));
        }
        if self.resample_size == 0 {
            return Err(ComparisonError::InvalidConfig(
                "resample_size must be at least 1".to_string(),
            ));
        }
        if self.index_column.is_empty() {
            return Err(ComparisonError::InvalidConfig(
                "index_column must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
