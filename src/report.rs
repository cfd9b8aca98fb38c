//! Long-format comparison report
//!
//! One row per (categorical trait, value) and one row per numerical trait.
//! Rows are accumulated in memory and converted to a polars DataFrame once.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::comparisons::{CategoricalResult, Frequencies, NumericalResult};
use crate::error::Result;

/// Value written to the `value` column of numerical rows
pub const MEAN_LABEL: &str = "mean";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    Categorical,
    Numerical,
}

impl VariableType {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableType::Categorical => "categorical",
            VariableType::Numerical => "numerical",
        }
    }
}

/// Per-group statistic: a presence/absence table or a mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Abundance {
    Frequencies(Frequencies),
    Mean(f64),
}

impl Abundance {
    /// Present bucket for frequencies, the mean otherwise
    pub fn primary(&self) -> f64 {
        match self {
            Abundance::Frequencies(freqs) => freqs.present,
            Abundance::Mean(mean) => *mean,
        }
    }

    /// Absent bucket, `None` for means
    pub fn absent(&self) -> Option<f64> {
        match self {
            Abundance::Frequencies(freqs) => Some(freqs.absent),
            Abundance::Mean(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub variable: String,
    #[serde(rename = "type")]
    pub variable_type: VariableType,
    pub dataset: String,
    /// Compared categorical value, or "mean"
    pub value: String,
    pub abundance_in: Abundance,
    pub abundance_out: Abundance,
    #[serde(rename = "p-value")]
    pub p_value: f64,
}

impl ComparisonRow {
    pub fn categorical(
        variable: &str,
        dataset: &str,
        value: &str,
        result: CategoricalResult,
    ) -> Self {
        Self {
            variable: variable.to_string(),
            variable_type: VariableType::Categorical,
            dataset: dataset.to_string(),
            value: value.to_string(),
            abundance_in: Abundance::Frequencies(result.abundance_in),
            abundance_out: Abundance::Frequencies(result.abundance_out),
            p_value: result.pvalue,
        }
    }

    pub fn numerical(variable: &str, dataset: &str, result: NumericalResult) -> Self {
        Self {
            variable: variable.to_string(),
            variable_type: VariableType::Numerical,
            dataset: dataset.to_string(),
            value: MEAN_LABEL.to_string(),
            abundance_in: Abundance::Mean(result.abundance_in),
            abundance_out: Abundance::Mean(result.abundance_out),
            p_value: result.pvalue,
        }
    }
}

/// Ordered sequence of comparison rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    rows: Vec<ComparisonRow>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ComparisonRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComparisonRow> {
        self.rows.iter()
    }

    /// Rows of one trait, in report order
    pub fn rows_for<'a>(&'a self, variable: &'a str) -> impl Iterator<Item = &'a ComparisonRow> {
        self.rows.iter().filter(move |row| row.variable == variable)
    }

    pub fn into_rows(self) -> Vec<ComparisonRow> {
        self.rows
    }

    /// Convert to a polars DataFrame
    ///
    /// Frequencies are split into the present bucket (`abundance_in`,
    /// `abundance_out`) and the absent bucket (`*_absent`, null for
    /// numerical rows).
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let n = self.rows.len();
        let mut variables = Vec::with_capacity(n);
        let mut types = Vec::with_capacity(n);
        let mut datasets = Vec::with_capacity(n);
        let mut values = Vec::with_capacity(n);
        let mut abundance_in = Vec::with_capacity(n);
        let mut abundance_out = Vec::with_capacity(n);
        let mut abundance_in_absent = Vec::with_capacity(n);
        let mut abundance_out_absent = Vec::with_capacity(n);
        let mut p_values = Vec::with_capacity(n);

        for row in &self.rows {
            variables.push(row.variable.as_str());
            types.push(row.variable_type.as_str());
            datasets.push(row.dataset.as_str());
            values.push(row.value.as_str());
            abundance_in.push(row.abundance_in.primary());
            abundance_out.push(row.abundance_out.primary());
            abundance_in_absent.push(row.abundance_in.absent());
            abundance_out_absent.push(row.abundance_out.absent());
            p_values.push(row.p_value);
        }

        let df = DataFrame::new(vec![
            Series::new("variable".into(), variables).into(),
            Series::new("type".into(), types).into(),
            Series::new("dataset".into(), datasets).into(),
            Series::new("value".into(), values).into(),
            Series::new("abundance_in".into(), abundance_in).into(),
            Series::new("abundance_out".into(), abundance_out).into(),
            Series::new("abundance_in_absent".into(), abundance_in_absent).into(),
            Series::new("abundance_out_absent".into(), abundance_out_absent).into(),
            Series::new("p-value".into(), p_values).into(),
        ])?;

        Ok(df)
    }

    /// Pretty-printed JSON array of rows
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.rows)?)
    }
}

impl From<Vec<ComparisonRow>> for Report {
    fn from(rows: Vec<ComparisonRow>) -> Self {
        Self { rows }
    }
}

impl Extend<ComparisonRow> for Report {
    fn extend<I: IntoIterator<Item = ComparisonRow>>(&mut self, iter: I) {
        self.rows.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a ComparisonRow;
    type IntoIter = std::slice::Iter<'a, ComparisonRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
