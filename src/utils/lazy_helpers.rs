//! LazyFrame materialization helpers with column validation
//!
//! Checks that every required column exists before projecting, so a
//! directory file with a renamed or missing trait column fails with the
//! column's name rather than a generic polars error.

use polars::prelude::*;

use crate::error::{ComparisonError, Result};

/// Materialize LazyFrame with explicit column list and validation
///
/// # Arguments
/// * `lazy` - LazyFrame to materialize
/// * `columns` - Required column names, in output order
///
/// # Errors
/// - `MissingColumn` naming the first required column absent from the schema
/// - `Polars` if materialization fails
///
/// # Example
/// ```rust,ignore
/// let df = materialize_with_columns(
///     &directory_lazy,
///     &["species", "gram_stain", "optimal_ph"],
/// )?;
/// ```
pub fn materialize_with_columns(lazy: &LazyFrame, columns: &[&str]) -> Result<DataFrame> {
    let mut probe = lazy.clone();
    let schema = probe.collect_schema()?;

    if let Some(missing) = columns.iter().find(|&&name| schema.get(name).is_none()) {
        return Err(ComparisonError::MissingColumn(missing.to_string()));
    }

    let col_exprs: Vec<Expr> = columns.iter().map(|&name| col(name)).collect();

    Ok(lazy.clone().select(&col_exprs).collect()?)
}

/// Check an already-materialized DataFrame carries every required column
pub fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<()> {
    match columns.iter().find(|&&name| df.column(name).is_err()) {
        Some(missing) => Err(ComparisonError::MissingColumn(missing.to_string())),
        None => Ok(()),
    }
}
