//! Directory Comparator - Report assembler for two taxa groups
//!
//! Resolves both groups against the microbe directory, runs the matching
//! comparator for every trait and concatenates the rows into one report:
//! categorical traits first (one row per distinct value, first-appearance
//! order over group A then group B), then numerical traits (one row each).
//!
//! Includes both sequential and parallel (Rayon) implementations. The
//! parallel variants give the same rows in the same order, and with a fixed
//! seed the same p-values, since every trait owns its generator.

use rayon::prelude::*;
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::comparisons::{
    compare_categorical, compare_categorical_abundances, compare_numeric,
    compare_numeric_abundances,
};
use crate::config::ComparisonConfig;
use crate::data::{CategoricalTrait, MicrobeDirectory, NumericalTrait, TaxonRecord};
use crate::error::{ComparisonError, Result};
use crate::report::{ComparisonRow, Report};
use crate::utils::{trait_rng, WeightedValues};

/// Compares taxa groups against a shared, read-only directory
pub struct DirectoryComparator<'d> {
    directory: &'d MicrobeDirectory,
    config: ComparisonConfig,
}

impl<'d> DirectoryComparator<'d> {
    pub fn new(directory: &'d MicrobeDirectory, config: ComparisonConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { directory, config })
    }

    pub fn directory(&self) -> &MicrobeDirectory {
        self.directory
    }

    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    /// Compare two taxa lists (presence/absence)
    ///
    /// Repeated taxa count once per occurrence. Any unknown taxon fails the
    /// whole call before a single trait is compared.
    pub fn compare<S: AsRef<str>>(&self, group_a: &[S], group_b: &[S]) -> Result<Report> {
        let records_a = self.directory.resolve(group_a)?;
        let records_b = self.directory.resolve(group_b)?;
        Ok(self.compare_records(&records_a, &records_b))
    }

    /// Same as `compare` with one trait per Rayon task
    pub fn compare_parallel<S: AsRef<str>>(&self, group_a: &[S], group_b: &[S]) -> Result<Report> {
        let records_a = self.directory.resolve(group_a)?;
        let records_b = self.directory.resolve(group_b)?;
        Ok(self.compare_records_parallel(&records_a, &records_b))
    }

    /// Compare two already-resolved directory slices
    pub fn compare_records(&self, records_a: &[&TaxonRecord], records_b: &[&TaxonRecord]) -> Report {
        let mut report = Report::new();
        for trait_ in CategoricalTrait::ALL {
            report.extend(self.categorical_rows(trait_, records_a, records_b));
        }
        for trait_ in NumericalTrait::ALL {
            report.push(self.numerical_row(trait_, records_a, records_b));
        }

        info!(
            "Compared {} vs {} taxa: {} report rows",
            records_a.len(),
            records_b.len(),
            report.len()
        );
        report
    }

    pub fn compare_records_parallel(
        &self,
        records_a: &[&TaxonRecord],
        records_b: &[&TaxonRecord],
    ) -> Report {
        let categorical: Vec<Vec<ComparisonRow>> = CategoricalTrait::ALL
            .into_par_iter()
            .map(|trait_| self.categorical_rows(trait_, records_a, records_b))
            .collect();
        let numerical: Vec<ComparisonRow> = NumericalTrait::ALL
            .into_par_iter()
            .map(|trait_| self.numerical_row(trait_, records_a, records_b))
            .collect();

        let mut report = Report::new();
        report.extend(categorical.into_iter().flatten());
        report.extend(numerical);

        info!(
            "Compared {} vs {} taxa (parallel): {} report rows",
            records_a.len(),
            records_b.len(),
            report.len()
        );
        report
    }

    /// Compare two abundance-weighted taxa groups
    ///
    /// Weights must be finite and non-negative; they need not sum to one.
    /// A taxon listed twice contributes both weights. Unknown taxa are
    /// reported before invalid weights.
    pub fn compare_weighted<S: AsRef<str>>(
        &self,
        group_a: &[(S, f64)],
        group_b: &[(S, f64)],
    ) -> Result<Report> {
        let weighted_a = self.directory.resolve_weighted(group_a)?;
        let weighted_b = self.directory.resolve_weighted(group_b)?;
        self.compare_weighted_records(&weighted_a, &weighted_b)
    }

    /// Same as `compare_weighted` with one trait per Rayon task
    pub fn compare_weighted_parallel<S: AsRef<str>>(
        &self,
        group_a: &[(S, f64)],
        group_b: &[(S, f64)],
    ) -> Result<Report> {
        let weighted_a = self.directory.resolve_weighted(group_a)?;
        let weighted_b = self.directory.resolve_weighted(group_b)?;
        self.compare_weighted_records_parallel(&weighted_a, &weighted_b)
    }

    /// Compare two already-resolved directory slices carrying weights
    pub fn compare_weighted_records(
        &self,
        weighted_a: &[(&TaxonRecord, f64)],
        weighted_b: &[(&TaxonRecord, f64)],
    ) -> Result<Report> {
        validate_weights(weighted_a)?;
        validate_weights(weighted_b)?;

        let mut report = Report::new();
        for (position, trait_) in CategoricalTrait::ALL.into_iter().enumerate() {
            report.extend(self.weighted_categorical_rows(trait_, position, weighted_a, weighted_b)?);
        }
        for (offset, trait_) in NumericalTrait::ALL.into_iter().enumerate() {
            let position = CategoricalTrait::ALL.len() + offset;
            report.push(self.weighted_numerical_row(trait_, position, weighted_a, weighted_b)?);
        }

        info!(
            "Compared weighted groups of {} vs {} taxa: {} report rows",
            weighted_a.len(),
            weighted_b.len(),
            report.len()
        );
        Ok(report)
    }

    /// When several traits fail, the error of the first one in report order
    /// is returned.
    pub fn compare_weighted_records_parallel(
        &self,
        weighted_a: &[(&TaxonRecord, f64)],
        weighted_b: &[(&TaxonRecord, f64)],
    ) -> Result<Report> {
        validate_weights(weighted_a)?;
        validate_weights(weighted_b)?;

        let categorical: Vec<Result<Vec<ComparisonRow>>> = CategoricalTrait::ALL
            .into_par_iter()
            .enumerate()
            .map(|(position, trait_)| {
                self.weighted_categorical_rows(trait_, position, weighted_a, weighted_b)
            })
            .collect();
        let numerical: Vec<Result<ComparisonRow>> = NumericalTrait::ALL
            .into_par_iter()
            .enumerate()
            .map(|(offset, trait_)| {
                let position = CategoricalTrait::ALL.len() + offset;
                self.weighted_numerical_row(trait_, position, weighted_a, weighted_b)
            })
            .collect();

        let mut report = Report::new();
        for rows in categorical {
            report.extend(rows?);
        }
        for row in numerical {
            report.push(row?);
        }

        info!(
            "Compared weighted groups of {} vs {} taxa (parallel): {} report rows",
            weighted_a.len(),
            weighted_b.len(),
            report.len()
        );
        Ok(report)
    }

    fn categorical_rows(
        &self,
        trait_: CategoricalTrait,
        records_a: &[&TaxonRecord],
        records_b: &[&TaxonRecord],
    ) -> Vec<ComparisonRow> {
        let variable = trait_.column_name();
        let values_a: Vec<Option<&str>> = records_a.iter().map(|r| r.categorical(trait_)).collect();
        let values_b: Vec<Option<&str>> = records_b.iter().map(|r| r.categorical(trait_)).collect();

        let distinct = distinct_values(&values_a, &values_b);
        debug!("Comparing {}: {} distinct values", variable, distinct.len());

        distinct
            .into_iter()
            .map(|value| {
                let result = compare_categorical(&Some(value), &values_a, &values_b, &self.config);
                ComparisonRow::categorical(variable, &self.config.dataset_label, value, result)
            })
            .collect()
    }

    fn numerical_row(
        &self,
        trait_: NumericalTrait,
        records_a: &[&TaxonRecord],
        records_b: &[&TaxonRecord],
    ) -> ComparisonRow {
        let variable = trait_.column_name();
        let values_a = numeric_values(trait_, records_a.iter().copied());
        let values_b = numeric_values(trait_, records_b.iter().copied());

        debug!("Comparing {}: {} vs {} values", variable, values_a.len(), values_b.len());
        let result = compare_numeric(&values_a, &values_b, &self.config);
        ComparisonRow::numerical(variable, &self.config.dataset_label, result)
    }

    fn weighted_categorical_rows(
        &self,
        trait_: CategoricalTrait,
        position: usize,
        weighted_a: &[(&TaxonRecord, f64)],
        weighted_b: &[(&TaxonRecord, f64)],
    ) -> Result<Vec<ComparisonRow>> {
        let variable = trait_.column_name();
        let values_a: Vec<Option<&str>> =
            weighted_a.iter().map(|(r, _)| r.categorical(trait_)).collect();
        let values_b: Vec<Option<&str>> =
            weighted_b.iter().map(|(r, _)| r.categorical(trait_)).collect();

        let distribution_a: WeightedValues<Option<&str>> =
            values_a.iter().copied().zip(weighted_a.iter().map(|(_, w)| *w)).collect();
        let distribution_b: WeightedValues<Option<&str>> =
            values_b.iter().copied().zip(weighted_b.iter().map(|(_, w)| *w)).collect();

        let distinct = distinct_values(&values_a, &values_b);
        debug!("Comparing {} (weighted): {} distinct values", variable, distinct.len());

        let mut rng = trait_rng(self.config.seed, position);
        distinct
            .into_iter()
            .map(|value| {
                let result = compare_categorical_abundances(
                    &Some(value),
                    &distribution_a,
                    &distribution_b,
                    &self.config,
                    &mut rng,
                )
                .map_err(|e| e.in_variable(variable))?;
                Ok(ComparisonRow::categorical(variable, &self.config.dataset_label, value, result))
            })
            .collect()
    }

    fn weighted_numerical_row(
        &self,
        trait_: NumericalTrait,
        position: usize,
        weighted_a: &[(&TaxonRecord, f64)],
        weighted_b: &[(&TaxonRecord, f64)],
    ) -> Result<ComparisonRow> {
        let variable = trait_.column_name();
        let distribution_a = numeric_distribution(trait_, weighted_a);
        let distribution_b = numeric_distribution(trait_, weighted_b);

        debug!(
            "Comparing {} (weighted): {} vs {} distinct values",
            variable,
            distribution_a.len(),
            distribution_b.len()
        );

        let mut rng = trait_rng(self.config.seed, position);
        let result = compare_numeric_abundances(&distribution_a, &distribution_b, &self.config, &mut rng)
            .map_err(|e| e.in_variable(variable))?;
        Ok(ComparisonRow::numerical(variable, &self.config.dataset_label, result))
    }
}

/// Weights must be finite and non-negative
fn validate_weights(weighted: &[(&TaxonRecord, f64)]) -> Result<()> {
    match weighted.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
        Some((record, weight)) => Err(ComparisonError::InvalidWeight {
            key: record.name.clone(),
            weight: *weight,
        }),
        None => Ok(()),
    }
}

/// Distinct non-missing values, first appearance over A then B
fn distinct_values<'v>(a: &[Option<&'v str>], b: &[Option<&'v str>]) -> SmallVec<[&'v str; 8]> {
    let mut distinct: SmallVec<[&'v str; 8]> = SmallVec::new();
    for value in a.iter().chain(b).flatten() {
        if !distinct.contains(value) {
            distinct.push(*value);
        }
    }
    distinct
}

/// Trait values with missing cells as NaN
fn numeric_values<'r>(trait_: NumericalTrait, records: impl Iterator<Item = &'r TaxonRecord>) -> Vec<f64> {
    records
        .map(|r| r.numerical(trait_).unwrap_or(f64::NAN))
        .collect()
}

/// Trait value → summed weight, missing cells merged under one NaN key
fn numeric_distribution(trait_: NumericalTrait, weighted: &[(&TaxonRecord, f64)]) -> WeightedValues<f64> {
    weighted
        .iter()
        .map(|(r, w)| (r.numerical(trait_).unwrap_or(f64::NAN), *w))
        .collect()
}
