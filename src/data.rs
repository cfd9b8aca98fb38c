//! Microbe Directory Loading and Lookup
//!
//! Loads the microbe directory (taxon → trait annotations) with Polars and
//! indexes it by taxon name. The table is built once, never mutated, and
//! shared by reference with every comparison.
//!
//! Only the index column and the 11 trait columns are read; everything else
//! in the source file is projected away before materialization.

use polars::prelude::*;
use rustc_hash::FxHashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::config::ComparisonConfig;
use crate::error::{ComparisonError, Result};
use crate::utils::{materialize_with_columns, require_columns};

/// Nominal trait columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalTrait {
    GramStain,
    MicrobiomeLocation,
    AntimicrobialSusceptibility,
    ExtremeEnvironment,
    BiofilmForming,
    AnimalPathogen,
    SporeForming,
    PlantPathogen,
}

impl CategoricalTrait {
    /// Report order
    pub const ALL: [CategoricalTrait; 8] = [
        CategoricalTrait::GramStain,
        CategoricalTrait::MicrobiomeLocation,
        CategoricalTrait::AntimicrobialSusceptibility,
        CategoricalTrait::ExtremeEnvironment,
        CategoricalTrait::BiofilmForming,
        CategoricalTrait::AnimalPathogen,
        CategoricalTrait::SporeForming,
        CategoricalTrait::PlantPathogen,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            CategoricalTrait::GramStain => "gram_stain",
            CategoricalTrait::MicrobiomeLocation => "microbiome_location",
            CategoricalTrait::AntimicrobialSusceptibility => "antimicrobial_susceptibility",
            CategoricalTrait::ExtremeEnvironment => "extreme_environment",
            CategoricalTrait::BiofilmForming => "biofilm_forming",
            CategoricalTrait::AnimalPathogen => "animal_pathogen",
            CategoricalTrait::SporeForming => "spore_forming",
            CategoricalTrait::PlantPathogen => "plant_pathogen",
        }
    }

    fn position(self) -> usize {
        self as usize
    }
}

/// Floating-point trait columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericalTrait {
    OptimalTemperature,
    OptimalPh,
    Pathogenicity,
}

impl NumericalTrait {
    /// Report order
    pub const ALL: [NumericalTrait; 3] = [
        NumericalTrait::OptimalTemperature,
        NumericalTrait::OptimalPh,
        NumericalTrait::Pathogenicity,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            NumericalTrait::OptimalTemperature => "optimal_temperature",
            NumericalTrait::OptimalPh => "optimal_ph",
            NumericalTrait::Pathogenicity => "pathogenicity",
        }
    }

    fn position(self) -> usize {
        self as usize
    }
}

pub const CATEGORICAL_TRAITS: [&str; 8] = [
    "gram_stain",
    "microbiome_location",
    "antimicrobial_susceptibility",
    "extreme_environment",
    "biofilm_forming",
    "animal_pathogen",
    "spore_forming",
    "plant_pathogen",
];

pub const NUMERICAL_TRAITS: [&str; 3] = ["optimal_temperature", "optimal_ph", "pathogenicity"];

/// One directory row
#[derive(Debug, Clone, PartialEq)]
pub struct TaxonRecord {
    pub name: String,
    categorical: [Option<String>; 8],
    numerical: [Option<f64>; 3],
}

impl TaxonRecord {
    pub fn new(
        name: impl Into<String>,
        categorical: [Option<String>; 8],
        numerical: [Option<f64>; 3],
    ) -> Self {
        Self {
            name: name.into(),
            categorical,
            numerical,
        }
    }

    /// Categorical value, `None` when the cell is null
    pub fn categorical(&self, trait_: CategoricalTrait) -> Option<&str> {
        self.categorical[trait_.position()].as_deref()
    }

    /// Numerical value, `None` when the cell is null or NaN
    pub fn numerical(&self, trait_: NumericalTrait) -> Option<f64> {
        self.numerical[trait_.position()]
    }
}

/// Immutable taxon-indexed trait table
#[derive(Debug, Clone, Default)]
pub struct MicrobeDirectory {
    records: Vec<TaxonRecord>,
    index: FxHashMap<String, usize>,
}

impl MicrobeDirectory {
    /// Load the directory from CSV, or Parquet when the extension says so
    pub fn load(path: &Path, config: &ComparisonConfig) -> Result<Self> {
        let lazy = match path.extension().and_then(|ext| ext.to_str()) {
            Some("parquet") => LazyFrame::scan_parquet(path, Default::default())?,
            _ => LazyCsvReader::new(path)
                .with_has_header(true)
                .with_infer_schema_length(Some(10_000))
                .finish()?,
        };

        let columns = Self::required_columns(&config.index_column);
        let df = materialize_with_columns(&lazy, &columns)?;
        let directory = Self::from_dataframe(&df, &config.index_column)?;

        info!(
            "Loaded microbe directory from {}: {} taxa",
            path.display(),
            directory.len()
        );

        Ok(directory)
    }

    /// Build the directory from an already-materialized DataFrame
    ///
    /// Categorical columns are cast to strings and numerical columns to f64
    /// whatever dtype they were read as; unparseable cells become missing.
    pub fn from_dataframe(df: &DataFrame, index_column: &str) -> Result<Self> {
        require_columns(df, &Self::required_columns(index_column))?;

        let names_col = df.column(index_column)?.cast(&DataType::String)?;
        let names = names_col.str()?;

        let categorical_cols = CategoricalTrait::ALL
            .iter()
            .map(|t| df.column(t.column_name()).and_then(|c| c.cast(&DataType::String)))
            .collect::<PolarsResult<Vec<Column>>>()?;
        let categorical_values = categorical_cols
            .iter()
            .map(|c| c.str())
            .collect::<PolarsResult<Vec<&StringChunked>>>()?;

        let numerical_cols = NumericalTrait::ALL
            .iter()
            .map(|t| df.column(t.column_name()).and_then(|c| c.cast(&DataType::Float64)))
            .collect::<PolarsResult<Vec<Column>>>()?;
        let numerical_values = numerical_cols
            .iter()
            .map(|c| c.f64())
            .collect::<PolarsResult<Vec<&Float64Chunked>>>()?;

        let mut directory = MicrobeDirectory::default();
        let mut skipped = 0usize;

        for idx in 0..df.height() {
            let Some(name) = names.get(idx) else {
                skipped += 1;
                continue;
            };

            let categorical: [Option<String>; 8] =
                std::array::from_fn(|i| categorical_values[i].get(idx).map(str::to_string));
            let numerical: [Option<f64>; 3] =
                std::array::from_fn(|i| numerical_values[i].get(idx).filter(|v| !v.is_nan()));

            directory.insert(TaxonRecord::new(name, categorical, numerical))?;
        }

        if skipped > 0 {
            warn!("Skipped {} directory rows with no '{}' value", skipped, index_column);
        }

        Ok(directory)
    }

    /// Build the directory from records (names must be unique)
    pub fn from_records(records: impl IntoIterator<Item = TaxonRecord>) -> Result<Self> {
        let mut directory = MicrobeDirectory::default();
        for record in records {
            directory.insert(record)?;
        }
        Ok(directory)
    }

    fn insert(&mut self, record: TaxonRecord) -> Result<()> {
        if self.index.contains_key(&record.name) {
            return Err(ComparisonError::DuplicateTaxon(record.name));
        }
        self.index.insert(record.name.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    fn required_columns(index_column: &str) -> Vec<&str> {
        std::iter::once(index_column)
            .chain(CATEGORICAL_TRAITS)
            .chain(NUMERICAL_TRAITS)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Exact, case-sensitive lookup
    pub fn get(&self, name: &str) -> Option<&TaxonRecord> {
        self.index.get(name).map(|&idx| &self.records[idx])
    }

    /// Taxon names in load order
    pub fn taxa(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    /// Resolve a taxa list, failing on the first unknown name
    ///
    /// Records come back in input order; repeated names repeat their record.
    pub fn resolve<S: AsRef<str>>(&self, taxa: &[S]) -> Result<Vec<&TaxonRecord>> {
        taxa.iter()
            .map(|name| {
                let name = name.as_ref();
                self.get(name)
                    .ok_or_else(|| ComparisonError::TaxonNotFound(name.to_string()))
            })
            .collect()
    }

    /// Resolve a weighted taxa list, attaching each taxon's weight to its record
    pub fn resolve_weighted<S: AsRef<str>>(
        &self,
        taxa: &[(S, f64)],
    ) -> Result<Vec<(&TaxonRecord, f64)>> {
        taxa.iter()
            .map(|(name, weight)| {
                let name = name.as_ref();
                self.get(name)
                    .map(|record| (record, *weight))
                    .ok_or_else(|| ComparisonError::TaxonNotFound(name.to_string()))
            })
            .collect()
    }
}
