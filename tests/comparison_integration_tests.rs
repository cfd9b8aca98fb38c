//! Comparison Integration Tests
//!
//! Builds a small microbe directory (in memory and on disk) and runs full
//! reports through the public API.

use approx::assert_relative_eq;
use microbe_directory_rust::{
    Abundance, CategoricalTrait, ComparisonConfig, ComparisonError, DirectoryComparator,
    MicrobeDirectory, VariableType, CATEGORICAL_TRAITS, NUMERICAL_TRAITS,
};
use polars::prelude::*;
use std::collections::HashSet;
use std::fs;

const GROUP_A: &[&str] = &[
    "Bacillus subtilis",
    "Escherichia coli",
    "Staphylococcus aureus",
    "Escherichia coli",
];
const GROUP_B: &[&str] = &[
    "Prevotella copri",
    "Bacteroides fragilis",
    "Deinococcus radiodurans",
    "Thermus aquaticus",
];

fn directory_df() -> DataFrame {
    df![
        "species" => &[
            "Bacillus subtilis",
            "Escherichia coli",
            "Staphylococcus aureus",
            "Prevotella copri",
            "Bacteroides fragilis",
            "Deinococcus radiodurans",
            "Thermus aquaticus",
        ],
        "gram_stain" => &[Some("positive"), Some("negative"), Some("positive"), Some("negative"), Some("negative"), Some("positive"), Some("negative")],
        "microbiome_location" => &[Some("soil"), Some("gut"), Some("skin"), Some("gut"), Some("gut"), None, None],
        "antimicrobial_susceptibility" => &[Some("0"), Some("1"), Some("1"), None, Some("1"), None, None],
        "extreme_environment" => &[Some("0"), Some("0"), Some("0"), Some("0"), Some("0"), Some("1"), Some("1")],
        "biofilm_forming" => &[Some("1"), Some("1"), Some("1"), None, Some("1"), None, Some("0")],
        "animal_pathogen" => &[Some("0"), Some("1"), Some("1"), Some("0"), Some("1"), Some("0"), Some("0")],
        "spore_forming" => &[Some("1"), Some("0"), Some("0"), Some("0"), Some("0"), Some("0"), Some("0")],
        "plant_pathogen" => &[Some("0"), Some("0"), Some("0"), Some("0"), Some("0"), Some("0"), Some("0")],
        "optimal_temperature" => &[Some(30.0), Some(37.0), Some(37.0), Some(37.0), Some(37.0), Some(30.0), Some(70.0)],
        "optimal_ph" => &[Some(7.0), Some(7.0), Some(7.5), Some(6.5), Some(7.0), None, Some(8.0)],
        "pathogenicity" => &[Some(1.0), Some(2.0), Some(2.0), Some(1.0), Some(2.0), Some(0.0), Some(0.0)],
    ]
    .unwrap()
}

fn directory() -> MicrobeDirectory {
    MicrobeDirectory::from_dataframe(&directory_df(), "species").unwrap()
}

fn expected_row_count(directory: &MicrobeDirectory, a: &[&str], b: &[&str]) -> usize {
    let categorical: usize = CategoricalTrait::ALL
        .iter()
        .map(|&trait_| {
            a.iter()
                .chain(b)
                .filter_map(|name| directory.get(name).and_then(|r| r.categorical(trait_)))
                .collect::<HashSet<_>>()
                .len()
        })
        .sum();
    categorical + NUMERICAL_TRAITS.len()
}

#[test]
fn test_report_row_count_invariant() {
    let directory = directory();
    let comparator = DirectoryComparator::new(&directory, ComparisonConfig::default()).unwrap();

    let report = comparator.compare(GROUP_A, GROUP_B).unwrap();

    assert_eq!(report.len(), expected_row_count(&directory, GROUP_A, GROUP_B));

    // Categorical rows first in the fixed trait order, then numerical rows
    let order: Vec<&str> = report.iter().map(|r| r.variable.as_str()).collect();
    let mut seen: Vec<&str> = Vec::new();
    for variable in order {
        if seen.last() != Some(&variable) {
            seen.push(variable);
        }
    }
    let expected: Vec<&str> = CATEGORICAL_TRAITS.iter().chain(NUMERICAL_TRAITS.iter()).copied().collect();
    assert_eq!(seen, expected);

    for row in report.iter().rev().take(3) {
        assert_eq!(row.variable_type, VariableType::Numerical);
        assert_eq!(row.value, "mean");
    }
    for row in &report {
        assert_eq!(row.dataset, "df");
        assert!(row.p_value.is_nan() || (0.0..=1.0).contains(&row.p_value));
    }
}

#[test]
fn test_duplicate_taxa_count_twice() {
    let directory = directory();
    let comparator = DirectoryComparator::new(&directory, ComparisonConfig::default()).unwrap();

    let report = comparator.compare(GROUP_A, GROUP_B).unwrap();
    let negative = report
        .rows_for("gram_stain")
        .find(|r| r.value == "negative")
        .unwrap();

    // E. coli listed twice in group A
    match negative.abundance_in {
        Abundance::Frequencies(freqs) => {
            assert_relative_eq!(freqs.present, 2.0, epsilon = 1e-5);
            assert_relative_eq!(freqs.absent, 2.0, epsilon = 1e-5);
        }
        Abundance::Mean(_) => panic!("expected frequencies"),
    }
}

#[test]
fn test_identical_groups_numeric_p_one() {
    let directory = directory();
    let comparator = DirectoryComparator::new(&directory, ComparisonConfig::default()).unwrap();

    let group = ["Bacillus subtilis", "Escherichia coli", "Thermus aquaticus"];
    let report = comparator.compare(&group, &group).unwrap();

    let temperature = report.rows_for("optimal_temperature").next().unwrap();
    assert_relative_eq!(temperature.p_value, 1.0, epsilon = 1e-9);
}

#[test]
fn test_unknown_taxon_fails_fast() {
    let directory = directory();
    let comparator = DirectoryComparator::new(&directory, ComparisonConfig::default()).unwrap();

    let err = comparator
        .compare(&["Bacillus subtilis", "Bacillus anthracis"], GROUP_B)
        .unwrap_err();
    assert!(matches!(err, ComparisonError::TaxonNotFound(name) if name == "Bacillus anthracis"));

    let err = comparator
        .compare_weighted(&[("Bacillus subtilis", 1.0)], &[("bacillus subtilis", 1.0)])
        .unwrap_err();
    assert!(matches!(err, ComparisonError::TaxonNotFound(_)));
}

#[test]
fn test_parallel_matches_sequential() {
    let directory = directory();
    let comparator = DirectoryComparator::new(&directory, ComparisonConfig::default()).unwrap();

    let sequential = comparator.compare(GROUP_A, GROUP_B).unwrap();
    let parallel = comparator.compare_parallel(GROUP_A, GROUP_B).unwrap();

    assert_eq!(sequential.len(), parallel.len());
    for (s, p) in sequential.iter().zip(parallel.iter()) {
        assert_eq!(s.variable, p.variable);
        assert_eq!(s.value, p.value);
        assert_eq!(s.abundance_in, p.abundance_in);
        assert!(s.p_value == p.p_value || (s.p_value.is_nan() && p.p_value.is_nan()));
    }
}

#[test]
fn test_weighted_report_seeded() {
    let directory = directory();
    let config = ComparisonConfig { resample_size: 2_000, ..ComparisonConfig::seeded(42) };
    let comparator = DirectoryComparator::new(&directory, config).unwrap();

    let group_a = [("Bacillus subtilis", 0.4), ("Escherichia coli", 0.6)];
    let group_b = [("Prevotella copri", 0.5), ("Thermus aquaticus", 1.5)];

    let first = comparator.compare_weighted(&group_a, &group_b).unwrap();
    let second = comparator.compare_weighted(&group_a, &group_b).unwrap();
    let parallel = comparator.compare_weighted_parallel(&group_a, &group_b).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, parallel);

    let negative = first.rows_for("gram_stain").find(|r| r.value == "negative").unwrap();
    match (negative.abundance_in, negative.abundance_out) {
        (Abundance::Frequencies(a), Abundance::Frequencies(b)) => {
            assert_relative_eq!(a.present, 0.6, epsilon = 1e-5);
            assert_relative_eq!(a.absent, 0.4, epsilon = 1e-5);
            assert_relative_eq!(b.present, 2.0, epsilon = 1e-5);
            assert_relative_eq!(b.absent, 0.0, epsilon = 1e-5);
        }
        _ => panic!("expected frequencies"),
    }

    // 0.4 * 30 + 0.6 * 37 and (0.5 * 37 + 1.5 * 70) / 2
    let temperature = first.rows_for("optimal_temperature").next().unwrap();
    match (temperature.abundance_in, temperature.abundance_out) {
        (Abundance::Mean(a), Abundance::Mean(b)) => {
            assert_relative_eq!(a, 34.2, epsilon = 1e-12);
            assert_relative_eq!(b, 61.75, epsilon = 1e-12);
        }
        _ => panic!("expected means"),
    }
}

#[test]
fn test_compare_resolved_records() {
    let directory = directory();
    let config = ComparisonConfig { resample_size: 2_000, ..ComparisonConfig::seeded(9) };
    let comparator = DirectoryComparator::new(&directory, config).unwrap();

    let records_a = directory.resolve(GROUP_A).unwrap();
    let records_b = directory.resolve(GROUP_B).unwrap();

    let from_records = comparator.compare_records(&records_a, &records_b);
    assert_eq!(from_records.len(), expected_row_count(&directory, GROUP_A, GROUP_B));
    assert_eq!(
        from_records.rows_for("gram_stain").count(),
        comparator.compare(GROUP_A, GROUP_B).unwrap().rows_for("gram_stain").count()
    );
    assert_eq!(
        comparator.compare_records_parallel(&records_a, &records_b).len(),
        from_records.len()
    );

    let group_a = [("Bacillus subtilis", 0.4), ("Escherichia coli", 0.6)];
    let group_b = [("Prevotella copri", 0.5), ("Thermus aquaticus", 1.5)];
    let weighted_a = directory.resolve_weighted(&group_a).unwrap();
    let weighted_b = directory.resolve_weighted(&group_b).unwrap();

    let weighted = comparator.compare_weighted_records(&weighted_a, &weighted_b).unwrap();
    assert_eq!(weighted, comparator.compare_weighted(&group_a, &group_b).unwrap());
    assert_eq!(
        weighted,
        comparator.compare_weighted_records_parallel(&weighted_a, &weighted_b).unwrap()
    );

    let negative = [(weighted_a[0].0, -1.0)];
    let err = comparator.compare_weighted_records(&negative, &weighted_b).unwrap_err();
    assert!(matches!(err, ComparisonError::InvalidWeight { key, .. } if key == "Bacillus subtilis"));
}

#[test]
fn test_weighted_empty_group_fails() {
    let directory = directory();
    let comparator = DirectoryComparator::new(&directory, ComparisonConfig::seeded(1)).unwrap();

    let empty: [(&str, f64); 0] = [];
    let err = comparator
        .compare_weighted(&[("Bacillus subtilis", 1.0)], &empty)
        .unwrap_err();

    assert!(matches!(err, ComparisonError::Variable { ref variable, .. } if variable == "gram_stain"));
    assert!(matches!(err.root(), ComparisonError::EmptyDistribution { .. }));
}

#[test]
fn test_weighted_zero_total_weight_fails() {
    let directory = directory();
    let comparator = DirectoryComparator::new(&directory, ComparisonConfig::seeded(1)).unwrap();

    let result = comparator.compare_weighted_parallel(
        &[("Bacillus subtilis", 0.0), ("Escherichia coli", 0.0)],
        &[("Prevotella copri", 1.0)],
    );
    let err = result.unwrap_err();
    assert!(matches!(err.root(), ComparisonError::EmptyDistribution { group } if group == "group A"));
}

#[test]
fn test_load_csv_and_export() {
    let dir = std::env::temp_dir().join(format!("microbe_directory_it_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let csv_path = dir.join("microbe-directory.csv");
    fs::write(
        &csv_path,
        "species,genus,gram_stain,microbiome_location,antimicrobial_susceptibility,extreme_environment,biofilm_forming,animal_pathogen,spore_forming,plant_pathogen,optimal_temperature,optimal_ph,pathogenicity\n\
         Bacillus subtilis,Bacillus,positive,soil,0,0,1,0,1,0,30,7.0,1\n\
         Escherichia coli,Escherichia,negative,gut,1,0,1,1,0,0,37,7.0,2\n\
         Prevotella copri,Prevotella,negative,gut,,0,,0,0,0,37,6.5,1\n\
         Thermus aquaticus,Thermus,negative,,,1,0,0,0,0,70,8.0,0\n",
    )
    .unwrap();

    let config_path = dir.join("config.json");
    fs::write(&config_path, r#"{"dataset_label": "cheese", "seed": 3}"#).unwrap();
    let config = ComparisonConfig::load(&config_path).unwrap();

    let directory = MicrobeDirectory::load(&csv_path, &config).unwrap();
    assert_eq!(directory.len(), 4);
    assert_eq!(
        directory.get("Prevotella copri").unwrap().categorical(CategoricalTrait::AntimicrobialSusceptibility),
        None
    );

    let comparator = DirectoryComparator::new(&directory, config).unwrap();
    let report = comparator
        .compare(&["Bacillus subtilis", "Escherichia coli"], &["Prevotella copri", "Thermus aquaticus"])
        .unwrap();
    assert!(report.iter().all(|r| r.dataset == "cheese"));

    let df = report.to_dataframe().unwrap();
    assert_eq!(df.height(), report.len());
    assert_eq!(df.width(), 9);
    assert!(df.column("p-value").is_ok());

    let json = report.to_json().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), report.len());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_load_rejects_missing_trait_column() {
    let dir = std::env::temp_dir().join(format!("microbe_directory_cols_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let csv_path = dir.join("partial.csv");
    fs::write(&csv_path, "species,gram_stain\nBacillus subtilis,positive\n").unwrap();

    let err = MicrobeDirectory::load(&csv_path, &ComparisonConfig::default()).unwrap_err();
    assert!(matches!(err, ComparisonError::MissingColumn(_)));

    fs::remove_dir_all(&dir).ok();
}
