//! End-to-end extraction over OCR text blocks.
//!
//! These tests verify that:
//! - Readings are matched by alias and validated by format and range
//! - Per-block caps and found-tracking bound what one block contributes
//! - Merging keeps every parameter key and removes repeated values

use labocr_core::ResultMap;
use labocr_engine::{EngineOptions, Extractor, FoundScope, ParameterDef, Registry};
use std::sync::Arc;

const PAGE_ONE: &str = "\
LABCORP  Patient Report   Page 1 of 2
Test                 Result   Flag   Units        Reference Interval
Creatinine, Serum    1.42     High   mg/dL        0.57-1.00
eGFR                 41       Low    mL/min/1.73  >59
Potassium, Serum     4.8             mmol/L       3.5-5.2
Carbon Dioxide, Total 22             mmol/L       20-29
Hemoglobin           11.2     Low    g/dL         11.1-15.9
";

const PAGE_TWO: &str = "\
~~ Iron Panel ~~
Iron, Serum          48              ug/dL        27-159
TIBC                 312             ug/dL        250-450
Ferritin, Serum      212      High   ng/mL        15-150
Vitamin D, 25-Hydroxy  31.4          ng/mL        30.0-100.0
PTH, Intact          88       High   pg/mL        15-65
Hemoglobin           11.2     Low    g/dL
";

#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
fn default_extractor(options: EngineOptions) -> Extractor {
    let registry = Registry::with_defaults().expect("built-in registry is valid");
    Extractor::new(Arc::new(registry), options)
}

fn values<'a>(result: &'a ResultMap, name: &str) -> Vec<&'a str> {
    result
        .get(name)
        .map(|v| v.iter().map(String::as_str).collect())
        .unwrap_or_default()
}

#[test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
fn test_two_parameter_block() {
    let registry = Registry::from_defs(&[
        ParameterDef::new("Creatinine", ["Creatinine"])
            .with_format(r"\d+\.\d{2}")
            .with_range(0.5, 5.0),
        ParameterDef::new("Potassium", ["Potassium"])
            .with_format(r"\d+\.\d")
            .with_range(2.5, 6.5),
        ParameterDef::new("Ferritin", ["Ferritin"]),
    ])
    .expect("valid definitions");
    let extractor = Extractor::new(Arc::new(registry), EngineOptions::default());

    let result = extractor.extract_from_blocks(&["Creatinine 1.23 mg/dL\nPotassium 4.1\n"]);

    assert_eq!(values(&result, "Creatinine"), vec!["1.23"]);
    assert_eq!(values(&result, "Potassium"), vec!["4.1"]);
    assert_eq!(values(&result, "Ferritin"), Vec::<&str>::new());
    assert_eq!(result.len(), 3);
}

#[test]
fn test_out_of_range_value_is_dropped() {
    let extractor = default_extractor(EngineOptions::default());
    let result = extractor.process_block("Creatinine 9.99");
    assert!(values(&result, "Creatinine").is_empty());
    assert_eq!(result.total_values(), 0);
}

#[test]
fn test_repeated_value_across_blocks_is_merged_once() {
    let extractor = default_extractor(EngineOptions::default());
    let result = extractor.extract_from_blocks(&["Hemoglobin 13.5", "Hemoglobin 13.5"]);
    assert_eq!(values(&result, "Hemoglobin"), vec!["13.5"]);
}

#[test]
fn test_symbol_alias_matches_after_normalization() {
    let extractor = default_extractor(EngineOptions::default());
    let result = extractor.process_block("K+ 4.1");
    assert_eq!(values(&result, "Potassium"), vec!["4.1"]);
    assert_eq!(result.total_values(), 1);
}

#[test]
fn test_empty_block_yields_every_key_empty() {
    let extractor = default_extractor(EngineOptions::default());
    let result = extractor.process_block("");
    assert_eq!(result.len(), extractor.registry().len());
    assert!(result.iter().all(|(_, v)| v.is_empty()));
}

#[test]
fn test_block_scope_records_one_value_per_parameter() {
    let extractor = default_extractor(EngineOptions::default());
    let text = (1..=7)
        .map(|i| format!("Hemoglobin 12.{i}"))
        .collect::<Vec<_>>()
        .join("\n");
    let result = extractor.process_block(&text);
    assert_eq!(values(&result, "Hemoglobin"), vec!["12.1"]);
}

#[test]
fn test_line_scope_stops_at_block_cap() {
    let extractor = default_extractor(EngineOptions {
        found_scope: FoundScope::Line,
        ..EngineOptions::default()
    });
    let text = (1..=7)
        .map(|i| format!("Hemoglobin 12.{i}"))
        .collect::<Vec<_>>()
        .join("\n");
    let result = extractor.process_block(&text);
    assert_eq!(
        values(&result, "Hemoglobin"),
        vec!["12.1", "12.2", "12.3", "12.4", "12.5", "12.6"]
    );
}

#[test]
fn test_cap_holds_for_every_parameter() {
    let extractor = default_extractor(EngineOptions {
        found_scope: FoundScope::Line,
        ..EngineOptions::default()
    });
    let text = (10..40)
        .map(|i| format!("Iron {i}\nTIBC {}\nFerritin {}", i * 10, i * 20))
        .collect::<Vec<_>>()
        .join("\r\n");
    let result = extractor.process_block(&text);
    for (name, found) in result.iter() {
        assert!(found.len() <= 6, "{name} has {} values", found.len());
    }
    assert_eq!(values(&result, "Iron").len(), 6);
}

#[test]
fn test_realistic_report_pages() {
    let extractor = default_extractor(EngineOptions::default());
    let result = extractor.extract_from_blocks(&[PAGE_ONE, PAGE_TWO]);

    let expected = [
        ("Creatinine", vec!["1.42"]),
        ("eGFR", vec!["41"]),
        ("Potassium", vec!["4.8"]),
        ("Bicarb", vec!["22"]),
        ("Intact PTH", vec!["88"]),
        ("Vitamin D", vec!["31.4"]),
        ("Hemoglobin", vec!["11.2"]),
        ("Iron", vec!["48"]),
        ("TIBC", vec!["312"]),
        ("Ferritin", vec!["212"]),
    ];
    for (name, want) in expected {
        assert_eq!(values(&result, name), want, "parameter {name}");
    }
    assert!(values(&result, "Urine Albumin").is_empty());
    assert_eq!(result.total_values(), 10);
}

#[test]
fn test_processing_is_deterministic() {
    let extractor = default_extractor(EngineOptions::default());
    let first = extractor.process_block(PAGE_ONE);
    for _ in 0..5 {
        assert_eq!(extractor.process_block(PAGE_ONE), first);
    }
}

#[test]
fn test_merge_has_no_repeated_values() {
    let extractor = default_extractor(EngineOptions {
        found_scope: FoundScope::Line,
        ..EngineOptions::default()
    });
    let blocks = [
        "Iron 48\nIron 52\nIron 48",
        "Iron 52\nIron 60",
        PAGE_TWO,
        PAGE_TWO,
    ];
    let result = extractor.extract_from_blocks(&blocks);
    for (name, found) in result.iter() {
        let mut unique = found.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), found.len(), "{name} has repeats");
    }
    assert_eq!(values(&result, "Iron"), vec!["48", "52", "60"]);
}

#[test]
fn test_no_blocks_still_returns_every_parameter() {
    let extractor = default_extractor(EngineOptions::default());
    let result = extractor.extract_from_blocks::<String>(&[]);
    let names: Vec<&str> = result.names().collect();
    let registered: Vec<&str> = extractor.registry().names().collect();
    assert_eq!(names, registered);
}
