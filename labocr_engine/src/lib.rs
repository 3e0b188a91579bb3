#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Lab value extraction from OCR text.
//!
//! A [`Registry`] describes the known lab parameters. An [`Extractor`] scans
//! each OCR'd text block line by line, fuzzy-matches lines against parameter
//! aliases, pulls the first valid number from a matching line and merges the
//! per-block results into one deduplicated [`labocr_core::ResultMap`].

pub mod analyzer;
pub mod engine;
pub mod fuzzy;
pub mod normalize;
pub mod numeric;
pub mod registry;

pub use analyzer::{AnalysisReport, AnalyzeError, Analyzer};
pub use engine::{EngineOptions, Extractor, FoundScope};
pub use fuzzy::{MatchCandidate, score};
pub use normalize::normalize;
pub use numeric::extract_numbers;
pub use registry::{ParameterDef, ParameterDefinition, Registry, RegistryError, default_parameters};
