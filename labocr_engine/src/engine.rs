//! Block-level extraction and cross-block merging.

use labocr_core::ResultMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::fuzzy::{MatchCandidate, score_keys};
use crate::normalize::normalize;
use crate::numeric::{extract_numbers, validate};
use crate::registry::{ParameterDefinition, Registry};

/// How long a parameter stays "found" after a value is recorded for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoundScope {
    /// At most one value per parameter per block.
    #[default]
    Block,
    /// Reset on every line; the per-block cap is the only limit.
    Line,
}

/// Matching policy knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineOptions {
    /// A line qualifies for an alias when its score is strictly above this.
    #[serde(default = "EngineOptions::default_match_threshold")]
    pub match_threshold: u8,

    /// Maximum values recorded per parameter within one block.
    #[serde(default = "EngineOptions::default_per_block_cap")]
    pub per_block_cap: usize,

    /// Maximum values per parameter after merging and deduplication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_cap: Option<usize>,

    #[serde(default)]
    pub found_scope: FoundScope,
}

impl EngineOptions {
    const fn default_match_threshold() -> u8 {
        80
    }

    const fn default_per_block_cap() -> usize {
        6
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            match_threshold: Self::default_match_threshold(),
            per_block_cap: Self::default_per_block_cap(),
            global_cap: None,
            found_scope: FoundScope::default(),
        }
    }
}

/// Extracts lab values from OCR text blocks against a shared registry.
///
/// Cheap to clone; every block gets its own found-set and partial result, so
/// one `Extractor` can serve any number of concurrent tasks.
#[derive(Debug, Clone)]
pub struct Extractor {
    registry: Arc<Registry>,
    options: EngineOptions,
}

impl Extractor {
    #[must_use]
    pub const fn new(registry: Arc<Registry>, options: EngineOptions) -> Self {
        Self { registry, options }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub const fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Extract the partial result for one OCR text block.
    ///
    /// Never fails: blank or garbled text yields an all-empty partial.
    #[must_use]
    pub fn process_block(&self, text: &str) -> ResultMap {
        let mut partial = self.registry.empty_result();
        let mut found: HashSet<&str> = HashSet::new();

        for raw in text.lines() {
            let line = normalize(raw);
            if line.is_empty() {
                continue;
            }
            let key = line.to_ascii_lowercase();

            if self.options.found_scope == FoundScope::Line {
                found.clear();
            }

            for parameter in self.registry.all_parameters() {
                let name = parameter.name();
                if found.contains(name) {
                    continue;
                }
                let Some(values) = partial.get_mut(name) else {
                    continue;
                };
                if values.len() >= self.options.per_block_cap {
                    continue;
                }

                if let Some(value) = self.match_line(parameter, &line, &key) {
                    debug!("{name}: recorded {value} from '{line}'");
                    values.push(value.to_string());
                    found.insert(name);
                }
            }
        }

        partial
    }

    /// Find the first alias of `parameter` that qualifies on `line` and return
    /// the first valid number on the line. A qualifying alias ends the alias
    /// search whether or not a value was found.
    fn match_line<'l>(
        &self,
        parameter: &ParameterDefinition,
        line: &'l str,
        key: &str,
    ) -> Option<&'l str> {
        for (alias, alias_key) in parameter.alias_keys() {
            let score = score_keys(key, alias_key);
            if score <= self.options.match_threshold {
                continue;
            }

            let candidate = MatchCandidate {
                parameter: parameter.name().to_string(),
                alias: alias.to_string(),
                score,
            };
            trace!(?candidate, "alias qualified");

            return extract_numbers(line)
                .into_iter()
                .find(|text| validate(parameter, text));
        }
        None
    }

    /// Merge partial results in the given order, dedupe per parameter and
    /// apply the optional global cap.
    #[must_use]
    pub fn merge<'a, I>(&self, partials: I) -> ResultMap
    where
        I: IntoIterator<Item = &'a ResultMap>,
    {
        let mut merged = self.registry.empty_result();
        for partial in partials {
            merged.extend_from(partial);
        }
        merged.dedup();
        if let Some(cap) = self.options.global_cap {
            merged.truncate_each(cap);
        }
        merged
    }

    /// Engine entry point: extract from every block and merge.
    ///
    /// Blocks are processed in parallel; merge order follows input order.
    #[must_use]
    pub fn extract_from_blocks<S>(&self, texts: &[S]) -> ResultMap
    where
        S: AsRef<str> + Sync,
    {
        let partials: Vec<ResultMap> = texts
            .par_iter()
            .map(|text| self.process_block(text.as_ref()))
            .collect();

        let merged = self.merge(&partials);
        debug!(
            "Extracted {} values from {} blocks",
            merged.total_values(),
            texts.len()
        );
        merged
    }
}
