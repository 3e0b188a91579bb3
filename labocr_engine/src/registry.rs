//! Parameter registry: the lab parameters the engine knows how to find.
//!
//! Definitions come from configuration (or [`default_parameters`]) as
//! [`ParameterDef`] and are compiled once into an immutable [`Registry`].

use labocr_core::ResultMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

use crate::normalize::normalize;

/// Registry load failure. Any of these aborts startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("registry has no parameters")]
    Empty,

    #[error("parameter #{0} has an empty name")]
    EmptyName(usize),

    #[error("duplicate parameter '{0}'")]
    DuplicateName(String),

    #[error("parameter '{0}' has no aliases")]
    NoAliases(String),

    #[error("alias '{alias}' of '{parameter}' is blank after normalization")]
    BlankAlias { parameter: String, alias: String },

    #[error("invalid format for '{parameter}': {message}")]
    InvalidFormat { parameter: String, message: String },

    #[error("invalid range for '{parameter}': [{min}, {max}]")]
    InvalidRange {
        parameter: String,
        min: String,
        max: String,
    },
}

/// Serializable parameter definition, as written in config files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDef {
    /// Canonical name, unique within a registry.
    pub name: String,

    /// Labels that may appear on a report, tried in order.
    pub aliases: Vec<String>,

    /// Regex the whole value text must match (anchoring is implicit).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Inclusive `[min, max]` bounds for the parsed value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<(f64, f64)>,
}

impl ParameterDef {
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            aliases: aliases.into_iter().map(Into::into).collect(),
            format: None,
            range: None,
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    #[must_use]
    pub const fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }

    fn build(&self, position: usize) -> Result<ParameterDefinition, RegistryError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(RegistryError::EmptyName(position));
        }
        if self.aliases.is_empty() {
            return Err(RegistryError::NoAliases(name.to_string()));
        }

        let alias_keys = self
            .aliases
            .iter()
            .map(|alias| {
                let key = normalize(alias).to_ascii_lowercase();
                if key.is_empty() {
                    Err(RegistryError::BlankAlias {
                        parameter: name.to_string(),
                        alias: alias.clone(),
                    })
                } else {
                    Ok(key)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let format = self
            .format
            .as_deref()
            .map(|pattern| Regex::new(&format!("^(?:{pattern})$")))
            .transpose()
            .map_err(|e| RegistryError::InvalidFormat {
                parameter: name.to_string(),
                message: e.to_string(),
            })?;

        if let Some((min, max)) = self.range {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(RegistryError::InvalidRange {
                    parameter: name.to_string(),
                    min: min.to_string(),
                    max: max.to_string(),
                });
            }
        }

        Ok(ParameterDefinition {
            name: name.to_string(),
            aliases: self.aliases.clone(),
            alias_keys,
            format,
            range: self.range,
        })
    }
}

/// Compiled, immutable parameter definition.
#[derive(Debug, Clone)]
pub struct ParameterDefinition {
    name: String,
    aliases: Vec<String>,
    /// Normalized, lowercased aliases, same order as `aliases`.
    alias_keys: Vec<String>,
    format: Option<Regex>,
    range: Option<(f64, f64)>,
}

impl ParameterDefinition {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub(crate) fn alias_keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases
            .iter()
            .map(String::as_str)
            .zip(self.alias_keys.iter().map(String::as_str))
    }

    /// The format pattern as written in the definition, without anchors.
    #[must_use]
    pub fn format(&self) -> Option<&str> {
        self.format.as_ref().map(|re| {
            let anchored = re.as_str();
            anchored
                .strip_prefix("^(?:")
                .and_then(|s| s.strip_suffix(")$"))
                .unwrap_or(anchored)
        })
    }

    #[must_use]
    pub const fn range(&self) -> Option<(f64, f64)> {
        self.range
    }

    pub(crate) fn format_matches(&self, text: &str) -> bool {
        self.format.as_ref().is_none_or(|re| re.is_match(text))
    }
}

/// Ordered set of parameter definitions.
///
/// Iteration order is registration order; the engine relies on it when
/// several parameters match the same line.
#[derive(Debug, Clone)]
pub struct Registry {
    parameters: Vec<ParameterDefinition>,
}

impl Registry {
    /// Compile definitions, rejecting the whole set on the first bad entry.
    ///
    /// # Errors
    /// Returns `RegistryError` for an empty set, empty or duplicate names,
    /// missing or blank aliases, invalid format patterns and inverted or
    /// non-finite ranges.
    pub fn from_defs(defs: &[ParameterDef]) -> Result<Self, RegistryError> {
        if defs.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::with_capacity(defs.len());
        let mut parameters = Vec::with_capacity(defs.len());
        for (position, def) in defs.iter().enumerate() {
            let parameter = def.build(position)?;
            if !seen.insert(parameter.name.clone()) {
                return Err(RegistryError::DuplicateName(parameter.name));
            }
            parameters.push(parameter);
        }

        debug!("Loaded {} lab parameters", parameters.len());
        Ok(Self { parameters })
    }

    /// Registry built from [`default_parameters`].
    ///
    /// # Errors
    /// Only fails if the built-in table is itself malformed.
    pub fn with_defaults() -> Result<Self, RegistryError> {
        Self::from_defs(&default_parameters())
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn all_parameters(&self) -> impl Iterator<Item = &ParameterDefinition> {
        self.parameters.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.parameters.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// A result map with one empty list per registered parameter.
    #[must_use]
    pub fn empty_result(&self) -> ResultMap {
        ResultMap::with_parameters(self.names())
    }
}

/// The built-in parameter table for kidney-care lab panels.
#[must_use]
pub fn default_parameters() -> Vec<ParameterDef> {
    vec![
        ParameterDef::new("Creatinine", ["Creatinine"])
            .with_format(r"\d+\.\d{2}")
            .with_range(0.5, 5.0),
        ParameterDef::new("eGFR", ["eGFR", "Glomerular Filtration Rate"])
            .with_format(r"\d{2}")
            .with_range(0.0, 150.0),
        ParameterDef::new("Potassium", ["Potassium", "K+"])
            .with_format(r"\d+\.\d")
            .with_range(2.5, 6.5),
        ParameterDef::new("Bicarb", ["Carbon Dioxide", "CO2", "Bicarb"])
            .with_format(r"\d{2}")
            .with_range(10.0, 40.0),
        ParameterDef::new("Intact PTH", ["Intact PTH", "PTH"])
            .with_format(r"\d{2}")
            .with_range(0.0, 150.0),
        ParameterDef::new("Vitamin D", ["Vitamin D"])
            .with_format(r"\d{2}\.\d")
            .with_range(10.0, 100.0),
        ParameterDef::new("Urine Protein", ["Urine Protein", "Protein, Urine"])
            .with_format(r"\d{2}\.\d")
            .with_range(0.0, 300.0),
        ParameterDef::new("Urine Creatinine", ["Urine Creatinine", "Creatinine, Urine"])
            .with_format(r"\d{2}\.\d")
            .with_range(0.0, 300.0),
        ParameterDef::new("Urine Albumin", ["Urine Albumin", "Albumin, Urine"]),
        ParameterDef::new("Hemoglobin", ["Hemoglobin", "Hgb"])
            .with_format(r"\d{2}\.\d")
            .with_range(5.0, 20.0),
        ParameterDef::new("Iron", ["Iron"])
            .with_format(r"\d{2}")
            .with_range(10.0, 300.0),
        ParameterDef::new("TIBC", ["TIBC", "Total Iron Binding Capacity"]).with_range(100.0, 600.0),
        ParameterDef::new("Ferritin", ["Ferritin"]).with_range(10.0, 1000.0),
    ]
}
