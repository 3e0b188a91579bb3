//! Parameter → extracted values mapping.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashSet;
use std::fmt::Write as _;

/// Extracted values keyed by parameter name.
///
/// Keys are fixed at construction and keep that order; every key is present
/// even when no value was found for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMap {
    entries: Vec<(String, Vec<String>)>,
}

impl ResultMap {
    /// Create a map with one empty list per parameter name.
    #[must_use]
    pub fn with_parameters<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: names
                .into_iter()
                .map(|name| (name.into(), Vec::new()))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Vec<String>> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, values)| values)
    }

    /// Append a value under `name`. Returns `false` for an unknown key.
    pub fn push(&mut self, name: &str, value: impl Into<String>) -> bool {
        self.get_mut(name).is_some_and(|values| {
            values.push(value.into());
            true
        })
    }

    /// Append every value of `other` under the matching key of `self`.
    /// Keys unknown to `self` are ignored.
    pub fn extend_from(&mut self, other: &Self) {
        for (name, values) in &other.entries {
            if let Some(target) = self.get_mut(name) {
                target.extend(values.iter().cloned());
            }
        }
    }

    /// Drop repeated values per parameter, keeping the first occurrence.
    pub fn dedup(&mut self) {
        for (_, values) in &mut self.entries {
            let mut seen = HashSet::with_capacity(values.len());
            values.retain(|v| seen.insert(v.clone()));
        }
    }

    /// Keep at most `cap` values per parameter.
    pub fn truncate_each(&mut self, cap: usize) {
        for (_, values) in &mut self.entries {
            values.truncate(cap);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of parameters (keys), not values.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn total_values(&self) -> usize {
        self.entries.iter().map(|(_, values)| values.len()).sum()
    }

    /// Render as a two-column text table, values comma-joined.
    #[must_use]
    pub fn render_table(&self) -> String {
        let width = self
            .entries
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max("Parameter".len());

        let mut out = String::new();
        let _ = writeln!(out, "{:<width$}  Values", "Parameter");
        let _ = writeln!(out, "{}  {}", "-".repeat(width), "-".repeat(6));
        for (name, values) in &self.entries {
            let _ = writeln!(out, "{name:<width$}  {}", values.join(", "));
        }
        out
    }
}

impl Serialize for ResultMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, values) in &self.entries {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultMap {
        ResultMap::with_parameters(["Creatinine", "Potassium"])
    }

    #[test]
    fn every_key_present_when_empty() {
        let map = sample();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("Creatinine"), Some(&[][..]));
        assert_eq!(map.total_values(), 0);
    }

    #[test]
    fn push_rejects_unknown_key() {
        let mut map = sample();
        assert!(map.push("Potassium", "4.1"));
        assert!(!map.push("Sodium", "140"));
        assert_eq!(map.total_values(), 1);
    }

    #[test]
    fn dedup_keeps_first_seen_order() {
        let mut map = sample();
        for v in ["1.20", "1.31", "1.20", "1.05", "1.31"] {
            map.push("Creatinine", v);
        }
        map.dedup();
        assert_eq!(
            map.get("Creatinine"),
            Some(&["1.20".to_string(), "1.31".to_string(), "1.05".to_string()][..])
        );
    }

    #[test]
    fn serializes_in_key_order() {
        let mut map = sample();
        map.push("Potassium", "4.1");
        let json = serde_json::to_string(&map).unwrap_or_default();
        assert_eq!(json, r#"{"Creatinine":[],"Potassium":["4.1"]}"#);
    }

    #[test]
    fn table_joins_values_with_commas() {
        let mut map = sample();
        map.push("Potassium", "4.1");
        map.push("Potassium", "3.9");
        let table = map.render_table();
        assert!(table.contains("Potassium   4.1, 3.9"));
        assert!(table.lines().next().is_some_and(|l| l.starts_with("Parameter")));
    }
}
