//! Numeric candidate extraction and per-parameter validation.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::registry::{ParameterDefinition, Registry};

#[expect(clippy::expect_used, reason = "literal pattern")]
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+\.\d+|\b\d+\b").expect("number pattern compiles"));

/// Numeric tokens in `line`, left to right, as raw substrings.
///
/// Raw text is kept so format rules can see the original digit layout
/// (`"4.10"` and `"4.1"` are different candidates).
#[must_use]
pub fn extract_numbers(line: &str) -> Vec<&str> {
    NUMBER.find_iter(line).map(|m| m.as_str()).collect()
}

/// Check a candidate against a parameter's format and inclusive range.
///
/// Missing rules are skipped. Text that does not parse as a number is
/// rejected rather than treated as an error.
#[must_use]
pub fn validate(parameter: &ParameterDefinition, text: &str) -> bool {
    if !parameter.format_matches(text) {
        trace!("{}: '{text}' rejected by format", parameter.name());
        return false;
    }

    let Ok(value) = text.parse::<f64>() else {
        trace!("{}: '{text}' is not a number", parameter.name());
        return false;
    };

    if let Some((min, max)) = parameter.range() {
        if value < min || value > max {
            trace!("{}: {value} outside [{min}, {max}]", parameter.name());
            return false;
        }
    }

    true
}

impl Registry {
    /// Validate `text` for the parameter called `name`; unknown names fail.
    #[must_use]
    pub fn validate(&self, name: &str, text: &str) -> bool {
        self.lookup(name).is_some_and(|p| validate(p, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry::with_defaults().unwrap_or_else(|e| panic!("defaults: {e}"))
    }

    #[test]
    fn extracts_in_order_of_appearance() {
        assert_eq!(
            extract_numbers("Creatinine 1.23 mgdL ref 0.70 1.30"),
            vec!["1.23", "0.70", "1.30"]
        );
        assert_eq!(extract_numbers("eGFR 58 mLmin1.73m2"), vec!["58"]);
    }

    #[test]
    fn decimal_needs_digits_after_point() {
        assert_eq!(extract_numbers("Iron 55. flagged"), vec!["55"]);
        assert_eq!(extract_numbers("no digits here"), Vec::<&str>::new());
    }

    #[test]
    fn digits_glued_to_letters_are_skipped() {
        // "CO2" carries no word boundary before the 2
        assert_eq!(extract_numbers("Carbon Dioxide CO2 24"), vec!["24"]);
    }

    #[test]
    fn format_is_matched_exactly() {
        let r = registry();
        assert!(r.validate("Creatinine", "1.23"));
        assert!(!r.validate("Creatinine", "1.2"));
        assert!(!r.validate("Creatinine", "1.234"));
        assert!(r.validate("Potassium", "4.1"));
        assert!(!r.validate("Potassium", "4"));
    }

    #[test]
    fn range_is_inclusive() {
        let r = registry();
        assert!(r.validate("Potassium", "2.5"));
        assert!(r.validate("Potassium", "6.5"));
        assert!(!r.validate("Potassium", "6.6"));
        assert!(!r.validate("Creatinine", "9.99"));
        assert!(r.validate("Creatinine", "5.00"));
    }

    #[test]
    fn missing_rules_are_permissive() {
        let r = registry();
        // Urine Albumin: no format, no range
        assert!(r.validate("Urine Albumin", "12345"));
        // Ferritin: range only
        assert!(r.validate("Ferritin", "250"));
        assert!(r.validate("Ferritin", "250.75"));
        assert!(!r.validate("Ferritin", "5"));
    }

    #[test]
    fn unparseable_or_unknown_is_rejected() {
        let r = registry();
        assert!(!r.validate("Urine Albumin", "1.2.3"));
        assert!(!r.validate("Sodium", "140"));
    }
}
