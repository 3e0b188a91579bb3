//! Alias scoring for OCR lines.
//!
//! The metric is deliberately crude: containment wins outright, anything else
//! falls back to positional character agreement from index 0.

use crate::normalize::normalize;

/// A parameter/alias pair that scored above the match threshold on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    pub parameter: String,
    pub alias: String,
    pub score: u8,
}

/// Score how well `line` names `alias`, in `0..=100`.
///
/// Both sides are normalized and compared case-insensitively.
#[must_use]
pub fn score(line: &str, alias: &str) -> u8 {
    score_keys(
        &normalize(line).to_ascii_lowercase(),
        &normalize(alias).to_ascii_lowercase(),
    )
}

/// Score two already normalized, lowercased strings.
pub(crate) fn score_keys(line: &str, alias: &str) -> u8 {
    if !alias.is_empty() && line.contains(alias) {
        return 100;
    }

    let overlap = line.len().min(alias.len());
    if overlap == 0 {
        return 0;
    }

    let matches = line
        .bytes()
        .zip(alias.bytes())
        .filter(|(a, b)| a == b)
        .count();

    // round(100 * matches / overlap), halves rounding up
    let pct = (200 * matches + overlap) / (2 * overlap);
    u8::try_from(pct).unwrap_or(100)
}
