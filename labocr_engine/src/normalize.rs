/// Strip OCR noise from a line: keep ASCII letters, digits, `.`, `,` and
/// spaces, then trim.
#[must_use]
pub fn normalize(line: &str) -> String {
    line.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | ',' | ' '))
        .collect::<String>()
        .trim()
        .to_string()
}
