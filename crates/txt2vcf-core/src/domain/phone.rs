use once_cell::sync::Lazy;
use regex::Regex;

/// Loose phone-number shape: optional `+`, optional country group, optional
/// parenthesized area group, then two more digit groups with `-`, `.` or
/// whitespace between them. Dates and short numbers match too.
pub static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+?(?:\d{1,3}[-.\s]?)?\(?[0-9]{1,4}\)?[-.\s]?[0-9]{1,4}[-.\s]?[0-9]{1,9}")
        .expect("invalid phone pattern")
});

/// Returns every phone-number-like slice of `text`, left to right and
/// non-overlapping. Matches are not normalized.
pub fn extract_phone_numbers(text: &str) -> Vec<&str> {
    PHONE_PATTERN
        .find_iter(text)
        .map(|found| found.as_str())
        .collect()
}
