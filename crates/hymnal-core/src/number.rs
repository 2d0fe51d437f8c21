//! Catalog-number normalization.
//!
//! Hymn numbers are typed inconsistently ("S-38", "S 38", "s38", "S.38"),
//! so comparisons go through a canonical form: separators removed and the
//! remainder upper-cased.

/// Characters dropped during normalization, besides whitespace.
const SEPARATORS: &[char] = &['-', '.', '_'];

/// Canonicalize a raw catalog number.
///
/// Empty or whitespace-only input yields an empty string. The function is
/// idempotent.
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !SEPARATORS.contains(c))
        .flat_map(char::to_uppercase)
        .collect()
}

/// `true` when both numbers normalize to the same non-empty form.
#[must_use]
pub fn same_number(a: &str, b: &str) -> bool {
    let a = normalize(a);
    !a.is_empty() && a == normalize(b)
}

/// `true` when the normalized `needle` occurs inside the normalized
/// `haystack`. A needle that normalizes to nothing never matches.
#[must_use]
pub fn contains_number(haystack: &str, needle: &str) -> bool {
    let needle = normalize(needle);
    !needle.is_empty() && normalize(haystack).contains(&needle)
}
