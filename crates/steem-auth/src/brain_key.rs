//! Brain key normalization.

/// Trims `brain_key` and collapses every run of ASCII whitespace into one
/// space.
///
/// ```rust
/// use steem_auth::brain_key::normalize;
///
/// assert_eq!(normalize("  correct\thorse \n battery "), "correct horse battery");
/// ```
pub fn normalize(brain_key: &str) -> String {
    brain_key
        .split(|c: char| c.is_ascii_whitespace() || c == '\u{0b}')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
