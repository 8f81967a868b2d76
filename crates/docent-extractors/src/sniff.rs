//! Text vs. binary classification for files of unknown kind.

/// Content whose printable fraction is at or below this value is binary.
pub const BINARY_THRESHOLD: f64 = 0.8;

/// Fraction of characters that are printable ASCII or ASCII whitespace.
///
/// Empty input counts as fully printable.
pub fn printable_ratio(text: &str) -> f64 {
    let mut total = 0usize;
    let mut printable = 0usize;

    for c in text.chars() {
        total += 1;
        if matches!(c, ' '..='~' | '\n' | '\r' | '\t') {
            printable += 1;
        }
    }

    if total == 0 {
        return 1.0;
    }
    printable as f64 / total as f64
}

/// Classify decoded text as binary.
pub fn looks_binary(text: &str) -> bool {
    printable_ratio(text) <= BINARY_THRESHOLD
}
