//! Small text helpers for annotations and summaries.

use num_format::{Locale, ToFormattedString};

/// Number of decimal places in the shortest representation of `f`.
///
/// `2.0 -> 0`, `12.3456 -> 4`, `500.0 -> 0`.
pub fn count_n_decimals(f: f64) -> usize {
    if !f.is_finite() {
        return 0;
    }
    let s = f.to_string();
    match s.split_once('.') {
        Some((_, decimals)) => decimals.trim_end_matches('0').len(),
        None => 0,
    }
}

/// Strip the math-mode markup (`$`, `{`, `}`) from an annotation.
pub fn plain_text(expression: &str) -> String {
    expression
        .chars()
        .filter(|c| !matches!(c, '$' | '{' | '}'))
        .collect()
}

/// Annotation as drawn on a figure: markup stripped and the few TeX symbols
/// the expressions use replaced by their Unicode glyphs.
pub fn display_text(expression: &str) -> String {
    plain_text(expression)
        .replace("\\chi^2", "χ²")
        .replace("\\rho", "ρ")
        .replace("\\tau", "τ")
}

/// Thousands-separated count, e.g. `1,024`.
pub fn count_label(n: usize) -> String {
    n.to_formatted_string(&Locale::en)
}
