// src/matching/money.rs
//! Monetary text normalization. Input lists carry limits and mortgage
//! amounts as free-form strings; comparisons need a numeric value.

/// Parses heterogeneous currency text into a comparable amount.
///
/// Keeps digits, `.`, and the `k`/`m` magnitude suffixes, drops everything
/// else, then scales the leading numeric portion by the suffix. Empty input
/// is 0. Anything with no numeric residue ("Two million Dollars") comes back
/// as NaN, which compares unequal to every amount including itself, so
/// unparseable money never equals a real value.
pub fn normalize_money(value: &str) -> f64 {
    if value.is_empty() {
        return 0.0;
    }

    let kept: String = value
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | 'k' | 'm'))
        .collect();

    if let Some(prefix) = kept.split_once('m').map(|(p, _)| p.to_string()) {
        leading_number(&prefix) * 1_000_000.0
    } else if let Some(prefix) = kept.split_once('k').map(|(p, _)| p.to_string()) {
        leading_number(&prefix) * 1_000.0
    } else {
        leading_number(&kept)
    }
}

/// Longest numeric prefix of `s` as f64, NaN if there is none.
fn leading_number(s: &str) -> f64 {
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        if c.is_ascii_digit() {
            end = i + 1;
        } else if c == '.' && !seen_dot {
            seen_dot = true;
            end = i + 1;
        } else {
            break;
        }
    }
    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}
