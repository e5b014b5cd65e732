// src/matching/exact.rs
//! Literal-duplicate detection. Runs before any model-backed comparison so
//! identical descriptions never cost a model call.

/// Lowercases, trims, and collapses internal whitespace runs to one space.
pub fn normalize_description(desc: &str) -> String {
    desc.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when both descriptions are identical after normalization.
pub fn is_exact_match(desc_a: &str, desc_b: &str) -> bool {
    normalize_description(desc_a) == normalize_description(desc_b)
}
