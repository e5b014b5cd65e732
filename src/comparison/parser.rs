// src/comparison/parser.rs
//! Pure parsing of model completions into per-pair confidence results.
//! Kept free of I/O so crafted response strings can be tested directly.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::PairId;

pub const NO_EXPLANATION: &str = "No explanation provided";

// Expected line shape: `Item <i>.<j>: <percent>%. <rationale>`
static STRICT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Item\s+(\d+)\.(\d+):\s*(\d{1,3})%\.\s*(.*)$").unwrap());
// Fallback: any line tagged with an item identifier somewhere
static LOOSE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"Item\s+(\d+)\.(\d+)").unwrap());
static LOOSE_PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,3})\s*%").unwrap());

/// Confidence and rationale recovered from one response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedComparison {
    pub confidence: u8,
    pub details: String,
}

/// Parses a completion line by line. Each line is tried against the strict
/// format first, then against a looser tag-plus-first-percentage pattern.
/// Lines matching neither are dropped; the first parsed line wins when an
/// identifier repeats. Callers treat absent identifiers as "no comparison
/// result available".
pub fn parse_comparison_response(text: &str) -> HashMap<PairId, ParsedComparison> {
    let mut results = HashMap::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((id, parsed)) = parse_strict(line).or_else(|| parse_loose(line)) {
            results.entry(id).or_insert(parsed);
        }
    }

    results
}

fn parse_strict(line: &str) -> Option<(PairId, ParsedComparison)> {
    let caps = STRICT_LINE.captures(line)?;
    let id = PairId {
        item: caps[1].parse().ok()?,
        candidate: caps[2].parse().ok()?,
    };
    let confidence = parse_percent(&caps[3])?;
    let rationale = caps[4].trim();
    let details = if rationale.is_empty() {
        NO_EXPLANATION.to_string()
    } else {
        rationale.to_string()
    };
    Some((id, ParsedComparison { confidence, details }))
}

fn parse_loose(line: &str) -> Option<(PairId, ParsedComparison)> {
    let tag = LOOSE_TAG.captures(line)?;
    let id = PairId {
        item: tag[1].parse().ok()?,
        candidate: tag[2].parse().ok()?,
    };

    let percent = LOOSE_PERCENT.captures(line)?;
    let confidence = parse_percent(&percent[1])?;

    let rest_start = percent.get(0).map(|m| m.end()).unwrap_or(line.len());
    let rationale = line[rest_start..]
        .trim_start_matches(|c: char| c == '.' || c == ':' || c == ' ')
        .trim();
    let details = if rationale.is_empty() {
        NO_EXPLANATION.to_string()
    } else {
        rationale.to_string()
    };
    Some((id, ParsedComparison { confidence, details }))
}

fn parse_percent(digits: &str) -> Option<u8> {
    let value: u32 = digits.parse().ok()?;
    Some(value.min(100) as u8)
}
