// src/models/matching.rs - Core types for the reconciliation pipeline
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One property record as loaded from an input list. The monetary fields
/// stay free-form text (`"$1.2M"`, `"1200000"`, `"Two million Dollars"`)
/// and are normalized on demand, never rewritten in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub description: String,
    pub limit: String,
    #[serde(rename = "mortgageAmount")]
    pub mortgage_amount: String,
}

/// Final status of a report entry, ordered by confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    Match,
    SimilarMatch,
    Mismatch,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Match => "Match",
            MatchStatus::SimilarMatch => "Similar Match",
            MatchStatus::Mismatch => "Mismatch",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of comparing one description pair. This is also the cache value
/// format: entries written by earlier runs must keep deserializing, so the
/// wire field names are frozen (`match`, `details`, `confidencePercentage`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "match")]
    pub is_match: bool,
    pub details: String,
    #[serde(
        rename = "confidencePercentage",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub confidence_percentage: Option<u8>,
}

/// One row of the final reconciliation report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub list_a_desc: String,
    pub list_b_desc: String,
    pub status: MatchStatus,
    pub details: String,
}

/// What one worker hands back: its report rows plus the list-B indices it
/// claimed. Consumed sets are merged by union only after every worker has
/// finished.
#[derive(Debug, Default)]
pub struct WorkerOutput {
    pub report: Vec<ReportEntry>,
    pub consumed: HashSet<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_record_uses_camel_case_mortgage_field() {
        let json = r#"{"description":"Retail Store","limit":"$1M","mortgageAmount":"800K"}"#;
        let record: PropertyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.mortgage_amount, "800K");

        let round_trip = serde_json::to_string(&record).unwrap();
        assert!(round_trip.contains("mortgageAmount"));
    }

    #[test]
    fn match_result_omits_absent_confidence() {
        let result = MatchResult {
            is_match: false,
            details: "comparison error".to_string(),
            confidence_percentage: None,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("confidencePercentage"));
        assert!(json.contains("\"match\":false"));
    }

    #[test]
    fn match_result_reads_legacy_entries_without_confidence() {
        let json = r#"{"match":true,"details":"Same building."}"#;
        let result: MatchResult = serde_json::from_str(json).unwrap();
        assert!(result.is_match);
        assert_eq!(result.confidence_percentage, None);
    }

    #[test]
    fn status_display_strings() {
        assert_eq!(MatchStatus::Match.as_str(), "Match");
        assert_eq!(MatchStatus::SimilarMatch.as_str(), "Similar Match");
        assert_eq!(MatchStatus::Mismatch.as_str(), "Mismatch");
    }
}
