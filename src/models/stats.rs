// src/models/stats.rs
use crate::models::matching::{MatchStatus, ReportEntry};

/// Per-status row counts for the pipeline summary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MatchStats {
    pub matches: usize,
    pub similar_matches: usize,
    pub mismatches: usize,
}

impl MatchStats {
    pub fn from_report(entries: &[ReportEntry]) -> Self {
        let mut stats = Self::default();
        for entry in entries {
            match entry.status {
                MatchStatus::Match => stats.matches += 1,
                MatchStatus::SimilarMatch => stats.similar_matches += 1,
                MatchStatus::Mismatch => stats.mismatches += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.matches + self.similar_matches + self.mismatches
    }
}
