// src/matching/classify.rs
use crate::models::matching::MatchStatus;

/// Confidence at or above this is a full match.
pub const MATCH_CONFIDENCE_THRESHOLD: u8 = 80;
/// Confidence at or above this (but below the match threshold) is a similar
/// match; below it the pair is a mismatch. Also the floor at which the
/// comparator marks a result `match = true`.
pub const SIMILAR_CONFIDENCE_THRESHOLD: u8 = 45;

/// Maps a 0-100 confidence percentage onto a match status. Boundary values
/// belong to the higher bucket.
pub fn classify_confidence(confidence: u8) -> MatchStatus {
    if confidence >= MATCH_CONFIDENCE_THRESHOLD {
        MatchStatus::Match
    } else if confidence >= SIMILAR_CONFIDENCE_THRESHOLD {
        MatchStatus::SimilarMatch
    } else {
        MatchStatus::Mismatch
    }
}
