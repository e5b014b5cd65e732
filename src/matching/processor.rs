// src/matching/processor.rs
use anyhow::Result;
use log::debug;
use std::collections::HashSet;
use std::sync::Arc;

use crate::comparison::{CachedComparator, ComparisonPair, PairId};
use crate::matching::candidates::{build_batch, ItemCandidates};
use crate::matching::classify::{classify_confidence, SIMILAR_CONFIDENCE_THRESHOLD};
use crate::matching::money::normalize_money;
use crate::models::matching::{MatchResult, MatchStatus, PropertyRecord, ReportEntry};

/// Details text for a list entry that found no counterpart at all.
pub const NO_CORRESPONDING_PROPERTY: &str = "No corresponding property found";

const NO_RESULT_DETAILS: &str = "No comparison result available";

/// Resolves chunks of list-A records against list B, exact matches first,
/// then one model round per sub-batch for whatever remains.
pub struct BatchProcessor {
    comparator: Arc<CachedComparator>,
    sub_batch_size: usize,
}

impl BatchProcessor {
    pub fn new(comparator: Arc<CachedComparator>, sub_batch_size: usize) -> Self {
        Self {
            comparator,
            sub_batch_size: sub_batch_size.max(1),
        }
    }

    /// Processes one chunk of a worker's slice. `consumed` is the worker's
    /// running set of claimed list-B indices; indices claimed by earlier
    /// sub-batches are never offered again within this worker.
    pub async fn process(
        &self,
        chunk: &[PropertyRecord],
        list_b: &[PropertyRecord],
        consumed: &mut HashSet<usize>,
    ) -> Result<Vec<ReportEntry>> {
        let mut report = Vec::with_capacity(chunk.len());
        for sub_chunk in chunk.chunks(self.sub_batch_size) {
            self.process_sub_batch(sub_chunk, list_b, consumed, &mut report)
                .await?;
        }
        Ok(report)
    }

    async fn process_sub_batch(
        &self,
        sub_chunk: &[PropertyRecord],
        list_b: &[PropertyRecord],
        consumed: &mut HashSet<usize>,
        report: &mut Vec<ReportEntry>,
    ) -> Result<()> {
        let batch = build_batch(sub_chunk, list_b, consumed);
        let mut entries: Vec<Option<ReportEntry>> = vec![None; sub_chunk.len()];

        // Exact matches settle without the model and are consumed eagerly,
        // so an earlier item in the sub-batch can claim a candidate out from
        // under a later one.
        let mut fuzzy_items: Vec<&ItemCandidates> = Vec::new();
        for item in &batch.items {
            let record = &sub_chunk[item.item_index];
            match item.exact.iter().find(|b| !consumed.contains(*b)) {
                Some(&b_index) => {
                    consumed.insert(b_index);
                    entries[item.item_index] = Some(exact_entry(record, &list_b[b_index]));
                }
                None => fuzzy_items.push(item),
            }
        }

        let pairs = fuzzy_pairs(sub_chunk, &fuzzy_items, list_b);
        debug!(
            "Sub-batch of {}: {} exact-resolved, {} items with {} fuzzy pairs",
            sub_chunk.len(),
            sub_chunk.len() - fuzzy_items.len(),
            fuzzy_items.len(),
            pairs.len()
        );

        // A sub-batch with no fuzzy candidates left never reaches the model.
        let results = if pairs.is_empty() {
            Vec::new()
        } else {
            self.comparator.compare(&pairs).await?
        };

        let mut cursor = 0;
        for item in &fuzzy_items {
            let item_results = &results[cursor..cursor + item.fuzzy.len()];
            cursor += item.fuzzy.len();
            let record = &sub_chunk[item.item_index];
            entries[item.item_index] =
                Some(resolve_fuzzy_item(record, item, item_results, list_b, consumed));
        }

        report.extend(entries.into_iter().flatten());
        Ok(())
    }
}

fn fuzzy_pairs(
    sub_chunk: &[PropertyRecord],
    fuzzy_items: &[&ItemCandidates],
    list_b: &[PropertyRecord],
) -> Vec<ComparisonPair> {
    let mut pairs = Vec::new();
    for (item_no, item) in fuzzy_items.iter().enumerate() {
        let record = &sub_chunk[item.item_index];
        for (candidate_no, &b_index) in item.fuzzy.iter().enumerate() {
            pairs.push(ComparisonPair {
                id: PairId {
                    item: item_no + 1,
                    candidate: candidate_no + 1,
                },
                desc_a: record.description.clone(),
                desc_b: list_b[b_index].description.clone(),
            });
        }
    }
    pairs
}

/// Picks the first candidate the model affirmed, re-checking consumption at
/// pick time. Earlier candidates always win over higher-scoring later ones.
fn resolve_fuzzy_item(
    record: &PropertyRecord,
    item: &ItemCandidates,
    results: &[Option<MatchResult>],
    list_b: &[PropertyRecord],
    consumed: &mut HashSet<usize>,
) -> ReportEntry {
    if item.fuzzy.is_empty() {
        return ReportEntry {
            list_a_desc: record.description.clone(),
            list_b_desc: String::new(),
            status: MatchStatus::Mismatch,
            details: NO_CORRESPONDING_PROPERTY.to_string(),
        };
    }

    for (&b_index, result) in item.fuzzy.iter().zip(results) {
        if let Some(result) = result {
            if !result.is_match || consumed.contains(&b_index) {
                continue;
            }

            let candidate = &list_b[b_index];
            let confidence = result
                .confidence_percentage
                .unwrap_or(SIMILAR_CONFIDENCE_THRESHOLD);
            let status = classify_confidence(confidence);

            // A cached affirmative can carry a score below today's similar
            // threshold; it reports as a mismatch and the candidate stays free.
            if status == MatchStatus::Mismatch {
                return ReportEntry {
                    list_a_desc: record.description.clone(),
                    list_b_desc: candidate.description.clone(),
                    status: MatchStatus::Mismatch,
                    details: format!(
                        "Insufficient confidence ({}%): {}",
                        confidence, result.details
                    ),
                };
            }

            consumed.insert(b_index);
            return ReportEntry {
                list_a_desc: record.description.clone(),
                list_b_desc: candidate.description.clone(),
                status,
                details: fuzzy_match_details(record, candidate, result),
            };
        }
    }

    // Nothing affirmed: report a mismatch against the first candidate so the
    // reader sees what the item was weighed against.
    let first = &list_b[item.fuzzy[0]];
    let details = match results.first().and_then(|r| r.as_ref()) {
        Some(result) => match result.confidence_percentage {
            Some(confidence) => format!("{}% confidence: {}", confidence, result.details),
            None => result.details.clone(),
        },
        None => NO_RESULT_DETAILS.to_string(),
    };
    ReportEntry {
        list_a_desc: record.description.clone(),
        list_b_desc: first.description.clone(),
        status: MatchStatus::Mismatch,
        details,
    }
}

fn exact_entry(record: &PropertyRecord, candidate: &PropertyRecord) -> ReportEntry {
    let limits_equal = normalize_money(&record.limit) == normalize_money(&candidate.limit);
    let mortgages_equal =
        normalize_money(&record.mortgage_amount) == normalize_money(&candidate.mortgage_amount);
    let status = if limits_equal && mortgages_equal {
        MatchStatus::Match
    } else {
        MatchStatus::SimilarMatch
    };

    ReportEntry {
        list_a_desc: record.description.clone(),
        list_b_desc: candidate.description.clone(),
        status,
        details: format!(
            "Exact description match. Limits: {}/{}, Mortgages: {}/{}",
            record.limit, candidate.limit, record.mortgage_amount, candidate.mortgage_amount
        ),
    }
}

fn fuzzy_match_details(
    record: &PropertyRecord,
    candidate: &PropertyRecord,
    result: &MatchResult,
) -> String {
    let verdict = match result.confidence_percentage {
        Some(confidence) => format!("{}% confidence: {}", confidence, result.details),
        None => result.details.clone(),
    };
    format!(
        "{} Limits: {}/{}, Mortgages: {}/{}",
        verdict, record.limit, candidate.limit, record.mortgage_amount, candidate.mortgage_amount
    )
}
