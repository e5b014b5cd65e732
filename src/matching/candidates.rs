// src/matching/candidates.rs
use std::collections::HashSet;

use crate::matching::exact::is_exact_match;
use crate::models::matching::PropertyRecord;

/// Ceiling on non-exact candidates carried per list-A item. Bounds prompt
/// size; true matches past the cap are unreachable.
pub const MAX_FUZZY_CANDIDATES: usize = 20;

/// Candidate partition for one list-A item within a sub-batch.
#[derive(Debug)]
pub struct ItemCandidates {
    /// Position of the item inside its sub-batch.
    pub item_index: usize,
    /// List-B indices whose descriptions match exactly after normalization.
    pub exact: Vec<usize>,
    /// Remaining list-B indices in list order, capped. No keyword
    /// prefiltering: every non-exact candidate is eligible.
    pub fuzzy: Vec<usize>,
}

/// Candidate partitions for every item of one sub-batch, built against the
/// consumed set as it stands when the sub-batch is reached.
#[derive(Debug)]
pub struct ComparisonBatch {
    pub items: Vec<ItemCandidates>,
}

pub fn build_batch(
    sub_chunk: &[PropertyRecord],
    list_b: &[PropertyRecord],
    consumed: &HashSet<usize>,
) -> ComparisonBatch {
    let items = sub_chunk
        .iter()
        .enumerate()
        .map(|(item_index, record)| {
            let mut exact = Vec::new();
            let mut fuzzy = Vec::new();
            for (b_index, candidate) in list_b.iter().enumerate() {
                if consumed.contains(&b_index) {
                    continue;
                }
                if is_exact_match(&record.description, &candidate.description) {
                    exact.push(b_index);
                } else if fuzzy.len() < MAX_FUZZY_CANDIDATES {
                    fuzzy.push(b_index);
                }
            }
            ItemCandidates {
                item_index,
                exact,
                fuzzy,
            }
        })
        .collect();

    ComparisonBatch { items }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(desc: &str) -> PropertyRecord {
        PropertyRecord {
            description: desc.to_string(),
            limit: "$1M".to_string(),
            mortgage_amount: "800K".to_string(),
        }
    }

    #[test]
    fn partitions_exact_from_fuzzy() {
        let chunk = vec![prop("Retail Store")];
        let list_b = vec![
            prop("Shopping Mall"),
            prop("retail  store"),
            prop("Industrial Warehouse"),
        ];
        let batch = build_batch(&chunk, &list_b, &HashSet::new());

        assert_eq!(batch.items[0].exact, vec![1]);
        assert_eq!(batch.items[0].fuzzy, vec![0, 2]);
    }

    #[test]
    fn consumed_indices_are_invisible() {
        let chunk = vec![prop("Retail Store")];
        let list_b = vec![prop("Retail Store"), prop("Shopping Mall")];
        let consumed: HashSet<usize> = [0].into_iter().collect();

        let batch = build_batch(&chunk, &list_b, &consumed);
        assert!(batch.items[0].exact.is_empty());
        assert_eq!(batch.items[0].fuzzy, vec![1]);
    }

    #[test]
    fn fuzzy_candidates_are_capped() {
        let chunk = vec![prop("Golf Course Clubhouse")];
        let list_b: Vec<PropertyRecord> = (0..MAX_FUZZY_CANDIDATES + 5)
            .map(|i| prop(&format!("Candidate {}", i)))
            .collect();

        let batch = build_batch(&chunk, &list_b, &HashSet::new());
        assert_eq!(batch.items[0].fuzzy.len(), MAX_FUZZY_CANDIDATES);
        // earliest list-B entries win the capped slots
        assert_eq!(batch.items[0].fuzzy[0], 0);
    }

    #[test]
    fn exact_matches_past_the_fuzzy_cap_are_still_found() {
        let chunk = vec![prop("Marina Facility")];
        let mut list_b: Vec<PropertyRecord> = (0..MAX_FUZZY_CANDIDATES + 3)
            .map(|i| prop(&format!("Candidate {}", i)))
            .collect();
        list_b.push(prop("MARINA FACILITY"));

        let batch = build_batch(&chunk, &list_b, &HashSet::new());
        assert_eq!(batch.items[0].exact, vec![list_b.len() - 1]);
        assert_eq!(batch.items[0].fuzzy.len(), MAX_FUZZY_CANDIDATES);
    }
}
